// Wizard commands: session lifecycle, problem submission, model selection,
// solution generation and export

use crate::export::{ExportFile, ExportFormat};
use crate::models::ProblemInput;
use crate::storage::UsageStats;
use crate::wizard::{WizardManager, WizardSession};

pub fn create_wizard_session(manager: &WizardManager) -> WizardSession {
    manager.create_session()
}

pub fn get_wizard_session(manager: &WizardManager, id: &str) -> Result<WizardSession, String> {
    manager.get_session(id).map_err(|e| e.to_string())
}

pub fn list_wizard_sessions(manager: &WizardManager) -> Vec<WizardSession> {
    manager.list_sessions()
}

/// Submit the problem and wait for the analysis step to settle
pub async fn submit_problem(
    manager: &WizardManager,
    id: &str,
    input: ProblemInput,
) -> Result<WizardSession, String> {
    manager
        .submit_problem(id, input)
        .await
        .map_err(|e| e.to_string())
}

pub fn toggle_model_selection(
    manager: &WizardManager,
    id: &str,
    model_id: &str,
) -> Result<WizardSession, String> {
    manager.toggle_model(id, model_id).map_err(|e| e.to_string())
}

pub async fn generate_solutions(manager: &WizardManager, id: &str) -> Result<WizardSession, String> {
    manager.generate_solutions(id).await.map_err(|e| e.to_string())
}

pub fn reset_wizard(manager: &WizardManager, id: &str) -> Result<WizardSession, String> {
    manager.reset(id).map_err(|e| e.to_string())
}

pub fn export_wizard_result(
    manager: &WizardManager,
    id: &str,
    format: Option<&str>,
) -> Result<ExportFile, String> {
    let format: ExportFormat = match format {
        Some(f) => f.parse().map_err(|e: crate::export::ExportError| e.to_string())?,
        None => ExportFormat::Json,
    };
    manager.export(id, format).map_err(|e| e.to_string())
}

pub fn get_usage_stats(manager: &WizardManager) -> UsageStats {
    manager.usage_stats()
}
