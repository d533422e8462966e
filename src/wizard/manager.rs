//! Wizard session manager
//!
//! Owns every live `WizardSession` behind one mutex. Each transition is a
//! short critical section; analyzer calls run outside the lock while the
//! session is marked pending.

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::analyzer::{AnalysisRequest, ProblemAnalyzer, SolutionRequest};
use super::state::{WizardError, WizardSession};
use crate::catalog::CatalogState;
use crate::events::{
    EventBroadcaster, WizardErrorPayload, WizardStepChangedPayload, EVENT_WIZARD_ERROR,
    EVENT_WIZARD_STEP_CHANGED,
};
use crate::export::{export_value, ExportFile, ExportFormat};
use crate::models::state_machine::WizardStep;
use crate::models::{AnalysisResult, MentalModel, ProblemInput, SolutionResult};
use crate::shutdown::ShutdownResult;
use crate::storage::{SessionStorage, UsageStats};
use crate::utils::lock_mutex_recover;

const EXPORT_TITLE: &str = "Mental Model Analysis Report";

pub struct WizardManager {
    sessions: Mutex<HashMap<String, WizardSession>>,
    usage: Mutex<UsageStats>,
    analyzer: Arc<dyn ProblemAnalyzer>,
    catalog: Arc<CatalogState>,
    storage: Arc<dyn SessionStorage>,
    broadcaster: Arc<EventBroadcaster>,
}

impl WizardManager {
    pub fn new(
        analyzer: Arc<dyn ProblemAnalyzer>,
        catalog: Arc<CatalogState>,
        storage: Arc<dyn SessionStorage>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Self {
        let usage = storage.load_usage().unwrap_or_else(|e| {
            log::warn!("Failed to load usage stats, starting from zero: {}", e);
            UsageStats::default()
        });

        let mut sessions = HashMap::new();
        match storage.list_sessions() {
            Ok(stored) => {
                for mut session in stored {
                    // A request that was in flight when the process stopped will never complete
                    if session.pending {
                        session.reset();
                    }
                    sessions.insert(session.id.clone(), session);
                }
                if !sessions.is_empty() {
                    log::info!(
                        "Restored {} wizard session(s) from {} storage",
                        sessions.len(),
                        storage.name()
                    );
                }
            }
            Err(e) => log::warn!("Failed to restore wizard sessions: {}", e),
        }

        Self {
            sessions: Mutex::new(sessions),
            usage: Mutex::new(usage),
            analyzer,
            catalog,
            storage,
            broadcaster,
        }
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    fn persist(&self, session: &WizardSession) {
        if let Err(e) = self.storage.save_session(session) {
            log::warn!("Failed to persist wizard session {}: {}", session.id, e);
        }
    }

    fn update_usage(&self, update: impl FnOnce(&mut UsageStats)) {
        let snapshot = {
            let mut usage = lock_mutex_recover(&self.usage);
            update(&mut usage);
            usage.clone()
        };
        if let Err(e) = self.storage.save_usage(&snapshot) {
            log::warn!("Failed to persist usage stats: {}", e);
        }
    }

    fn notify(&self, old_step: WizardStep, session: &WizardSession) {
        self.broadcaster.broadcast(
            EVENT_WIZARD_STEP_CHANGED,
            WizardStepChangedPayload {
                session_id: session.id.clone(),
                old_step,
                new_step: session.step,
                pending: session.pending,
            },
        );

        if let Some(ref error) = session.error {
            self.broadcaster.broadcast(
                EVENT_WIZARD_ERROR,
                WizardErrorPayload {
                    session_id: session.id.clone(),
                    step: session.step,
                    error: error.clone(),
                },
            );
        }
    }

    /// Run `f` against the session under the lock and return its output plus
    /// the previous step and a snapshot of the session afterwards
    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut WizardSession) -> Result<T, WizardError>,
    ) -> Result<(T, WizardStep, WizardSession), WizardError> {
        let mut sessions = lock_mutex_recover(&self.sessions);

        if !sessions.contains_key(id) {
            let stored = self.storage.load_session(id).ok().flatten();
            match stored {
                Some(session) => {
                    sessions.insert(id.to_string(), session);
                }
                None => return Err(WizardError::SessionNotFound(id.to_string())),
            }
        }

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardError::SessionNotFound(id.to_string()))?;
        let old_step = session.step;
        let out = f(session)?;
        Ok((out, old_step, session.clone()))
    }

    fn catalog_models(&self) -> Result<Vec<MentalModel>, String> {
        self.catalog.models()
    }

    pub fn create_session(&self) -> WizardSession {
        let session = WizardSession::new();
        lock_mutex_recover(&self.sessions).insert(session.id.clone(), session.clone());
        self.persist(&session);
        log::info!("Created wizard session {}", session.id);
        session
    }

    pub fn get_session(&self, id: &str) -> Result<WizardSession, WizardError> {
        self.with_session(id, |_| Ok(())).map(|(_, _, session)| session)
    }

    pub fn list_sessions(&self) -> Vec<WizardSession> {
        let mut sessions: Vec<WizardSession> =
            lock_mutex_recover(&self.sessions).values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sessions
    }

    /// `input → analysis → recommendations` (or back to `input` on failure)
    pub async fn submit_problem(
        &self,
        id: &str,
        input: ProblemInput,
    ) -> Result<WizardSession, WizardError> {
        let (pending, old_step, session) = self.with_session(id, |s| s.begin_submission(input))?;
        self.notify(old_step, &session);
        self.persist(&session);
        self.update_usage(|u| u.record_submission());

        log::info!(
            "Analyzing submission {} (domain: {}, urgency: {}) with {} analyzer",
            pending.submission.id,
            pending.submission.domain,
            pending.submission.urgency.as_str(),
            self.analyzer.name()
        );

        let result = match self.catalog_models() {
            Ok(catalog) => {
                let request = AnalysisRequest::from_submission(&pending.submission);
                let result = self.analyzer.analyze(&request, &catalog).await;
                retain_catalog_recommendations(result, &catalog)
            }
            Err(e) => AnalysisResult::failure(e),
        };

        self.finish(id, |s| s.complete_analysis(pending.revision, result))
    }

    /// Toggle a recommended model in or out of the selection
    pub fn toggle_model(&self, id: &str, model_id: &str) -> Result<WizardSession, WizardError> {
        let (_, _, session) = self.with_session(id, |s| s.toggle_selection(model_id).map(|_| ()))?;
        self.persist(&session);
        Ok(session)
    }

    /// `recommendations → results` (or back to `recommendations` on failure)
    pub async fn generate_solutions(&self, id: &str) -> Result<WizardSession, WizardError> {
        let (pending, old_step, session) = self.with_session(id, |s| s.begin_generation())?;
        self.notify(old_step, &session);
        self.persist(&session);

        log::info!(
            "Generating solutions for submission {} with {} model(s)",
            pending.submission.id,
            pending.model_ids.len()
        );

        let results = match self.catalog_models() {
            Ok(catalog) => {
                let requests: Vec<SolutionRequest> = pending
                    .model_ids
                    .iter()
                    .map(|model_id| SolutionRequest {
                        submission: pending.submission.clone(),
                        model_id: model_id.clone(),
                    })
                    .collect();
                join_all(
                    requests
                        .iter()
                        .map(|request| self.analyzer.generate_solution(request, &catalog)),
                )
                .await
            }
            Err(e) => vec![SolutionResult::failure(e)],
        };

        let session = self.finish(id, |s| s.complete_generation(pending.revision, results))?;

        if session.step == WizardStep::Results {
            self.update_usage(|u| {
                u.record_solutions(session.solutions.iter().map(|s| s.model_id.as_str()))
            });
        }

        Ok(session)
    }

    /// Apply a completion; a stale completion leaves the session untouched
    fn finish(
        &self,
        id: &str,
        complete: impl FnOnce(&mut WizardSession) -> Result<WizardStep, WizardError>,
    ) -> Result<WizardSession, WizardError> {
        match self.with_session(id, complete) {
            Ok((_, old_step, session)) => {
                if let Some(ref error) = session.error {
                    log::warn!("Wizard session {} returned to {}: {}", id, session.step, error);
                }
                self.notify(old_step, &session);
                self.persist(&session);
                Ok(session)
            }
            Err(WizardError::StaleCompletion) => {
                log::debug!("Ignoring stale completion for wizard session {}", id);
                self.get_session(id)
            }
            Err(e) => Err(e),
        }
    }

    /// Any step → `input`
    pub fn reset(&self, id: &str) -> Result<WizardSession, WizardError> {
        let (_, old_step, session) = self.with_session(id, |s| {
            s.reset();
            Ok(())
        })?;
        self.notify(old_step, &session);
        self.persist(&session);
        Ok(session)
    }

    /// Export the session's submission, analysis and solutions
    pub fn export(&self, id: &str, format: ExportFormat) -> Result<ExportFile, WizardError> {
        let session = self.get_session(id)?;
        let submission = session.submission.as_ref().ok_or(WizardError::NothingToExport)?;

        let kind = if session.solutions.is_empty() {
            "analysis"
        } else {
            "solutions"
        };

        let value = json!({
            "sessionId": session.id,
            "step": session.step,
            "submission": submission,
            "analysis": session.analysis,
            "recommendations": session.recommendations,
            "selectedModels": session.selected_models,
            "solutions": session.solutions,
        });

        let file = export_value(EXPORT_TITLE, kind, &value, format, Utc::now().timestamp_millis())?;
        self.update_usage(|u| u.record_export());
        Ok(file)
    }

    pub fn usage_stats(&self) -> UsageStats {
        lock_mutex_recover(&self.usage).clone()
    }

    /// Write every live session and the usage counters to storage
    pub fn flush(&self) -> ShutdownResult {
        let mut result = ShutdownResult::default();

        for session in self.list_sessions() {
            if session.pending {
                result.interrupted_sessions.push(session.id.clone());
            }
            match self.storage.save_session(&session) {
                Ok(()) => result.sessions_saved += 1,
                Err(e) => result.errors.push(format!("session {}: {}", session.id, e)),
            }
        }

        if let Err(e) = self.storage.save_usage(&self.usage_stats()) {
            result.errors.push(format!("usage stats: {}", e));
        }

        result
    }
}

/// Drop recommendations for models the loaded catalog does not contain and
/// order the rest by relevance, highest first
fn retain_catalog_recommendations(result: AnalysisResult, catalog: &[MentalModel]) -> AnalysisResult {
    match result {
        AnalysisResult::Success { mut data } => {
            let before = data.recommendations.len();
            data.recommendations
                .retain(|r| catalog.iter().any(|m| m.id == r.model_id));
            if data.recommendations.len() < before {
                log::warn!(
                    "Dropped {} recommendation(s) for models not in the catalog",
                    before - data.recommendations.len()
                );
            }
            data.recommendations
                .sort_by(|a, b| b.relevance.cmp(&a.relevance));
            AnalysisResult::Success { data }
        }
        failure => failure,
    }
}
