//! Wizard command routing
//!
//! Handles: create_wizard_session, get_wizard_session, list_wizard_sessions,
//! submit_problem, toggle_model_selection, generate_solutions, reset_wizard,
//! export_wizard_result, get_usage_stats

use crate::commands;
use crate::models::ProblemInput;
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_async, route_sync, ServerAppState};

pub fn is_wizard_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "create_wizard_session"
            | "get_wizard_session"
            | "list_wizard_sessions"
            | "submit_problem"
            | "toggle_model_selection"
            | "generate_solutions"
            | "reset_wizard"
            | "export_wizard_result"
            | "get_usage_stats"
    )
}

pub async fn route_wizard_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    let manager = state.wizard.as_ref();

    match cmd {
        "create_wizard_session" => {
            serde_json::to_value(commands::wizard::create_wizard_session(manager))
                .map_err(|e| e.to_string())
        }

        "get_wizard_session" => {
            let id: String = get_arg(&args, "sessionId")?;
            route_sync!(commands::wizard::get_wizard_session(manager, &id))
        }

        "list_wizard_sessions" => {
            serde_json::to_value(commands::wizard::list_wizard_sessions(manager))
                .map_err(|e| e.to_string())
        }

        "submit_problem" => {
            let id: String = get_arg(&args, "sessionId")?;
            let input: ProblemInput = get_arg(&args, "input")?;
            route_async!(commands::wizard::submit_problem(manager, &id, input))
        }

        "toggle_model_selection" => {
            let id: String = get_arg(&args, "sessionId")?;
            let model_id: String = get_arg(&args, "modelId")?;
            route_sync!(commands::wizard::toggle_model_selection(
                manager, &id, &model_id
            ))
        }

        "generate_solutions" => {
            let id: String = get_arg(&args, "sessionId")?;
            route_async!(commands::wizard::generate_solutions(manager, &id))
        }

        "reset_wizard" => {
            let id: String = get_arg(&args, "sessionId")?;
            route_sync!(commands::wizard::reset_wizard(manager, &id))
        }

        "export_wizard_result" => {
            let id: String = get_arg(&args, "sessionId")?;
            let format: Option<String> = get_opt_arg(&args, "format")?;
            route_sync!(commands::wizard::export_wizard_result(
                manager,
                &id,
                format.as_deref()
            ))
        }

        "get_usage_stats" => serde_json::to_value(commands::wizard::get_usage_stats(manager))
            .map_err(|e| e.to_string()),

        _ => Err(format!("Unknown wizard command: {}", cmd)),
    }
}
