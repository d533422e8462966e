//! Command routing modules
//!
//! - catalog_routes: catalog commands
//! - wizard_routes: wizard session commands

pub mod catalog_routes;
pub mod wizard_routes;

use serde_json::Value;

use super::ServerAppState;

/// Extract a required argument from JSON args
pub fn get_arg<T: serde::de::DeserializeOwned>(args: &Value, name: &str) -> Result<T, String> {
    serde_json::from_value(
        args.get(name)
            .ok_or_else(|| format!("Missing argument: {}", name))?
            .clone(),
    )
    .map_err(|e| format!("Invalid argument {}: {}", name, e))
}

/// Extract an optional argument from JSON args
pub fn get_opt_arg<T: serde::de::DeserializeOwned>(
    args: &Value,
    name: &str,
) -> Result<Option<T>, String> {
    match args.get(name) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("Invalid argument {}: {}", name, e)),
        _ => Ok(None),
    }
}

/// Routes an async command: awaits the handler and serializes the result
#[macro_export]
macro_rules! route_async {
    ($handler:expr) => {{
        let result = $handler.await?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

/// Routes a sync command
#[macro_export]
macro_rules! route_sync {
    ($handler:expr) => {{
        let result = $handler?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

pub use route_async;
pub use route_sync;

/// Route a command to its implementation by dispatching to the appropriate sub-router
pub async fn route_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    if catalog_routes::is_catalog_command(cmd) {
        return catalog_routes::route_catalog_command(cmd, args, state).await;
    }

    if wizard_routes::is_wizard_command(cmd) {
        return wizard_routes::route_wizard_command(cmd, args, state).await;
    }

    Err(format!("Unknown command: {}", cmd))
}
