//! Catalog command routing
//!
//! Handles: get_catalog, filter_catalog, get_catalog_stats, reload_catalog

use crate::catalog::FilterCriteria;
use crate::commands;
use serde_json::Value;

use super::{get_opt_arg, route_async, route_sync, ServerAppState};

pub fn is_catalog_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "get_catalog" | "filter_catalog" | "get_catalog_stats" | "reload_catalog"
    )
}

pub async fn route_catalog_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "get_catalog" => route_sync!(commands::catalog::get_catalog(&state.catalog)),

        "filter_catalog" => {
            let criteria: FilterCriteria = get_opt_arg(&args, "criteria")?.unwrap_or_default();
            route_sync!(commands::catalog::filter_catalog(&state.catalog, criteria))
        }

        "get_catalog_stats" => route_sync!(commands::catalog::get_catalog_stats(&state.catalog)),

        "reload_catalog" => route_async!(commands::catalog::reload_catalog(
            &state.catalog,
            state.catalog_source.as_ref(),
            &state.broadcaster,
        )),

        _ => Err(format!("Unknown catalog command: {}", cmd)),
    }
}
