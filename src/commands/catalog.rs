// Catalog commands: browse, filter, summarize and reload the mental model catalog

use crate::catalog::{
    catalog_stats, filter_models, load_catalog, CatalogOrigin, CatalogSource, CatalogState,
    CatalogStats, FilterCriteria, LoadedCatalog,
};
use crate::events::{CatalogReloadedPayload, EventBroadcaster, EVENT_CATALOG_RELOADED};
use crate::models::MentalModel;

/// Get the loaded catalog with its origin and any fallback warning
pub fn get_catalog(state: &CatalogState) -> Result<LoadedCatalog, String> {
    state.snapshot()
}

/// Filter the catalog; absent criteria match everything
pub fn filter_catalog(
    state: &CatalogState,
    criteria: FilterCriteria,
) -> Result<Vec<MentalModel>, String> {
    let models = state.models()?;
    Ok(filter_models(&models, &criteria))
}

pub fn get_catalog_stats(state: &CatalogState) -> Result<CatalogStats, String> {
    Ok(catalog_stats(&state.models()?))
}

/// Re-fetch from the configured source, falling back to the fixed list on failure
pub async fn reload_catalog(
    state: &CatalogState,
    source: &dyn CatalogSource,
    broadcaster: &EventBroadcaster,
) -> Result<LoadedCatalog, String> {
    let loaded = load_catalog(source).await;
    state.replace(loaded.clone())?;

    broadcaster.broadcast(
        EVENT_CATALOG_RELOADED,
        CatalogReloadedPayload {
            model_count: loaded.models.len(),
            fallback: loaded.origin == CatalogOrigin::Fallback,
            warning: loaded.warning.clone(),
        },
    );

    Ok(loaded)
}
