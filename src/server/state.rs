//! Server application state shared across handlers

use std::sync::Arc;

use crate::catalog::{CatalogSource, CatalogState};
use crate::events::EventBroadcaster;
use crate::shutdown::ShutdownState;
use crate::tutorial::TutorService;
use crate::wizard::WizardManager;

/// Shared state for the server, containing the catalog, wizard manager and
/// tutorial proxy
#[derive(Clone)]
pub struct ServerAppState {
    /// Authentication token for `/api/*` and `/ws/*`
    pub auth_token: String,

    /// Currently loaded catalog
    pub catalog: Arc<CatalogState>,

    /// Where `reload_catalog` fetches from
    pub catalog_source: Arc<dyn CatalogSource>,

    /// Wizard sessions and the analyzer behind them
    pub wizard: Arc<WizardManager>,

    /// Tutorial proxy; `None` when the model or auth service is not configured
    pub tutor: Option<Arc<TutorService>>,

    /// Event broadcaster for WebSocket clients
    pub broadcaster: Arc<EventBroadcaster>,

    pub shutdown_state: ShutdownState,
}
