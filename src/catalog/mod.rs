//! Mental model catalog
//!
//! - `builtin`: compiled-in models and the five-model fallback list
//! - `filter`: pure search/filter engine over a catalog
//! - `source`: built-in, file and remote sources plus the fallback rule

pub mod builtin;
pub mod filter;
pub mod source;

pub use builtin::{builtin_catalog, fallback_catalog};
pub use filter::{
    catalog_stats, filter_models, CatalogStats, CategoryFilter, ComplexityFilter, FilterCriteria,
};
pub use source::{
    load_catalog, BuiltinCatalogSource, CatalogError, CatalogOrigin, CatalogSource,
    FileCatalogSource, LoadedCatalog, RemoteCatalogSource,
};

use std::sync::RwLock;

use crate::models::MentalModel;
use crate::utils::ResultExt;

/// Currently loaded catalog, swapped wholesale on reload
pub struct CatalogState {
    loaded: RwLock<LoadedCatalog>,
}

impl CatalogState {
    pub fn new(loaded: LoadedCatalog) -> Self {
        Self {
            loaded: RwLock::new(loaded),
        }
    }

    pub fn snapshot(&self) -> Result<LoadedCatalog, String> {
        self.loaded
            .read()
            .map(|c| c.clone())
            .with_context("Failed to acquire catalog lock")
    }

    pub fn models(&self) -> Result<Vec<MentalModel>, String> {
        Ok(self.snapshot()?.models)
    }

    pub fn replace(&self, loaded: LoadedCatalog) -> Result<(), String> {
        let mut guard = self
            .loaded
            .write()
            .with_context("Failed to acquire catalog lock")?;
        *guard = loaded;
        Ok(())
    }
}
