// Utility functions

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Name of the per-user application directory under `$HOME`
pub const APP_DIR_NAME: &str = ".mental-models";

/// Get the per-user application directory (`~/.mental-models`).
///
/// Falls back to the current directory when no home directory can be resolved.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Default config file location (`~/.mental-models/config.toml`)
pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// Default data directory for file-backed storage
pub fn default_data_dir() -> PathBuf {
    app_dir().join("data")
}

/// Extension trait for Result that provides convenient error context methods.
/// Converts any error to a String with a descriptive message prefix.
///
/// # Example
/// ```ignore
/// use crate::utils::ResultExt;
///
/// let models = state.catalog.models()
///     .with_context("Failed to read catalog")?;
/// ```
pub trait ResultExt<T> {
    /// Converts the error to a String with context message.
    fn with_context(self, msg: &str) -> Result<T, String>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context(self, msg: &str) -> Result<T, String> {
        self.map_err(|e| format!("{}: {}", msg, e))
    }
}

/// Safely acquire a mutex lock, recovering from poisoning by returning the guard.
/// The state may be inconsistent after a panic, so this is only used where every
/// critical section leaves the data valid at each step.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}
