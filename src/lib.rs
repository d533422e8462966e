// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod catalog;
pub mod commands;
pub mod config;
pub mod events;
pub mod export;
pub mod models;
pub mod shutdown;
pub mod storage;
pub mod tutorial;
pub mod utils;
pub mod wizard;

// Server module (HTTP/WebSocket API)
pub mod server;

pub use models::*;
