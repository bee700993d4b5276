// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod clock;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod listener;
pub mod metrics;
pub mod model;
pub mod pruner;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{MonitorConfig, SourceDef};
pub use crate::listener::Listener;
pub use crate::store::SpawnStore;
