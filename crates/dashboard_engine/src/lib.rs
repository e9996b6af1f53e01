//! Dashboard aggregation and normalization engine.
//!
//! One load fetches every upstream source concurrently, normalizes whatever
//! settled into canonical types, derives the cross-cutting business metrics
//! and returns a single [`DashboardModel`]. The [`DashboardScheduler`]
//! repeats that on an interval and publishes each model atomically.

pub mod api;
pub mod compact;
pub mod config;
pub mod derive;
pub mod domains;
pub mod error;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod scheduler;

mod test_utils;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use model::{DashboardModel, Section, SourcePayloads, assemble};
pub use orchestrator::DashboardOrchestrator;
pub use scheduler::{DashboardHandle, DashboardScheduler};
