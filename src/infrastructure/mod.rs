//! Infrastructure layer - environment integrations
//!
//! This layer contains:
//! - Tokio runtime bridge that hosts the simulation driver
//! - Terminal overlay implementation of the surface capability
//! - JSON-lines export of Soul Points broadcasts
//! - File-backed tracing setup

pub mod event_log;
pub mod logging;
pub mod overlay;
pub mod runtime;

pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, SurfaceId, WorkerConfig};
