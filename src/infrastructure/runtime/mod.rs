//! Runtime infrastructure - Tokio runtime bridge for the simulation

mod bridge;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent, SurfaceId, WorkerConfig};
pub use worker::run_async_worker;
