//! Connection definitions and their link state

mod registry;
mod store;

pub use registry::{default_connections, ConnectionDefinition, ConnectionRegistry, RegistryError};
pub use store::{ConnectionState, ConnectionStore, LinkState};
