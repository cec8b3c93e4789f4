//! Interactive UI modules

pub mod connections;

pub use connections::{ConnectionList, ConnectionRow};
