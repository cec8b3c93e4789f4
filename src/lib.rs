//! Soulboard: a terminal reputation dashboard with simulated social connections.
//!
//! The connection handshake is theatre: a popup opens, a spinner runs for a
//! couple of seconds, and the connection flips to connected with a Soul Points
//! reward. [`domain::simulation::SimulationDriver`] owns that state machine;
//! the TUI talks to it through [`infrastructure::RuntimeBridge`].

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod ui;
