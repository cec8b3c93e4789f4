//! Domain layer - connection state and the simulated handshake
//!
//! Nothing here touches the terminal. The popup and the broadcast are
//! reached through the [`surface::SurfaceOpener`] and [`points::PointsSink`]
//! traits so the state machine runs the same under test.

pub mod connection;
pub mod points;
pub mod simulation;
pub mod surface;
