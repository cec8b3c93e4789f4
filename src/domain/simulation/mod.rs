//! Connection simulation - the timer-driven fake handshake

mod driver;

use std::time::Duration;

pub use driver::SimulationDriver;

/// Delays between the stages of a connect sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Surface opened → "connecting" shown
    pub open_delay: Duration,
    /// "connecting" shown → success shown and state committed
    pub success_delay: Duration,
    /// success shown → surface closed
    pub close_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            open_delay: Duration::from_millis(100),
            success_delay: Duration::from_millis(2000),
            close_delay: Duration::from_millis(2000),
        }
    }
}

impl Timing {
    /// Time from toggle to commit
    pub fn until_commit(&self) -> Duration {
        self.open_delay + self.success_delay
    }
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub timing: Timing,
    pub surface_width: u16,
    pub surface_height: u16,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            surface_width: 56,
            surface_height: 9,
        }
    }
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Id is not in the registry; nothing happened
    Unknown,
    /// Was connected, now disconnected
    Disconnected,
    /// A connect sequence has started
    Connecting,
    /// The surface could not be opened; nothing happened
    Blocked,
    /// A connect sequence for this id is still running; request ignored
    Busy,
}
