//! Soul Points broadcast payload and the sink it is delivered to

use serde::{Deserialize, Serialize};

/// Name of the outward broadcast event
pub const POINTS_EVENT: &str = "soulPointsUpdate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub name: String,
    pub points: u32,
    pub connected: bool,
}

/// Aggregate reward state covering every registry entry, in registry order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointsUpdate {
    pub points: Vec<PointsEntry>,
}

impl PointsUpdate {
    /// Points from connected entries
    pub fn earned(&self) -> u64 {
        self.points
            .iter()
            .filter(|entry| entry.connected)
            .map(|entry| u64::from(entry.points))
            .sum()
    }

    /// Points from every entry, connected or not
    pub fn available(&self) -> u64 {
        self.points.iter().map(|entry| u64::from(entry.points)).sum()
    }

    pub fn connected_count(&self) -> usize {
        self.points.iter().filter(|entry| entry.connected).count()
    }
}

/// Receives every committed change to the connection state.
///
/// Delivery is fire-and-forget: implementations must not block and have no
/// way to report failure back to the driver.
pub trait PointsSink: Send + Sync {
    fn publish(&self, update: &PointsUpdate);
}

impl<F> PointsSink for F
where
    F: Fn(&PointsUpdate) + Send + Sync,
{
    fn publish(&self, update: &PointsUpdate) {
        self(update)
    }
}
