//! Connection state store - one link state per registry entry

use super::registry::ConnectionRegistry;
use crate::domain::points::{PointsEntry, PointsUpdate};

/// Link state of a single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    /// A connect sequence is running and has not committed yet
    Connecting,
    Connected,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self == LinkState::Connected
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkState::Disconnected => "Connect",
            LinkState::Connecting => "Connecting…",
            LinkState::Connected => "Connected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub id: String,
    pub link: LinkState,
}

/// Mutable per-connection state. Entries are created once, in registry
/// order, and only ever transitioned afterwards.
#[derive(Debug, Clone)]
pub struct ConnectionStore {
    states: Vec<ConnectionState>,
}

impl ConnectionStore {
    pub fn new(registry: &ConnectionRegistry) -> Self {
        let states = registry
            .iter()
            .map(|def| ConnectionState {
                id: def.id.clone(),
                link: LinkState::Disconnected,
            })
            .collect();
        Self { states }
    }

    pub fn link(&self, id: &str) -> Option<LinkState> {
        self.states
            .iter()
            .find(|state| state.id == id)
            .map(|state| state.link)
    }

    pub fn is_connected(&self, id: &str) -> bool {
        self.link(id).is_some_and(LinkState::is_connected)
    }

    /// Returns the previous state, or `None` for an unknown id.
    pub fn set_link(&mut self, id: &str, link: LinkState) -> Option<LinkState> {
        let state = self.states.iter_mut().find(|state| state.id == id)?;
        Some(std::mem::replace(&mut state.link, link))
    }

    pub fn states(&self) -> &[ConnectionState] {
        &self.states
    }

    /// Aggregate reward view, in registry order
    pub fn summary(&self, registry: &ConnectionRegistry) -> PointsUpdate {
        let points = registry
            .iter()
            .zip(self.states.iter())
            .map(|(def, state)| PointsEntry {
                name: def.name.clone(),
                points: def.soul_points,
                connected: state.link.is_connected(),
            })
            .collect();
        PointsUpdate { points }
    }
}
