//! Connections module - the selectable list of mock social connections

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, Module};
use crate::domain::connection::{ConnectionDefinition, ConnectionRegistry, LinkState};
use crate::domain::points::PointsUpdate;

#[derive(Debug, Clone)]
pub struct ConnectionRow {
    pub def: ConnectionDefinition,
    pub link: LinkState,
}

/// UI-side mirror of the driver's connection state
#[derive(Debug, Clone)]
pub struct ConnectionList {
    rows: Vec<ConnectionRow>,
    selected: usize,
}

impl ConnectionList {
    pub fn new(registry: &ConnectionRegistry) -> Self {
        let rows = registry
            .iter()
            .map(|def| ConnectionRow {
                def: def.clone(),
                link: LinkState::Disconnected,
            })
            .collect();
        Self { rows, selected: 0 }
    }

    pub fn rows(&self) -> &[ConnectionRow] {
        &self.rows
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&ConnectionRow> {
        self.rows.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selected = index;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn link(&self, id: &str) -> Option<LinkState> {
        self.row(id).map(|row| row.link)
    }

    pub fn set_link(&mut self, id: &str, link: LinkState) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.def.id == id) {
            row.link = link;
        }
    }

    pub fn row(&self, id: &str) -> Option<&ConnectionRow> {
        self.rows.iter().find(|row| row.def.id == id)
    }

    /// Sync with a broadcast. Entries arrive in registry order, so they map
    /// to rows by position. Returns the rows that just became connected.
    pub fn apply_points(&mut self, update: &PointsUpdate) -> Vec<&ConnectionRow> {
        let mut newly_connected = Vec::new();
        for (index, (row, entry)) in self.rows.iter_mut().zip(update.points.iter()).enumerate() {
            if entry.connected {
                if row.link != LinkState::Connected {
                    newly_connected.push(index);
                }
                row.link = LinkState::Connected;
            } else if row.link == LinkState::Connected {
                row.link = LinkState::Disconnected;
            }
        }
        newly_connected
            .into_iter()
            .filter_map(|index| self.rows.get(index))
            .collect()
    }

    /// Summary derived from the rows, used before the first broadcast arrives
    pub fn summary(&self) -> PointsUpdate {
        PointsUpdate {
            points: self
                .rows
                .iter()
                .map(|row| crate::domain::points::PointsEntry {
                    name: row.def.name.clone(),
                    points: row.def.soul_points,
                    connected: row.link.is_connected(),
                })
                .collect(),
        }
    }
}

impl Module for ConnectionList {
    fn id(&self) -> &'static str {
        "connections"
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                Action::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.select(0);
                Action::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select(self.rows.len().saturating_sub(1));
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => self
                .selected()
                .map(|row| Action::Toggle(row.def.id.clone()))
                .unwrap_or(Action::None),
            KeyCode::Char('y') => self
                .selected()
                .map(|row| Action::Copy(row.def.url.clone()))
                .unwrap_or(Action::None),
            _ => Action::None,
        }
    }
}
