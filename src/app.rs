use std::time::{Duration, Instant};

use crate::core::{Action, NotifyLevel};
use crate::domain::connection::{ConnectionRegistry, LinkState};
use crate::domain::points::PointsUpdate;
use crate::domain::simulation::ToggleOutcome;
use crate::domain::surface::{SurfaceContent, SurfaceRequest};
use crate::infrastructure::{RuntimeEvent, SurfaceId};
use crate::modules::ConnectionList;

const STATUS_TTL: Duration = Duration::from_secs(3);

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Credit,
    Social,
    Professional,
    Gaming,
    OnChain,
    LegalIdentity,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Credit,
        Tab::Social,
        Tab::Professional,
        Tab::Gaming,
        Tab::OnChain,
        Tab::LegalIdentity,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Credit => "Credit",
            Tab::Social => "Social",
            Tab::Professional => "Professional",
            Tab::Gaming => "Gaming",
            Tab::OnChain => "On-chain Activities",
            Tab::LegalIdentity => "Legal Identity",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::Credit => '1',
            Tab::Social => '2',
            Tab::Professional => '3',
            Tab::Gaming => '4',
            Tab::OnChain => '5',
            Tab::LegalIdentity => '6',
        }
    }

    pub fn from_shortcut(c: char) -> Option<Tab> {
        Tab::ALL.iter().copied().find(|tab| tab.shortcut() == c)
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: NotifyLevel,
    pub since: Instant,
}

/// A connection popup drawn on behalf of the driver
#[derive(Debug, Clone)]
pub struct Overlay {
    pub id: SurfaceId,
    pub request: SurfaceRequest,
    pub content: Option<SurfaceContent>,
}

pub struct App {
    pub current_tab: Tab,
    pub connections: ConnectionList,
    /// Latest Soul Points broadcast
    pub points: PointsUpdate,
    pub broadcasts: u64,
    /// Open popups, topmost last
    pub overlays: Vec<Overlay>,
    pub help_open: bool,
    pub should_quit: bool,
    /// Frame counter for the popup spinner
    pub ticks: u64,
    status: Option<StatusMessage>,
    pending_toggles: Vec<String>,
}

impl App {
    pub fn new(registry: &ConnectionRegistry) -> Self {
        let connections = ConnectionList::new(registry);
        let points = connections.summary();
        Self {
            current_tab: Tab::Social,
            connections,
            points,
            broadcasts: 0,
            overlays: Vec::new(),
            help_open: false,
            should_quit: false,
            ticks: 0,
            status: None,
            pending_toggles: Vec::new(),
        }
    }

    // === Tabs ===

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub fn next_tab(&mut self) {
        let index = (self.current_tab.index() + 1) % Tab::ALL.len();
        self.current_tab = Tab::ALL[index];
    }

    pub fn prev_tab(&mut self) {
        let index = (self.current_tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len();
        self.current_tab = Tab::ALL[index];
    }

    // === Status ===

    pub fn set_status(&mut self, text: impl Into<String>, level: NotifyLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, NotifyLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    // === Actions ===

    /// Apply an action that needs no outside capability.
    /// Clipboard copies are left to the caller.
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None | Action::Copy(_) => {}
            Action::Toggle(id) => self.request_toggle(id),
            Action::Notify(text, level) => self.set_status(text, level),
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn request_toggle(&mut self, id: String) {
        self.pending_toggles.push(id);
    }

    pub fn take_toggle_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_toggles)
    }

    // === Popups ===

    pub fn top_overlay(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    /// Hide the topmost popup early. The connect sequence carries on.
    pub fn dismiss_overlay(&mut self) -> bool {
        self.overlays.pop().is_some()
    }

    // === Runtime events ===

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::PointsUpdated { update } => self.apply_points(update),
            RuntimeEvent::Toggled { id, outcome } => self.apply_toggled(&id, outcome),
            RuntimeEvent::SurfaceOpened { surface, request } => self.overlays.push(Overlay {
                id: surface,
                request,
                content: None,
            }),
            RuntimeEvent::SurfaceUpdated { surface, content } => {
                // Updates for dismissed popups are dropped.
                if let Some(overlay) = self.overlays.iter_mut().find(|o| o.id == surface) {
                    overlay.content = Some(content);
                }
            }
            RuntimeEvent::SurfaceClosed { surface } => {
                self.overlays.retain(|o| o.id != surface);
            }
            RuntimeEvent::Error { message } => self.set_status(message, NotifyLevel::Error),
        }
    }

    fn apply_points(&mut self, update: PointsUpdate) {
        let earned: Vec<(String, u32)> = self
            .connections
            .apply_points(&update)
            .iter()
            .map(|row| (row.def.name.clone(), row.def.soul_points))
            .collect();
        if let Some((name, points)) = earned.last() {
            self.set_status(
                format!("Connected {name}: +{points} Soul Points"),
                NotifyLevel::Info,
            );
        }
        self.points = update;
        self.broadcasts += 1;
    }

    fn apply_toggled(&mut self, id: &str, outcome: ToggleOutcome) {
        let name = self
            .connections
            .row(id)
            .map(|row| row.def.name.clone())
            .unwrap_or_else(|| id.to_string());
        match outcome {
            ToggleOutcome::Connecting => {
                self.connections.set_link(id, LinkState::Connecting);
                self.set_status(format!("Connecting to {name}…"), NotifyLevel::Info);
            }
            ToggleOutcome::Disconnected => {
                self.connections.set_link(id, LinkState::Disconnected);
                self.set_status(format!("Disconnected {name}"), NotifyLevel::Info);
            }
            ToggleOutcome::Busy => {
                self.set_status(format!("{name} is still connecting"), NotifyLevel::Warn);
            }
            // Both fail silently.
            ToggleOutcome::Blocked | ToggleOutcome::Unknown => {}
        }
    }
}
