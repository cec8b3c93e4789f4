//! Secondary surface capability used by the connection simulation
//!
//! The driver never renders anything itself. It asks a [`SurfaceOpener`]
//! for a surface and pushes [`SurfaceContent`] into it; whether that becomes
//! a terminal popup, a window, or nothing at all is up to the environment.

/// Rectangle on the current screen, in whatever unit the environment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Request to open a surface of a given size, centred on the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub title: String,
    pub url: String,
    pub width: u16,
    pub height: u16,
}

impl SurfaceRequest {
    /// Place the surface centred within `screen`, shrinking it if it does not fit.
    pub fn placement(&self, screen: ScreenArea) -> ScreenArea {
        let width = self.width.min(screen.width);
        let height = self.height.min(screen.height);
        ScreenArea {
            x: screen.x + (screen.width - width) / 2,
            y: screen.y + (screen.height - height) / 2,
            width,
            height,
        }
    }
}

/// What a surface currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceContent {
    /// Freshly opened, pointing at the target URL
    Opening { name: String, url: String },
    Connecting { name: String },
    Connected { name: String, soul_points: u32 },
}

impl SurfaceContent {
    pub fn lines(&self) -> Vec<String> {
        match self {
            SurfaceContent::Opening { name, url } => {
                vec![format!("Connecting to {name}..."), url.clone()]
            }
            SurfaceContent::Connecting { name } => vec![format!("Connecting to {name}...")],
            SurfaceContent::Connected { soul_points, .. } => vec![
                "✓ Connected Successfully!".to_string(),
                format!("You've earned {soul_points} Soul Points"),
                "This window will close automatically...".to_string(),
            ],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SurfaceContent::Connected { .. })
    }
}

/// An open secondary surface
pub trait Surface: Send {
    fn render(&mut self, content: SurfaceContent);
    fn close(&mut self);
}

/// Environment capability that opens secondary surfaces.
///
/// Returning `None` means the surface could not be opened (e.g. blocked).
pub trait SurfaceOpener: Send + Sync {
    fn open(&self, request: SurfaceRequest) -> Option<Box<dyn Surface>>;
}
