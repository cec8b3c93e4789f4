//! Terminal overlay surfaces
//!
//! Implements the surface capability by turning every open/render/close into
//! a [`RuntimeEvent`] for the TUI, which draws the overlay as a popup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

use crate::domain::surface::{Surface, SurfaceContent, SurfaceOpener, SurfaceRequest};
use crate::infrastructure::runtime::{RuntimeEvent, SurfaceId};

pub struct OverlayOpener {
    evt_tx: Sender<RuntimeEvent>,
    blocked: bool,
    next_id: AtomicU64,
}

impl OverlayOpener {
    pub fn new(evt_tx: Sender<RuntimeEvent>, blocked: bool) -> Self {
        Self {
            evt_tx,
            blocked,
            next_id: AtomicU64::new(1),
        }
    }
}

impl SurfaceOpener for OverlayOpener {
    fn open(&self, request: SurfaceRequest) -> Option<Box<dyn Surface>> {
        if self.blocked {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Nobody to draw it if the UI has gone away.
        self.evt_tx
            .send(RuntimeEvent::SurfaceOpened {
                surface: id,
                request,
            })
            .ok()?;
        Some(Box::new(OverlaySurface {
            id,
            evt_tx: self.evt_tx.clone(),
            closed: false,
        }))
    }
}

struct OverlaySurface {
    id: SurfaceId,
    evt_tx: Sender<RuntimeEvent>,
    closed: bool,
}

impl Surface for OverlaySurface {
    fn render(&mut self, content: SurfaceContent) {
        if self.closed {
            return;
        }
        let _ = self.evt_tx.send(RuntimeEvent::SurfaceUpdated {
            surface: self.id,
            content,
        });
    }

    fn close(&mut self) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }
        let _ = self
            .evt_tx
            .send(RuntimeEvent::SurfaceClosed { surface: self.id });
    }
}

impl Drop for OverlaySurface {
    fn drop(&mut self) {
        self.close();
    }
}
