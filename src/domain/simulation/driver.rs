//! Simulation driver
//!
//! `toggle` disconnects immediately, or starts a chained connect sequence:
//! open surface → (open_delay) connecting → (success_delay) success + commit
//! → (close_delay) close. Each sequence runs as its own Tokio task and can be
//! cancelled through a oneshot stored per id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{DriverOptions, Timing, ToggleOutcome};
use crate::domain::connection::{
    ConnectionDefinition, ConnectionRegistry, ConnectionStore, LinkState,
};
use crate::domain::points::{PointsSink, PointsUpdate};
use crate::domain::surface::{Surface, SurfaceContent, SurfaceOpener, SurfaceRequest};

struct Pending {
    generation: u64,
    /// Dropping or firing this cancels the sequence
    _cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct Inner {
    store: ConnectionStore,
    pending: HashMap<String, Pending>,
    next_generation: u64,
}

struct Shared {
    registry: ConnectionRegistry,
    opener: Arc<dyn SurfaceOpener>,
    sink: Arc<dyn PointsSink>,
    options: DriverOptions,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the connection state and runs the fake handshakes.
///
/// Sinks are called with the state lock held so broadcasts are delivered in
/// commit order; a sink must not call back into the driver.
pub struct SimulationDriver {
    shared: Arc<Shared>,
}

impl SimulationDriver {
    pub fn new(
        registry: ConnectionRegistry,
        opener: Arc<dyn SurfaceOpener>,
        sink: Arc<dyn PointsSink>,
        options: DriverOptions,
    ) -> Self {
        let store = ConnectionStore::new(&registry);
        Self {
            shared: Arc::new(Shared {
                registry,
                opener,
                sink,
                options,
                inner: Mutex::new(Inner {
                    store,
                    pending: HashMap::new(),
                    next_generation: 0,
                }),
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.shared.registry
    }

    pub fn timing(&self) -> Timing {
        self.shared.options.timing
    }

    /// Publish the current summary once, as on mount.
    pub fn announce(&self) {
        let inner = self.shared.lock();
        let summary = inner.store.summary(&self.shared.registry);
        self.shared.sink.publish(&summary);
    }

    pub fn snapshot(&self) -> PointsUpdate {
        self.shared.lock().store.summary(&self.shared.registry)
    }

    pub fn link(&self, id: &str) -> Option<LinkState> {
        self.shared.lock().store.link(id)
    }

    /// Number of sequences that have not finished (including close windows)
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Flip a connection. Must be called from within a Tokio runtime.
    pub fn toggle(&self, id: &str) -> ToggleOutcome {
        let Some(def) = self.shared.registry.get(id).cloned() else {
            return ToggleOutcome::Unknown;
        };

        let mut inner = self.shared.lock();
        match inner.store.link(id) {
            Some(LinkState::Connected) => {
                inner.store.set_link(id, LinkState::Disconnected);
                let summary = inner.store.summary(&self.shared.registry);
                self.shared.sink.publish(&summary);
                info!(id, "connection removed");
                return ToggleOutcome::Disconnected;
            }
            Some(LinkState::Connecting) => {
                debug!(id, "toggle ignored, connect sequence in flight");
                return ToggleOutcome::Busy;
            }
            Some(LinkState::Disconnected) => {}
            None => return ToggleOutcome::Unknown,
        }

        // A previous sequence may still be showing its success screen.
        if let Some(previous) = inner.pending.remove(id) {
            debug!(id, generation = previous.generation, "cancelling finished sequence");
        }

        let request = SurfaceRequest {
            title: format!("Connect {}", def.name),
            url: def.url.clone(),
            width: self.shared.options.surface_width,
            height: self.shared.options.surface_height,
        };
        let Some(mut surface) = self.shared.opener.open(request) else {
            return ToggleOutcome::Blocked;
        };
        surface.render(SurfaceContent::Opening {
            name: def.name.clone(),
            url: def.url.clone(),
        });

        inner.store.set_link(id, LinkState::Connecting);
        let generation = inner.next_generation;
        inner.next_generation += 1;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(run_sequence(
            Arc::clone(&self.shared),
            def,
            surface,
            cancel_rx,
            generation,
        ));
        inner.pending.insert(
            id.to_string(),
            Pending {
                generation,
                _cancel: cancel_tx,
                handle,
            },
        );
        debug!(id, generation, "connect sequence started");
        ToggleOutcome::Connecting
    }

    /// Cancel every pending sequence and wait for their surfaces to close.
    /// Connections that had not committed yet go back to disconnected.
    pub async fn shutdown(&self) {
        let handles = cancel_all(&self.shared);
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        // The tasks observe the dropped senders and close their surfaces.
        let _ = cancel_all(&self.shared);
    }
}

fn cancel_all(shared: &Shared) -> Vec<JoinHandle<()>> {
    let mut inner = shared.lock();
    let pending: Vec<(String, Pending)> = inner.pending.drain().collect();
    let mut handles = Vec::with_capacity(pending.len());
    for (id, entry) in pending {
        if inner.store.link(&id) == Some(LinkState::Connecting) {
            inner.store.set_link(&id, LinkState::Disconnected);
        }
        debug!(id = %id, generation = entry.generation, "connect sequence cancelled");
        handles.push(entry.handle);
    }
    handles
}

/// Sleep for `delay`; `false` if the sequence was cancelled first.
async fn wait(delay: Duration, cancel: &mut oneshot::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = cancel => false,
    }
}

async fn run_sequence(
    shared: Arc<Shared>,
    def: ConnectionDefinition,
    mut surface: Box<dyn Surface>,
    mut cancel: oneshot::Receiver<()>,
    generation: u64,
) {
    let timing = shared.options.timing;

    if !wait(timing.open_delay, &mut cancel).await {
        surface.close();
        return;
    }
    surface.render(SurfaceContent::Connecting {
        name: def.name.clone(),
    });

    if !wait(timing.success_delay, &mut cancel).await {
        surface.close();
        return;
    }

    {
        let mut inner = shared.lock();
        let current = inner.pending.get(&def.id).map(|p| p.generation);
        if current != Some(generation) {
            drop(inner);
            surface.close();
            return;
        }
        surface.render(SurfaceContent::Connected {
            name: def.name.clone(),
            soul_points: def.soul_points,
        });
        inner.store.set_link(&def.id, LinkState::Connected);
        let summary = inner.store.summary(&shared.registry);
        shared.sink.publish(&summary);
    }
    info!(id = %def.id, points = def.soul_points, "connection established");

    let finished = wait(timing.close_delay, &mut cancel).await;
    surface.close();
    if finished {
        let mut inner = shared.lock();
        if inner.pending.get(&def.id).map(|p| p.generation) == Some(generation) {
            inner.pending.remove(&def.id);
        }
    }
}
