//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The simulation driver and its timers live on a Tokio runtime in a worker
//! thread. The TUI sends [`RuntimeCommand`]s and drains [`RuntimeEvent`]s each
//! frame without blocking.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tokio::runtime::Runtime;

use crate::domain::connection::ConnectionRegistry;
use crate::domain::points::PointsUpdate;
use crate::domain::simulation::{DriverOptions, ToggleOutcome};
use crate::domain::surface::{SurfaceContent, SurfaceRequest};
use crate::infrastructure::runtime::worker::run_async_worker;

/// Identifies one overlay opened on behalf of the driver
pub type SurfaceId = u64;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Flip a connection
    Toggle { id: String },
    /// Cancel pending sequences and stop the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Soul Points broadcast
    PointsUpdated { update: PointsUpdate },
    /// Result of a toggle command
    Toggled { id: String, outcome: ToggleOutcome },
    /// Driver opened a surface
    SurfaceOpened {
        surface: SurfaceId,
        request: SurfaceRequest,
    },
    /// Driver changed what a surface shows
    SurfaceUpdated {
        surface: SurfaceId,
        content: SurfaceContent,
    },
    /// Driver closed a surface
    SurfaceClosed { surface: SurfaceId },
    /// Error occurred
    Error { message: String },
}

/// Everything the worker needs to build its driver
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub registry: ConnectionRegistry,
    pub options: DriverOptions,
    /// Refuse every surface, so connect sequences abort silently
    pub block_popups: bool,
    /// Append each broadcast to this file as a JSON line
    pub events_path: Option<PathBuf>,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::Builder::new()
            .name("soulboard-runtime".to_string())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to start runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(config, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::domain::simulation::Timing;

    fn collect_until<F>(bridge: &RuntimeBridge, timeout: Duration, mut done: F) -> Vec<RuntimeEvent>
    where
        F: FnMut(&[RuntimeEvent]) -> bool,
    {
        let start = Instant::now();
        let mut events = Vec::new();
        while start.elapsed() < timeout {
            events.extend(bridge.poll_events());
            if done(&events) {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    #[test]
    fn test_bridge_round_trip() {
        let options = DriverOptions {
            timing: Timing {
                open_delay: Duration::from_millis(5),
                success_delay: Duration::from_millis(20),
                close_delay: Duration::from_millis(20),
            },
            ..DriverOptions::default()
        };
        let bridge = RuntimeBridge::new(WorkerConfig {
            registry: ConnectionRegistry::default(),
            options,
            block_popups: false,
            events_path: None,
        })
        .unwrap();

        bridge
            .send(RuntimeCommand::Toggle {
                id: "google".to_string(),
            })
            .unwrap();

        let events = collect_until(&bridge, Duration::from_secs(5), |events| {
            events
                .iter()
                .any(|e| matches!(e, RuntimeEvent::SurfaceClosed { .. }))
        });

        // initial announce, then the commit
        let updates: Vec<&PointsUpdate> = events
            .iter()
            .filter_map(|e| match e {
                RuntimeEvent::PointsUpdated { update } => Some(update),
                _ => None,
            })
            .collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].earned(), 0);
        assert_eq!(updates[1].earned(), 30);
        assert!(events.contains(&RuntimeEvent::Toggled {
            id: "google".to_string(),
            outcome: ToggleOutcome::Connecting,
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, RuntimeEvent::SurfaceOpened { request, .. } if request.title == "Connect Google")));
    }

    #[test]
    fn test_blocked_popups_never_connect() {
        let bridge = RuntimeBridge::new(WorkerConfig {
            registry: ConnectionRegistry::default(),
            options: DriverOptions::default(),
            block_popups: true,
            events_path: None,
        })
        .unwrap();

        bridge
            .send(RuntimeCommand::Toggle { id: "x".to_string() })
            .unwrap();
        let events = collect_until(&bridge, Duration::from_secs(5), |events| {
            events
                .iter()
                .any(|e| matches!(e, RuntimeEvent::Toggled { .. }))
        });
        assert!(events.contains(&RuntimeEvent::Toggled {
            id: "x".to_string(),
            outcome: ToggleOutcome::Blocked,
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, RuntimeEvent::SurfaceOpened { .. })));
    }
}
