//! Async worker - runs in Tokio runtime and owns the simulation driver

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::domain::points::{PointsSink, PointsUpdate};
use crate::domain::simulation::SimulationDriver;
use crate::infrastructure::event_log::EventLog;
use crate::infrastructure::overlay::OverlayOpener;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, WorkerConfig};

const COMMAND_POLL: Duration = Duration::from_millis(10);

/// Forwards broadcasts to the TUI and, if configured, to the event log
struct BridgeSink {
    evt_tx: Sender<RuntimeEvent>,
    event_log: Option<EventLog>,
}

impl PointsSink for BridgeSink {
    fn publish(&self, update: &PointsUpdate) {
        debug!(
            earned = update.earned(),
            connected = update.connected_count(),
            "broadcasting soul points"
        );
        if let Some(log) = &self.event_log {
            if let Err(err) = log.append(update) {
                warn!(path = %log.path().display(), error = %err, "event log write failed");
            }
        }
        let _ = self.evt_tx.send(RuntimeEvent::PointsUpdated {
            update: update.clone(),
        });
    }
}

/// Run the async worker loop
pub async fn run_async_worker(
    config: WorkerConfig,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let event_log = match config.events_path.as_deref() {
        Some(path) => match EventLog::open(path) {
            Ok(log) => Some(log),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "event log disabled");
                let _ = evt_tx.send(RuntimeEvent::Error {
                    message: format!("Event log disabled: {err}"),
                });
                None
            }
        },
        None => None,
    };

    let opener = OverlayOpener::new(evt_tx.clone(), config.block_popups);
    let sink = BridgeSink {
        evt_tx: evt_tx.clone(),
        event_log,
    };
    let driver = SimulationDriver::new(
        config.registry,
        Arc::new(opener),
        Arc::new(sink),
        config.options,
    );
    info!(
        connections = driver.registry().len(),
        block_popups = config.block_popups,
        "simulation worker started"
    );
    driver.announce();

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(RuntimeCommand::Toggle { id }) => {
                    let outcome = driver.toggle(&id);
                    let _ = evt_tx.send(RuntimeEvent::Toggled { id, outcome });
                }
                Ok(RuntimeCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    driver.shutdown().await;
                    info!("simulation worker stopped");
                    return Ok(());
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        tokio::time::sleep(COMMAND_POLL).await;
    }
}
