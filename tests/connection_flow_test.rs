//! End-to-end connect/disconnect flows against the simulation driver
//!
//! Runs on a paused Tokio clock, so every stage boundary is checked at its
//! exact offset from the toggle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use soulboard::domain::connection::{ConnectionDefinition, ConnectionRegistry, LinkState};
use soulboard::domain::points::{PointsEntry, PointsUpdate};
use soulboard::domain::simulation::{DriverOptions, SimulationDriver, ToggleOutcome};
use soulboard::domain::surface::{Surface, SurfaceContent, SurfaceOpener, SurfaceRequest};

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Opened(String),
    Rendered(SurfaceContent),
    Closed,
}

#[derive(Default)]
struct Recorder {
    steps: Mutex<Vec<Step>>,
    updates: Mutex<Vec<PointsUpdate>>,
}

impl Recorder {
    fn steps(&self) -> Vec<Step> {
        std::mem::take(&mut *self.steps.lock().unwrap())
    }

    fn updates(&self) -> Vec<PointsUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

struct RecordedSurface(Arc<Recorder>);

impl Surface for RecordedSurface {
    fn render(&mut self, content: SurfaceContent) {
        self.0.steps.lock().unwrap().push(Step::Rendered(content));
    }

    fn close(&mut self) {
        self.0.steps.lock().unwrap().push(Step::Closed);
    }
}

struct RecordedOpener {
    recorder: Arc<Recorder>,
    blocked: bool,
}

impl SurfaceOpener for RecordedOpener {
    fn open(&self, request: SurfaceRequest) -> Option<Box<dyn Surface>> {
        if self.blocked {
            return None;
        }
        self.recorder
            .steps
            .lock()
            .unwrap()
            .push(Step::Opened(request.url));
        Some(Box::new(RecordedSurface(Arc::clone(&self.recorder))))
    }
}

fn setup(blocked: bool) -> (SimulationDriver, Arc<Recorder>) {
    let registry = ConnectionRegistry::new(vec![
        ConnectionDefinition::new("a", "A", "a", "first", 30, "https://a.example"),
        ConnectionDefinition::new("b", "B", "b", "second", 100, "https://b.example"),
    ])
    .expect("valid registry");
    let recorder = Arc::new(Recorder::default());
    let sink = Arc::clone(&recorder);
    let driver = SimulationDriver::new(
        registry,
        Arc::new(RecordedOpener {
            recorder: Arc::clone(&recorder),
            blocked,
        }),
        Arc::new(move |update: &PointsUpdate| {
            sink.updates.lock().unwrap().push(update.clone());
        }),
        DriverOptions::default(),
    );
    (driver, recorder)
}

fn entry(name: &str, points: u32, connected: bool) -> PointsEntry {
    PointsEntry {
        name: name.to_string(),
        points,
        connected,
    }
}

/// Let the clock run forward and give spawned tasks a chance to react.
async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_state_is_all_disconnected() {
    let (driver, recorder) = setup(false);
    driver.announce();

    let updates = recorder.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].points,
        vec![entry("A", 30, false), entry("B", 100, false)]
    );
    assert_eq!(updates[0].earned(), 0);
    assert_eq!(updates[0].available(), 130);
}

#[tokio::test(start_paused = true)]
async fn test_connect_sequence_timeline() {
    let (driver, recorder) = setup(false);

    assert_eq!(driver.toggle("a"), ToggleOutcome::Connecting);
    assert_eq!(
        recorder.steps(),
        vec![
            Step::Opened("https://a.example".into()),
            Step::Rendered(SurfaceContent::Opening {
                name: "A".into(),
                url: "https://a.example".into(),
            }),
        ]
    );

    advance(99).await;
    assert!(recorder.steps().is_empty());

    advance(2).await;
    assert_eq!(
        recorder.steps(),
        vec![Step::Rendered(SurfaceContent::Connecting { name: "A".into() })]
    );

    // Still not committed just before 2100ms.
    advance(1990).await;
    assert_eq!(driver.link("a"), Some(LinkState::Connecting));
    assert!(recorder.updates().is_empty());

    advance(20).await;
    assert_eq!(
        recorder.steps(),
        vec![Step::Rendered(SurfaceContent::Connected {
            name: "A".into(),
            soul_points: 30,
        })]
    );
    assert_eq!(driver.link("a"), Some(LinkState::Connected));
    assert_eq!(
        recorder.updates(),
        vec![PointsUpdate {
            points: vec![entry("A", 30, true), entry("B", 100, false)],
        }]
    );

    advance(1980).await;
    assert!(recorder.steps().is_empty());

    advance(20).await;
    assert_eq!(recorder.steps(), vec![Step::Closed]);
    assert_eq!(driver.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_is_immediate() {
    let (driver, recorder) = setup(false);
    driver.toggle("b");
    advance(4200).await;
    recorder.steps();
    assert_eq!(recorder.updates().len(), 1);

    assert_eq!(driver.toggle("b"), ToggleOutcome::Disconnected);
    assert!(recorder.steps().is_empty(), "disconnect opens no surface");
    assert_eq!(driver.link("b"), Some(LinkState::Disconnected));

    let updates = recorder.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[1].points,
        vec![entry("A", 30, false), entry("B", 100, false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_blocked_surface_never_connects() {
    let (driver, recorder) = setup(true);

    assert_eq!(driver.toggle("a"), ToggleOutcome::Blocked);
    advance(5000).await;

    assert_eq!(driver.link("a"), Some(LinkState::Disconnected));
    assert_eq!(driver.pending_count(), 0);
    assert!(recorder.steps().is_empty());
    assert!(recorder.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_id_is_ignored() {
    let (driver, recorder) = setup(false);

    assert_eq!(driver.toggle("missing"), ToggleOutcome::Unknown);
    advance(5000).await;

    assert!(recorder.steps().is_empty());
    assert!(recorder.updates().is_empty());
    assert_eq!(driver.snapshot().connected_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_toggle_while_connecting_is_rejected() {
    let (driver, recorder) = setup(false);
    driver.toggle("a");
    advance(1000).await;

    assert_eq!(driver.toggle("a"), ToggleOutcome::Busy);
    advance(1200).await;

    assert_eq!(driver.link("a"), Some(LinkState::Connected));
    assert_eq!(recorder.updates().len(), 1);
    let opened = recorder
        .steps()
        .into_iter()
        .filter(|step| matches!(step, Step::Opened(_)))
        .count();
    assert_eq!(opened, 1);
}

#[tokio::test(start_paused = true)]
async fn test_independent_connections_overlap() {
    let (driver, recorder) = setup(false);
    driver.toggle("a");
    advance(500).await;
    driver.toggle("b");

    advance(1700).await;
    assert_eq!(driver.link("a"), Some(LinkState::Connected));
    assert_eq!(driver.link("b"), Some(LinkState::Connecting));

    advance(500).await;
    let updates = recorder.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].earned(), 130);
    assert_eq!(updates[1].connected_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_mid_sequence_closes_without_commit() {
    let (driver, recorder) = setup(false);
    driver.toggle("a");
    advance(1000).await;
    recorder.steps();

    driver.shutdown().await;

    assert_eq!(recorder.steps(), vec![Step::Closed]);
    assert_eq!(driver.link("a"), Some(LinkState::Disconnected));
    assert_eq!(driver.pending_count(), 0);

    advance(5000).await;
    assert!(recorder.updates().is_empty());
}
