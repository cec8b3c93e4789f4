use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use soulboard::app::{App, Tab};
use soulboard::config;
use soulboard::core::{Action, Module, NotifyLevel};
use soulboard::domain::connection::ConnectionRegistry;
use soulboard::infrastructure::logging;
use soulboard::infrastructure::{RuntimeBridge, RuntimeCommand, WorkerConfig};
use soulboard::ui;

#[derive(Debug, Parser)]
#[command(
    name = "soulboard",
    version,
    about = "Soulboard: a terminal reputation dashboard with simulated social connections"
)]
struct Args {
    /// Config file (defaults to ~/.config/soulboard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append every soulPointsUpdate broadcast to this file as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Refuse to open connection popups (connections never complete)
    #[arg(long)]
    block_popups: bool,

    /// Log filter, e.g. `debug` or `soulboard=trace`
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_error) = match config::load(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (config::Config::default(), Some(err)),
    };

    let filter = logging::build_filter(args.log_level.as_deref(), config.log_level.as_deref());
    let _log_guard = config::data_dir().and_then(|dir| logging::init(&dir, filter));

    if let Some(err) = &config_error {
        warn!(error = %err, "config ignored, using defaults");
    }
    let registry = config.registry().unwrap_or_else(|err| {
        warn!(error = %err, "configured connections rejected, using defaults");
        ConnectionRegistry::default()
    });

    let worker_config = WorkerConfig {
        registry: registry.clone(),
        options: config.driver_options(),
        block_popups: args.block_popups || config.surface.blocked,
        events_path: args.events.clone().or_else(|| config.events_path()),
    };
    info!(
        connections = registry.len(),
        events = ?worker_config.events_path,
        "starting soulboard"
    );

    let mut app = App::new(&registry);
    if let Some(err) = config_error {
        app.set_status(format!("Config ignored: {err}"), NotifyLevel::Warn);
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = RuntimeBridge::new(worker_config)
        .and_then(|runtime| run_app(&mut terminal, app, runtime));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            info!("quit requested");
            return Ok(());
        }

        // Redraw at least every 50ms so popup stages show up promptly.
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0))
            .min(Duration::from_millis(50));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }

    for id in app.take_toggle_requests() {
        if let Err(err) = runtime.send(RuntimeCommand::Toggle { id }) {
            app.set_status(format!("{err}"), NotifyLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.apply_action(Action::Quit)
        }
        (KeyCode::Char('q'), _) => app.apply_action(Action::Quit),
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Esc, _) => {
            app.dismiss_overlay();
        }
        (KeyCode::Tab, _) | (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_tab(),
        (KeyCode::BackTab, _) | (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_tab(),
        (KeyCode::Char(c @ '1'..='6'), _) => {
            if let Some(tab) = Tab::from_shortcut(c) {
                app.select_tab(tab);
            }
        }
        _ => {
            let action = app.connections.handle_key(key);
            dispatch_action(app, action);
        }
    }
}

fn dispatch_action(app: &mut App, action: Action) {
    match action {
        Action::Copy(text) => copy_to_clipboard(app, text),
        other => app.apply_action(other),
    }
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone())) {
        Ok(()) => app.set_status(format!("Copied: {text}"), NotifyLevel::Info),
        Err(err) => app.set_status(format!("Clipboard error: {err}"), NotifyLevel::Error),
    }
}
