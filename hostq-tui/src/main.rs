//! HOSTING-Q TUI: three quantum-optimization demos in the terminal.
//!
//! Views:
//! 1. HOSTING-Q: portfolio allocation with the QSL sediment log
//! 2. Scheduling: task/resource Gantt chart
//! 3. Risk Analysis: CVaR with the loss distribution

use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostq_core::config::{config_dir, default_config_path};
use hostq_core::{service, AppConfig, OptimizationService};
use hostq_tui::worker::{self, WorkerCommand};
use hostq_tui::{input, ui, AppState};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    init_logging()?;

    let config_path = default_config_path();
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let service: Arc<dyn OptimizationService> = Arc::from(service::from_config(&config.service));
    info!(service = service.name(), config = %config_path.display(), "starting");

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let service_name = service.name().to_string();
    let worker_handle =
        worker::spawn_worker(cmd_rx, resp_tx, service).context("spawning run worker")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, &config.ui, service_name);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(1));
    let result = run_app(&mut terminal, &mut app, tick_rate);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

/// Log to `<config_dir>/hostq/hostq-tui.log`; stdout belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let dir = config_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("hostq-tui.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("HOSTQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.on_worker_response(resp);
        }

        // 3. Poll for input events
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Promote queued runs, advance animations
        app.tick(Instant::now());

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
