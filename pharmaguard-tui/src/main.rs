//! PharmaGuard TUI binary: terminal setup, worker wiring and the event loop.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use pharmaguard_core::{logging, ClientConfig, HttpBackend};
use pharmaguard_tui::worker::{self, WorkerCommand};
use pharmaguard_tui::{input, persistence, ui, AppState};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config = ClientConfig::load(None).context("loading client config")?;

    // The terminal owns stdout and stderr, so logs go to a file.
    if let Some(log_path) = logging::default_log_path() {
        if let Err(e) = logging::init_file(&log_path, &config.log_filter) {
            eprintln!("warning: logging disabled: {e}");
        }
    }
    tracing::info!(api_url = %config.api_url, "starting pharmaguard-tui");

    // Paths
    let state_path = persistence::default_path();
    let export_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    // Spawn worker
    let backend = HttpBackend::new(&config).context("building HTTP client")?;
    let worker_handle = worker::spawn_worker(Box::new(backend), cmd_rx, resp_tx)
        .context("spawning background worker")?;

    // Build app state
    let mut app = AppState::new(&config, cmd_tx.clone(), resp_rx, export_dir);
    persistence::apply(&mut app, persisted);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        tracing::warn!(error = %e, "failed to save UI state");
    }

    // Shutdown worker. A request still in flight finishes before the join returns.
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout keeps the typewriter and progress moving)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
