use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{error::Error, io, time::Duration};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod actions;
mod api;
mod app;
mod config;
mod date_input;
mod input;
mod models;
mod runtime;
mod session;
mod todos;
mod ui;

use app::App;
use config::Config;

const LOG_ENV: &str = "LIFEMGR_LOG";
const LOG_FILE: &str = "lifemgr.log";

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();
    let _log_guard = init_tracing(&config);
    let mut app = App::new(config)?;

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Unsupported on some terminals (e.g. the legacy Windows console); the app works without it.
    let _ = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    );

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("terminal loop failed: {err}");
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file under the data directory; stdout belongs to the terminal UI.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let log_dir = config.data.log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("lifemgr=info"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &log_dir, LOG_FILE,
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    tracing::info!(api = %config.api.base_url, "starting");
    Some(guard)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        // Queued network work runs after the frame that shows it as pending.
        let had_work = !app.queue.is_empty();
        runtime::tick(app);

        let timeout = if had_work {
            Duration::ZERO
        } else {
            Duration::from_millis(250)
        };
        if event::poll(timeout)? {
            input::handle_event(app, event::read()?);
        }

        if app.should_quit {
            tracing::info!("exiting");
            return Ok(());
        }
    }
}
