//! Menuboard TUI - A terminal dashboard for restaurant menus.
//!
//! This application provides a fast, keyboard-driven interface for managing
//! categories, products, reviews and staff of a single restaurant.

mod app;
mod form;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use menuboard_core::auth::{CredentialStore, Session};
use menuboard_core::config::Config;
use menuboard_core::offline::{static_urls, OfflineWorker, ReqwestFetcher, ResponseStore, OPTIONAL_URLS};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "menuboard.log";
const OFFLINE_DIR: &str = "offline";

const USAGE: &str = "Usage: menuboard [--set-key | --precache <origin> | --logout]";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file in the cache
/// directory. The returned guard flushes the writer on drop.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

fn cache_dir(config: &Config) -> PathBuf {
    config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_default();
    let log_dir = cache_dir(&config);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let _guard = init_tracing(&log_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--set-key") => return set_key(&config),
        Some("--precache") => {
            let Some(origin) = args.get(2) else {
                bail!(USAGE);
            };
            return precache(&config, origin).await;
        }
        Some("--logout") => return logout(&config),
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => bail!("Unknown argument: {}\n{}", other, USAGE),
        None => {}
    }

    info!("Menuboard TUI starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if app.is_authenticated() {
        app.refresh_all_background();
    } else {
        app.start_login();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Menuboard TUI shutting down");
    Ok(())
}

/// Prompt for the project API key and keep it in the OS keychain
fn set_key(config: &Config) -> Result<()> {
    let url = config
        .supabase_url
        .as_deref()
        .context("Set MENUBOARD_SUPABASE_URL before storing a key")?;
    let key = rpassword::prompt_password("API key: ")?;
    let key = key.trim();
    if key.is_empty() {
        bail!("No key entered");
    }
    CredentialStore::store_api_key(url, key)?;
    eprintln!("Key stored for {}", url);
    Ok(())
}

/// Fill the offline cache for a deployed site and drop older generations
async fn precache(config: &Config, origin: &str) -> Result<()> {
    let store = ResponseStore::new(cache_dir(config).join(OFFLINE_DIR));
    let worker = OfflineWorker::new(store, ReqwestFetcher::default());

    eprintln!("Caching {} into {}...", origin, worker.cache_name());
    let optional: Vec<String> = OPTIONAL_URLS.iter().map(|u| u.to_string()).collect();
    let report = worker.install(&static_urls(origin), &optional).await?;
    let deleted = worker.activate()?;

    eprintln!("Cached {} responses", report.cached);
    for url in &report.skipped {
        eprintln!("  skipped {}", url);
    }
    for name in &deleted {
        eprintln!("  removed old cache {}", name);
    }
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let mut session = Session::new(cache_dir(config));
    session.clear()?;
    eprintln!("Logged out");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
