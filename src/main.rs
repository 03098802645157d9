//! mealboard - Browse and rate school lunch menus
//!
//! A terminal UI application that shows a school's daily menu from the NEIS
//! Open API and lets signed-in users rate dishes and keep favorites.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mealboard::app::{App, AppAction};
use mealboard::auth::LocalIdentity;
use mealboard::cli::{Cli, StartupConfig};
use mealboard::config::Config;
use mealboard::data::NeisClient;
use mealboard::orchestrator::{Collaborators, MealOrchestrator};
use mealboard::report::day_report;
use mealboard::store::LocalStore;
use mealboard::ui;

/// Timeout for polling terminal events
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` controls the level (default `warn`). The TUI owns the terminal,
/// so interactive runs log to a file; --print runs log to stderr.
fn init_tracing(to_stderr: bool) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if to_stderr {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return Ok(None);
    }

    let (dir, file_name) = Config::log_location()?;
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Ok(Some(guard))
}

/// Wires the NEIS client, the local store and the identity provider together
async fn build_orchestrator(config: &Config) -> Result<MealOrchestrator, Box<dyn std::error::Error>> {
    let store = Arc::new(LocalStore::open(config.store_path()?).await?);
    let collaborators = Collaborators {
        meals: Arc::new(NeisClient::new(config)),
        ratings: store.clone(),
        favorites: store,
        identity: Arc::new(LocalIdentity::new()),
    };
    Ok(MealOrchestrator::new(
        collaborators,
        config.school_code.clone(),
        config.policy(),
    ))
}

async fn run(startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    info!(school = %config.school_code, office = %config.office_code, "mealboard starting");

    let mut orchestrator = build_orchestrator(&config).await?;
    if let Some(user) = &startup.user {
        // A failed sign-in is kept as the orchestrator error message
        let _ = orchestrator.sign_in(user).await;
    }

    if startup.print {
        orchestrator.ensure_data_for_date(startup.date).await;
        if let Some(error) = orchestrator.error() {
            eprintln!("{}", error);
        }
        print!("{}", day_report(&orchestrator, startup.date));
        return Ok(());
    }

    let app = App::new(orchestrator, startup.date, Local::now().date_naive());
    run_tui(app).await
}

async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut pending = Some(AppAction::EnsureWindow);

    // Main event loop
    let result: Result<(), Box<dyn std::error::Error>> = async {
        loop {
            if let Some(action) = pending.take() {
                app.busy = true;
                terminal.draw(|f| ui::render(f, &app))?;
                app.perform(action).await;
                app.busy = false;
            }

            app.orchestrator.sync_identity().await;
            terminal.draw(|f| ui::render(f, &app))?;

            // Poll for keyboard events with 100ms timeout
            if event::poll(EVENT_POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        pending = app.handle_key(key);
                    }
                }
            }

            // Check if we should quit
            if app.should_quit {
                break;
            }
        }
        Ok(())
    }
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let startup = match StartupConfig::from_cli_today(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_tracing(startup.print) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(startup).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
