mod app;
mod clock;
mod config;
mod domain;
mod input;
mod persistence;
mod report;
mod ticker;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use app::{AppState, MenuPresenter};
use clap::{Parser, Subcommand};
use clock::{Clock, SystemClock};
use config::Settings;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persistence::{ensure_dir, init_local_dir, resolve_data_dir};
use ratatui::{backend::CrosstermBackend, Terminal};
use report::{ExportOptions, Exporter};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use ticker::{Scheduler, Tick, WakeDetector};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracker::{CrashRecovery, EntryStore, Tracker};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Track your day across a fixed set of activity categories", long_about = None)]
struct Cli {
    /// Data directory (defaults to a local .tally, then ~/.tally)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tally directory in the current directory
    Init,
    /// Export today's summary, including a session in progress
    Report {
        /// Also write the JSON entry list
        #[arg(long)]
        json: bool,
        /// Print to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            init_stderr_logging(cli.verbose);
            let data_dir = init_local_dir()?;
            println!("Initialized tally directory: {}", data_dir.display());
            println!();
            println!("Tally will now keep entries and reports in this directory.");
            println!("Run 'tally' to start tracking.");
            Ok(())
        }
        Some(Commands::Report { json, stdout }) => {
            init_stderr_logging(cli.verbose);
            let settings = load_settings(cli.dir)?;
            run_report(&settings, json, stdout)
        }
        None => {
            let settings = load_settings(cli.dir)?;
            init_file_logging(&settings, cli.verbose)?;
            run_tui(&settings)
        }
    }
}

fn load_settings(dir: Option<PathBuf>) -> Result<Settings> {
    let data_dir = resolve_data_dir(dir.as_deref()).context("Could not resolve data directory")?;
    ensure_dir(&data_dir)?;
    Ok(Settings::new(data_dir))
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_stderr_logging(verbose: bool) {
    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .try_init();
}

/// The terminal menu owns the screen, so logs go to a file in the data dir
fn init_file_logging(settings: &Settings, verbose: bool) -> Result<()> {
    let log_path = settings.log_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Export today's entries without starting the menu
fn run_report(settings: &Settings, json: bool, stdout: bool) -> Result<()> {
    let wall = SystemClock;
    let today = wall.today();

    let mut store = EntryStore::new(settings.entries_path(), today);
    if let Err(err) = store.load_from_durable() {
        warn!(error = %err, "could not read entries, reporting without them");
    }

    let active = match CrashRecovery::new(settings.session_path()).load() {
        Ok(session) => session.filter(|s| clock::day_of(s.start_time) == today),
        Err(err) => {
            warn!(error = %err, "could not read current session");
            None
        }
    };
    let entries = tracker::live_entries(store.all(), active.as_ref(), wall.now());

    let exporter = Exporter::new(settings.data_dir(), domain::category::all());
    let options = ExportOptions {
        as_json: json,
        write_to_disk: !stdout,
    };
    let output = exporter.export(&entries, today, options)?;

    if stdout {
        print!("{}", output.report);
        if let Some(json) = output.json {
            println!();
            println!("{}", json);
        }
    } else {
        if let Some(path) = output.report_path {
            println!("Report written: {}", path.display());
        }
        if let Some(path) = output.json_path {
            println!("JSON written: {}", path.display());
        }
    }
    Ok(())
}

fn run_tui(settings: &Settings) -> Result<()> {
    info!(data_dir = %settings.data_dir.display(), "starting");

    let tracker = Tracker::open(
        settings,
        domain::category::all(),
        SystemClock,
        MenuPresenter::default(),
    );
    let mut app = AppState::new(tracker);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app, settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Close the session, save, and write today's report
    app.tracker.application_terminating();

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<C>,
    settings: &Settings,
) -> Result<()> {
    let mut scheduler = Scheduler::new(settings, Instant::now());
    let mut wake = WakeDetector::new(settings.sleep_gap, app.tracker.now());
    let mut redraw = true;

    loop {
        if redraw || app.tracker.presenter().needs_redraw {
            terminal.draw(|f| ui::render(f, app))?;
            redraw = false;
        }

        // Handle events with timeout for ticking
        if event::poll(settings.poll_interval)? {
            match event::read()? {
                // Only process key press events (ignore key release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if input::handle_key(app, key) {
                        return Ok(());
                    }
                    redraw = true;
                }
                Event::Resize(_, _) => redraw = true,
                _ => {}
            }
        }

        // A large wall-clock jump means the machine was asleep
        if let Some(suspended_at) = wake.observe(app.tracker.now()) {
            app.run(|tracker| {
                tracker.system_sleeping_at(suspended_at).map(|_| {
                    format!(
                        "Stopped tracking at {} (system sleep)",
                        suspended_at.format("%H:%M:%S")
                    )
                })
            });
            redraw = true;
        }

        let now = Instant::now();
        scheduler.set_session_active(app.tracker.state().is_active(), now);
        for tick in scheduler.due(now) {
            match tick {
                Tick::Display => app.tracker.display_tick(),
                Tick::Autosave => {
                    let failures = app.tracker.failure_count();
                    app.tracker.autosave_tick();
                    redraw |= app.tracker.failure_count() > failures;
                }
                Tick::DayCheck => {
                    app.run(|tracker| {
                        tracker
                            .check_day_boundary()
                            .map(|rollover| format!("New day: report for {} written", rollover.previous_day))
                    });
                    redraw = true;
                }
            }
        }
    }
}
