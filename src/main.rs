//! blindspot binary: parse flags, load content and saved state, run the TUI.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use blindspot::cli::{Args, EXIT_USAGE};
use blindspot::config::{data_dir, load_app_config};
use blindspot::content::{load_catalog, load_explanations};
use blindspot::notice::Notices;
use blindspot::store::open_store;
use blindspot::util::error_chain;
use blindspot::{telemetry, tui, GameState, Navigator};

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    // Without a data directory the game still runs; it just cannot save.
    let (data_dir, dir_error) = match data_dir() {
        Ok(dir) => (Some(dir), None),
        Err(e) => (None, Some(error_chain(&e))),
    };
    telemetry::init_tracing(data_dir.as_deref());

    let session_id = Uuid::new_v4();
    let _span = info_span!("session", id = %session_id).entered();
    info!(target: "blindspot", version = blindspot::VERSION, data_dir = ?data_dir, "Starting");
    if let Some(e) = &dir_error {
        warn!(target: "blindspot", error = %e, "No usable data directory; progress will not be saved");
    }

    let cfg = load_app_config(data_dir.as_deref());
    let catalog = load_catalog(cfg.challenges_path.as_deref()).context("failed to load challenges")?;

    if args.list_categories {
        for set in catalog.sets() {
            println!("{} ({} challenges)", set.category, set.challenges.len());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let filter = match args.session_filter(&catalog) {
        Ok(filter) => filter,
        Err(e) => {
            eprint!("error: {e}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let explanations = load_explanations(cfg.explanations_path.as_deref());
    if args.no_save {
        info!(target: "blindspot", "Running without saving");
    }
    let store = open_store(data_dir.as_deref(), !args.no_save);
    let mut notices = Notices::new(cfg.error_notice_window(), cfg.success_notice_window());
    if let Some(e) = dir_error {
        notices.set_error(format!("progress will not be saved: {e}"));
    }
    let mut state = GameState::load(catalog, explanations, store, notices);

    if let Some(filter) = filter {
        if let Err(e) = state.begin_scoped_session(filter) {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    }

    let mut nav = Navigator::new(&state);
    tui::run(&mut state, &mut nav)?;
    info!(
        target: "blindspot",
        completed = state.completed_count(),
        total = state.total_count(),
        "Session finished"
    );
    Ok(ExitCode::SUCCESS)
}
