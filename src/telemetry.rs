//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,progress=debug,content=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! The terminal belongs to the game, so events go to `<data dir>/blindspot.log`
//! (appended, no ANSI colours). If that file cannot be opened logging is dropped.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "blindspot.log";

pub fn init_tracing(data_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info,blindspot=debug,progress=debug,content=debug"));

    let file = data_dir.and_then(|dir| {
        OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)).ok()
    });
    let writer = match file {
        Some(f) => BoxMakeWriter::new(Mutex::new(f)),
        None => BoxMakeWriter::new(std::io::sink),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
