//! blindspot · secure-coding trainer for the terminal
//!
//! - `content`: challenge catalog and vulnerability explanations (YAML)
//! - `store`: progress/settings documents (JSON, atomic writes)
//! - `selector`: traversal orders and the next-incomplete search
//! - `state`: `GameState`, the single owner of everything mutable
//! - `navigator`: the screen state machine driven by input events
//! - `tui`: ratatui/crossterm front end
//!
//! Important env variables:
//!   BLINDSPOT_HOME   : data directory (default ~/.blindspot-game)
//!   BLINDSPOT_CONFIG : path to the TOML config (default <data dir>/config.toml)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

pub mod cli;
pub mod config;
pub mod content;
pub mod domain;
pub mod navigator;
pub mod notice;
pub mod progress;
pub mod report;
pub mod selector;
pub mod session;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod tui;
pub mod util;

#[cfg(test)]
mod testutil;

pub use content::{ContentCatalog, ContentError};
pub use navigator::{Effect, Event, Navigator, Screen};
pub use state::GameState;
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
