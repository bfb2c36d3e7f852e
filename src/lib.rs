//! Freshtracks — automated new-release playlist curation for Spotify.
//!
//! The crate keeps a destination playlist stocked with recent releases from a
//! watched list of artists. It authenticates against the Spotify Web API,
//! discovers albums and singles released inside a trailing date window,
//! optionally narrows the result by audio-feature thresholds, and synchronizes
//! a playlist using one of two policies (replace or incremental).
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local callback server and the hosted OAuth endpoints
//! - `cli` - Command-line command implementations
//! - `config` - Environment/.env configuration and the artists file
//! - `management` - Token cache and persisted pipeline state
//! - `pipeline` - Release discovery, vibe filter, playlist sync, orchestrator
//! - `schedule` - Cadence parsing and the watch loop
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE, state strings, release-date helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod pipeline;
pub mod schedule;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Uses a boxed dynamic error trait object with Send + Sync bounds so it can
/// cross await points and task boundaries.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Accepts the same arguments as `println!`.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program
/// with exit code 1.
///
/// Only for unrecoverable errors where continuing makes no sense. Accepts the
/// same arguments as `println!`.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// For recoverable issues the user should notice. Accepts the same arguments
/// as `println!`.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
