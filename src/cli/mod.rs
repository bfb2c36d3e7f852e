//! Command-line command implementations.
//!
//! Thin wrappers around the pipeline: they resolve configuration, run the
//! relevant stage(s), and present results with the crate's status macros and
//! tables. Fatal errors terminate the process through `error!`.

mod auth;
mod preview;
mod run;

pub use auth::auth;
pub use preview::preview;
pub use run::run;
