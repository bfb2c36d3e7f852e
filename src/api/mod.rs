//! HTTP handlers for the two OAuth surfaces.
//!
//! `callback` serves the local loopback flow used by the CLI: a short-lived
//! server captures exactly one redirect, validates the anti-forgery state and
//! exchanges the authorization code for tokens in place.
//!
//! `hosted` exposes the same handshake as three endpoints for a browser-based
//! frontend (`/login`, `/callback`, `/refresh_token`), carrying the state in
//! a cookie instead of in-process memory.

mod callback;
mod health;

pub mod hosted;

pub use callback::callback;
pub use health::health;
