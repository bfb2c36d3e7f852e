//! Spotify Web API client.
//!
//! Thin async wrappers over the handful of endpoints the pipeline consumes:
//! authorization (OAuth 2.0 authorization-code with PKCE and an anti-forgery
//! state value), artist search, album and track listing, bulk audio-features
//! lookup, and playlist CRUD. All calls are plain `reqwest` requests with
//! bearer auth; read paths retry 502 responses and honor 429 `Retry-After`,
//! mutating paths propagate the first failure.

pub mod artists;
pub mod auth;
pub mod features;
pub mod playlist;
pub mod releases;
