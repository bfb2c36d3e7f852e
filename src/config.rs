//! Configuration for the release curation pipeline.
//!
//! Configuration is resolved once at startup into an immutable [`Config`]
//! value that is threaded through the orchestrator and every component
//! constructor. Values come from environment variables, backed by a `.env`
//! file in the local data directory:
//!
//! - Linux: `~/.local/share/freshtracks/.env`
//! - macOS: `~/Library/Application Support/freshtracks/.env`
//! - Windows: `%LOCALAPPDATA%/freshtracks/.env`
//!
//! The watched artist list lives in a plain text file (one name per line);
//! a missing file is created empty rather than treated as an error.

use std::{env, path::PathBuf};

use crate::{Res, types::VibeThresholds, warning};

/// Immutable runtime configuration, resolved once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// First port tried for the local OAuth callback listener; the probe
    /// walks upward from here until a free port is found.
    pub callback_base_port: u16,
    /// Upper bound on how long the interactive flow waits for the callback.
    pub auth_timeout_secs: u64,
    /// Name prefix for replace-policy playlists (the created name appends
    /// the current date; deletion matches on the prefix).
    pub playlist_prefix: String,
    /// Exact playlist name reused by the incremental policy.
    pub playlist_name: String,
    pub playlist_description: String,
    pub artists_file: PathBuf,
    pub days_back: i64,
    pub vibe: Option<VibeThresholds>,
    /// Fail fast instead of opening a browser when no cached token exists.
    pub unattended: bool,
    /// Root URI the hosted callback redirects back to.
    pub app_base_uri: String,
    /// Bind address for `freshtracks serve`.
    pub hosted_addr: String,
}

impl Config {
    /// Resolves the full configuration from the environment.
    ///
    /// Returns an error naming the first missing required variable. Optional
    /// values fall back to sensible defaults; the vibe thresholds are only
    /// present when all three bounds are set.
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            client_id: require("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: require("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            scope: env_or(
                "SPOTIFY_API_AUTH_SCOPE",
                "playlist-modify-public playlist-modify-private playlist-read-private user-read-private",
            ),
            auth_url: env_or(
                "SPOTIFY_API_AUTH_URL",
                "https://accounts.spotify.com/authorize",
            ),
            token_url: env_or(
                "SPOTIFY_API_TOKEN_URL",
                "https://accounts.spotify.com/api/token",
            ),
            api_url: env_or("SPOTIFY_API_URL", "https://api.spotify.com/v1"),
            callback_base_port: parse_or("CALLBACK_BASE_PORT", 8888),
            auth_timeout_secs: parse_or("AUTH_TIMEOUT_SECS", 300),
            playlist_prefix: env_or("PLAYLIST_NAME_PREFIX", "New tracks for the week of"),
            playlist_name: env_or("PLAYLIST_NAME", "New Releases Playlist"),
            playlist_description: env_or(
                "PLAYLIST_DESCRIPTION",
                "Automatically updated playlist with new releases from watched artists",
            ),
            artists_file: env::var("ARTISTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_path("artists.txt")),
            days_back: parse_or("DAYS_BACK", 7),
            vibe: vibe_from_env(),
            unattended: flag("FRESHTRACKS_UNATTENDED") || flag("CI"),
            app_base_uri: env_or("APP_BASE_URI", "http://localhost:3000"),
            hosted_addr: env_or("HOSTED_ADDRESS", "127.0.0.1:8080"),
        })
    }

    /// Redirect URI for a callback listener bound on `port`. Must match the
    /// redirect URI registered with the Spotify application.
    pub fn redirect_uri(&self, port: u16) -> String {
        format!("http://127.0.0.1:{}/callback", port)
    }

    /// Redirect URI for the hosted variant.
    pub fn hosted_redirect_uri(&self) -> String {
        format!("{}/callback", self.app_base_uri)
    }

    /// Loads the watched artist list, one display name per line.
    ///
    /// Blank lines are ignored. A missing file is created empty with a
    /// warning, mirroring first-run behavior: the user gets a file to edit
    /// instead of an error.
    pub async fn load_artists(&self) -> Res<Vec<String>> {
        match async_fs::read_to_string(&self.artists_file).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warning!(
                    "Artists file not found at {}. Creating an empty one.",
                    self.artists_file.display()
                );
                if let Some(parent) = self.artists_file.parent() {
                    async_fs::create_dir_all(parent).await?;
                }
                async_fs::write(&self.artists_file, "").await?;
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Loads environment variables from the `.env` file in the local data
/// directory, creating the directory on first run. A missing `.env` is not an
/// error; plain environment variables still apply.
pub async fn load_env() -> Result<(), String> {
    let path = data_path(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Path under the platform-specific application data directory.
pub fn data_path(file: &str) -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("freshtracks");
    path.push(file);
    path
}

fn require(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{} must be set", key))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    matches!(
        env::var(key).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

fn vibe_from_env() -> Option<VibeThresholds> {
    let min_energy = env::var("VIBE_MIN_ENERGY").ok()?.parse().ok()?;
    let min_danceability = env::var("VIBE_MIN_DANCEABILITY").ok()?.parse().ok()?;
    let max_acousticness = env::var("VIBE_MAX_ACOUSTICNESS").ok()?.parse().ok()?;
    Some(VibeThresholds {
        min_energy,
        min_danceability,
        max_acousticness,
    })
}
