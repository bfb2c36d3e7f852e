use std::collections::HashSet;
use std::fmt;

use chrono::Utc;

use crate::{
    config::Config,
    info,
    management::{ProcessedReleaseLog, StateError, StateStore},
    success,
};

use super::{DiscoveredAlbum, StreamingApi};

/// How the destination playlist is kept in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SyncPolicy {
    /// Delete every auto-generated playlist matching the configured name
    /// prefix, then create a fresh dated one. Destructive by design: manual
    /// edits to a matching playlist are lost every run, which is what keeps
    /// the weekly list clean.
    Replace,
    /// Reuse one playlist by exact name (created once if absent) and append
    /// only tracks from albums not yet in the processed-release log.
    Incremental,
}

#[derive(Debug)]
pub enum SyncError {
    /// Non-success from the provider on a mutating call. No retry.
    Remote(Box<dyn std::error::Error + Send + Sync>),
    State(StateError),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for SyncError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        SyncError::Remote(err)
    }
}

impl From<StateError> for SyncError {
    fn from(err: StateError) -> Self {
        SyncError::State(err)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Remote(e) => write!(f, "remote service error: {}", e),
            SyncError::State(e) => write!(f, "state persistence error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub playlist_id: Option<String>,
    pub tracks_added: usize,
    pub playlists_removed: usize,
    pub albums_logged: usize,
}

/// Applies the selected policy to the discovered releases.
///
/// `allowed` is the track-id set that survived discovery (and, when
/// configured, the vibe filter); only tracks in it are ever inserted, each
/// at most once.
pub async fn sync<S: StreamingApi, K: StateStore>(
    api: &S,
    store: &K,
    cfg: &Config,
    policy: SyncPolicy,
    releases: &[DiscoveredAlbum],
    allowed: &HashSet<String>,
) -> Result<SyncReport, SyncError> {
    match policy {
        SyncPolicy::Replace => replace(api, cfg, releases, allowed).await,
        SyncPolicy::Incremental => incremental(api, store, cfg, releases, allowed).await,
    }
}

/// Collects URIs for the allowed tracks of the given releases, each track at
/// most once, in release order.
fn collect_uris(releases: &[&DiscoveredAlbum], allowed: &HashSet<String>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut uris = Vec::new();
    for release in releases {
        for track in &release.tracks {
            if allowed.contains(&track.id) && seen.insert(track.id.as_str()) {
                uris.push(track.uri.clone());
            }
        }
    }
    uris
}

async fn replace<S: StreamingApi>(
    api: &S,
    cfg: &Config,
    releases: &[DiscoveredAlbum],
    allowed: &HashSet<String>,
) -> Result<SyncReport, SyncError> {
    let all: Vec<&DiscoveredAlbum> = releases.iter().collect();
    let uris = collect_uris(&all, allowed);

    // Stale auto-generated playlists go first; the listing follows every
    // pagination cursor, so prefix matches beyond the first page are found.
    let mut removed = 0;
    for playlist in api.user_playlists().await? {
        if playlist.name.starts_with(&cfg.playlist_prefix) {
            api.unfollow_playlist(&playlist.id).await?;
            removed += 1;
        }
    }
    if removed > 0 {
        info!("Removed {} stale auto-generated playlist(s).", removed);
    }

    if uris.is_empty() {
        info!("No tracks to add; skipping playlist creation.");
        return Ok(SyncReport {
            playlists_removed: removed,
            ..Default::default()
        });
    }

    let name = format!(
        "{} {}",
        cfg.playlist_prefix,
        Utc::now().format("%m/%d/%Y")
    );
    let playlist_id = api
        .create_playlist(&name, &cfg.playlist_description)
        .await?;

    for chunk in uris.chunks(100) {
        api.add_tracks(&playlist_id, chunk).await?;
    }
    success!("Created playlist '{}' with {} tracks.", name, uris.len());

    Ok(SyncReport {
        playlist_id: Some(playlist_id),
        tracks_added: uris.len(),
        playlists_removed: removed,
        albums_logged: 0,
    })
}

async fn incremental<S: StreamingApi, K: StateStore>(
    api: &S,
    store: &K,
    cfg: &Config,
    releases: &[DiscoveredAlbum],
    allowed: &HashSet<String>,
) -> Result<SyncReport, SyncError> {
    let mut log = ProcessedReleaseLog::load(store).await?;

    let fresh: Vec<&DiscoveredAlbum> = releases
        .iter()
        .filter(|r| !log.contains(&r.album.id))
        .collect();

    if fresh.is_empty() {
        info!("No unprocessed releases; playlist unchanged.");
        return Ok(SyncReport::default());
    }

    let uris = collect_uris(&fresh, allowed);

    // Find-or-create by exact name: a second run reuses the existing id.
    let existing = api
        .user_playlists()
        .await?
        .into_iter()
        .find(|p| p.name == cfg.playlist_name);
    let playlist_id = match existing {
        Some(p) => p.id,
        None => {
            api.create_playlist(&cfg.playlist_name, &cfg.playlist_description)
                .await?
        }
    };

    for chunk in uris.chunks(100) {
        api.add_tracks(&playlist_id, chunk).await?;
    }

    let mut logged = 0;
    for release in &fresh {
        if log.insert(release.album.id.clone()) {
            logged += 1;
        }
    }
    log.persist(store).await?;

    success!(
        "Appended {} tracks from {} new release(s) to '{}'.",
        uris.len(),
        logged,
        cfg.playlist_name
    );

    Ok(SyncReport {
        playlist_id: Some(playlist_id),
        tracks_added: uris.len(),
        playlists_removed: 0,
        albums_logged: logged,
    })
}
