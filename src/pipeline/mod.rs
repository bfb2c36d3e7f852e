//! The curation pipeline: discover → (vibe) → sync.
//!
//! The remote streaming service is consumed through the [`StreamingApi`]
//! trait, which names exactly the capabilities the pipeline needs. The real
//! implementation wraps the `spotify` client modules; tests drive the
//! pipeline against an in-memory fake.

pub mod discovery;
pub mod sync;
pub mod vibe;

use std::collections::HashSet;

pub use discovery::{DiscoveredAlbum, discover, discover_releases};
pub use sync::{SyncError, SyncPolicy, SyncReport};

use crate::{
    Res,
    config::Config,
    info,
    management::{FileStateStore, PROCESSED_RELEASES_STATE},
    spotify, success,
    types::{Album, Artist, AudioFeatures, Playlist, Track},
    warning,
};

/// Capability set the pipeline consumes from the streaming service.
pub trait StreamingApi {
    /// Best-match artist lookup by display name; `None` when nothing matches.
    fn search_artist(&self, name: &str) -> impl Future<Output = Res<Option<Artist>>> + Send;

    /// Albums and singles of one artist.
    fn artist_releases(&self, artist_id: &str) -> impl Future<Output = Res<Vec<Album>>> + Send;

    fn album_tracks(&self, album_id: &str) -> impl Future<Output = Res<Vec<Track>>> + Send;

    /// Bulk feature lookup; entries are `None` for unavailable ids.
    fn audio_features(
        &self,
        track_ids: &[String],
    ) -> impl Future<Output = Res<Vec<Option<AudioFeatures>>>> + Send;

    /// Every playlist of the current account, all pages followed.
    fn user_playlists(&self) -> impl Future<Output = Res<Vec<Playlist>>> + Send;

    /// Creates a playlist for the current account and returns its id.
    fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> impl Future<Output = Res<String>> + Send;

    /// Appends track URIs; callers chunk to at most 100 per call.
    fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> impl Future<Output = Res<()>> + Send;

    fn unfollow_playlist(&self, playlist_id: &str) -> impl Future<Output = Res<()>> + Send;
}

/// The real client: the `spotify` modules bound to one config and one
/// access token. A pipeline run is short compared to token lifetime, so the
/// token is acquired once up front.
pub struct SpotifyApi {
    cfg: Config,
    token: String,
}

impl SpotifyApi {
    pub fn new(cfg: Config, token: String) -> Self {
        Self { cfg, token }
    }
}

impl StreamingApi for SpotifyApi {
    async fn search_artist(&self, name: &str) -> Res<Option<Artist>> {
        Ok(spotify::artists::search_artist(&self.cfg, &self.token, name).await?)
    }

    async fn artist_releases(&self, artist_id: &str) -> Res<Vec<Album>> {
        Ok(spotify::releases::get_releases_for_artist(&self.cfg, &self.token, artist_id, 50).await?)
    }

    async fn album_tracks(&self, album_id: &str) -> Res<Vec<Track>> {
        Ok(spotify::releases::get_album_tracks(&self.cfg, &self.token, album_id).await?)
    }

    async fn audio_features(&self, track_ids: &[String]) -> Res<Vec<Option<AudioFeatures>>> {
        Ok(spotify::features::get_audio_features(&self.cfg, &self.token, track_ids).await?)
    }

    async fn user_playlists(&self) -> Res<Vec<Playlist>> {
        Ok(spotify::playlist::get_user_playlists(&self.cfg, &self.token).await?)
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Res<String> {
        let user = spotify::playlist::current_user(&self.cfg, &self.token).await?;
        let created =
            spotify::playlist::create(&self.cfg, &self.token, &user.id, name, description).await?;
        Ok(created.id)
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        spotify::playlist::add_tracks(&self.cfg, &self.token, playlist_id, uris.to_vec()).await?;
        Ok(())
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        Ok(spotify::playlist::unfollow(&self.cfg, &self.token, playlist_id).await?)
    }
}

/// One full pipeline invocation.
///
/// Linear stages: authenticate, discover, optionally vibe-filter, sync.
/// Any stage error aborts the remaining stages. Nothing discovered is
/// persisted on failure; discovery is side-effect-free and the next run
/// recomputes it from scratch.
pub async fn run(cfg: &Config, policy: SyncPolicy) -> Res<SyncReport> {
    let token = spotify::auth::acquire_token(cfg).await?;
    success!("Authenticated with Spotify.");

    let artists = cfg.load_artists().await?;
    if artists.is_empty() {
        warning!("No artists found in {}.", cfg.artists_file.display());
        return Ok(SyncReport::default());
    }

    let api = SpotifyApi::new(cfg.clone(), token.access_token);

    let releases = discover_releases(&api, &artists, cfg.days_back).await?;
    let mut track_ids: HashSet<String> = releases
        .iter()
        .flat_map(|r| r.tracks.iter().map(|t| t.id.clone()))
        .collect();
    info!(
        "Found {} new tracks across {} releases.",
        track_ids.len(),
        releases.len()
    );

    if let Some(thresholds) = cfg.vibe {
        track_ids = vibe::filter(&api, track_ids, thresholds).await?;
        info!("{} tracks passed the vibe filter.", track_ids.len());
    }

    let store = FileStateStore::new(PROCESSED_RELEASES_STATE);
    let report = sync::sync(&api, &store, cfg, policy, &releases, &track_ids).await?;
    Ok(report)
}
