use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Per-flow authorization state handed to the callback server.
///
/// Holds the PKCE verifier and the anti-forgery state string issued when the
/// authorize URL was constructed; the callback fills in `token` with the
/// exchange outcome, success or failure, so the waiting flow reports a failed
/// exchange immediately instead of running out its timeout. The verifier is
/// consumed on first use so at most one authorization code is ever exchanged
/// per flow.
#[derive(Debug, Clone)]
pub struct AuthFlowState {
    pub code_verifier: Option<String>,
    pub state: String,
    pub redirect_uri: String,
    pub token: Option<Result<Token, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArtistsResponse {
    pub artists: SearchArtistsContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArtistsContainer {
    pub items: Vec<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub items: Vec<Album>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: String,
    pub album_type: String,
    pub artists: Vec<AlbumArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumTracksResponse {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub energy: f64,
    pub danceability: f64,
    pub acousticness: f64,
}

/// Bulk lookup response; entries are null for ids Spotify has no data for
/// (removed tracks, regional restrictions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

/// Conjunctive audio-feature bounds; all three must hold for a track to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VibeThresholds {
    pub min_energy: f64,
    pub min_danceability: f64,
    pub max_acousticness: f64,
}

#[derive(Tabled)]
pub struct ReleaseTableRow {
    pub date: String,
    pub album: String,
    pub artists: String,
}
