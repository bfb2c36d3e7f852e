use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
};
use chrono::{Duration, Utc};

use freshtracks::Res;
use freshtracks::api::{self, hosted};
use freshtracks::config::Config;
use freshtracks::management::{StateError, StateStore};
use freshtracks::pipeline::{
    StreamingApi, SyncPolicy, discovery, sync, vibe,
};
use freshtracks::spotify::auth::{self, AuthError};
use freshtracks::types::{
    Album, AlbumArtist, Artist, AudioFeatures, AuthFlowState, Playlist, Track, VibeThresholds,
};

fn test_config() -> Config {
    Config {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        scope: "playlist-modify-public".to_string(),
        auth_url: "https://accounts.example/authorize".to_string(),
        token_url: "https://accounts.example/api/token".to_string(),
        api_url: "https://api.example/v1".to_string(),
        callback_base_port: 8888,
        auth_timeout_secs: 1,
        playlist_prefix: "New tracks for the week of".to_string(),
        playlist_name: "New Releases Playlist".to_string(),
        playlist_description: "test playlist".to_string(),
        artists_file: PathBuf::from("artists.txt"),
        days_back: 7,
        vibe: None,
        unattended: false,
        app_base_uri: "http://localhost:3000".to_string(),
        hosted_addr: "127.0.0.1:8080".to_string(),
    }
}

fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn album(id: &str, name: &str, release_date: &str, artist_id: &str) -> Album {
    Album {
        id: id.to_string(),
        name: name.to_string(),
        release_date: release_date.to_string(),
        release_date_precision: "day".to_string(),
        album_type: "album".to_string(),
        artists: vec![AlbumArtist {
            id: artist_id.to_string(),
            name: artist_id.to_string(),
        }],
    }
}

fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("track {}", id),
        uri: format!("spotify:track:{}", id),
    }
}

fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        public: Some(true),
        snapshot_id: "snap".to_string(),
    }
}

fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// In-memory streaming service; records every mutation for assertions.
#[derive(Default)]
struct FakeApi {
    artists: HashMap<String, Artist>,
    albums: HashMap<String, Vec<Album>>,
    tracks: HashMap<String, Vec<Track>>,
    features: HashMap<String, AudioFeatures>,
    playlists: Mutex<Vec<Playlist>>,
    track_fetches: Mutex<Vec<String>>,
    created: Mutex<Vec<String>>,
    added: Mutex<HashMap<String, Vec<String>>>,
    removed: Mutex<Vec<String>>,
}

impl FakeApi {
    fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    fn added_uris(&self, playlist_id: &str) -> Vec<String> {
        self.added
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl StreamingApi for FakeApi {
    async fn search_artist(&self, name: &str) -> Res<Option<Artist>> {
        Ok(self.artists.get(name).cloned())
    }

    async fn artist_releases(&self, artist_id: &str) -> Res<Vec<Album>> {
        Ok(self.albums.get(artist_id).cloned().unwrap_or_default())
    }

    async fn album_tracks(&self, album_id: &str) -> Res<Vec<Track>> {
        self.track_fetches
            .lock()
            .unwrap()
            .push(album_id.to_string());
        Ok(self.tracks.get(album_id).cloned().unwrap_or_default())
    }

    async fn audio_features(&self, track_ids: &[String]) -> Res<Vec<Option<AudioFeatures>>> {
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }

    async fn user_playlists(&self) -> Res<Vec<Playlist>> {
        Ok(self.playlists.lock().unwrap().clone())
    }

    async fn create_playlist(&self, name: &str, _description: &str) -> Res<String> {
        let mut created = self.created.lock().unwrap();
        let id = format!("playlist-{}", created.len() + 1);
        created.push(name.to_string());
        self.playlists.lock().unwrap().push(playlist(&id, name));
        Ok(id)
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        self.added
            .lock()
            .unwrap()
            .entry(playlist_id.to_string())
            .or_default()
            .extend(uris.iter().cloned());
        Ok(())
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        self.removed.lock().unwrap().push(playlist_id.to_string());
        self.playlists
            .lock()
            .unwrap()
            .retain(|p| p.id != playlist_id);
        Ok(())
    }
}

/// In-memory state store; starts out "file not found" like a first run.
#[derive(Default)]
struct MemoryStateStore {
    items: Mutex<Option<Vec<String>>>,
}

impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Vec<String>, StateError> {
        match &*self.items.lock().unwrap() {
            Some(items) => Ok(items.clone()),
            None => Err(StateError::IoError(std::io::Error::from(
                std::io::ErrorKind::NotFound,
            ))),
        }
    }

    async fn save(&self, items: &[String]) -> Result<(), StateError> {
        *self.items.lock().unwrap() = Some(items.to_vec());
        Ok(())
    }
}

#[tokio::test]
async fn discovery_dedupes_collab_tracks() {
    // The same collaboration album is reachable from both artists.
    let shared = album("alb1", "Joint Album", &days_ago(2), "a1");
    let mut api = FakeApi::default();
    api.artists.insert("One".to_string(), artist("a1", "One"));
    api.artists.insert("Two".to_string(), artist("a2", "Two"));
    api.albums.insert("a1".to_string(), vec![shared.clone()]);
    api.albums.insert("a2".to_string(), vec![shared]);
    api.tracks
        .insert("alb1".to_string(), vec![track("t1"), track("t2")]);

    let ids = discovery::discover(&api, &["One".to_string(), "Two".to_string()], 7)
        .await
        .unwrap();

    assert_eq!(ids, HashSet::from(["t1".to_string(), "t2".to_string()]));
    // The shared album is fetched once, not once per artist
    assert_eq!(api.track_fetches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn discovery_cutoff_boundary_is_inclusive() {
    let mut api = FakeApi::default();
    api.artists.insert("One".to_string(), artist("a1", "One"));
    api.albums.insert(
        "a1".to_string(),
        vec![
            album("on-cutoff", "Boundary", &days_ago(7), "a1"),
            album("too-old", "Stale", &days_ago(8), "a1"),
        ],
    );
    api.tracks
        .insert("on-cutoff".to_string(), vec![track("t1")]);
    api.tracks.insert("too-old".to_string(), vec![track("t2")]);

    let ids = discovery::discover(&api, &["One".to_string()], 7)
        .await
        .unwrap();

    assert_eq!(ids, HashSet::from(["t1".to_string()]));
    // Stale albums are skipped without inspecting their tracks
    assert_eq!(*api.track_fetches.lock().unwrap(), vec!["on-cutoff"]);
}

#[tokio::test]
async fn discovery_skips_unknown_artists() {
    let mut api = FakeApi::default();
    api.artists.insert("Known".to_string(), artist("a1", "Known"));
    api.albums
        .insert("a1".to_string(), vec![album("alb1", "A", &days_ago(1), "a1")]);
    api.tracks.insert("alb1".to_string(), vec![track("t1")]);

    let ids = discovery::discover(
        &api,
        &["Nobody You Know".to_string(), "Known".to_string()],
        7,
    )
    .await
    .unwrap();

    // The miss is skipped; the rest of the run proceeds
    assert_eq!(ids, HashSet::from(["t1".to_string()]));
}

#[tokio::test]
async fn discovery_returns_only_recent_album_tracks() {
    let mut api = FakeApi::default();
    api.artists
        .insert("Drake".to_string(), artist("a1", "Drake"));
    api.albums.insert(
        "a1".to_string(),
        vec![
            album("recent", "Fresh Drop", &days_ago(3), "a1"),
            album("old", "Back Catalog", &days_ago(40), "a1"),
        ],
    );
    api.tracks
        .insert("recent".to_string(), vec![track("t1"), track("t2")]);
    api.tracks.insert(
        "old".to_string(),
        vec![track("t3"), track("t4"), track("t5")],
    );

    let ids = discovery::discover(&api, &["Drake".to_string()], 7)
        .await
        .unwrap();

    assert_eq!(ids, HashSet::from(["t1".to_string(), "t2".to_string()]));
}

#[tokio::test]
async fn vibe_filter_is_a_pure_filter() {
    let mut api = FakeApi::default();
    api.features.insert(
        "pass".to_string(),
        AudioFeatures {
            id: "pass".to_string(),
            energy: 0.9,
            danceability: 0.8,
            acousticness: 0.1,
        },
    );
    api.features.insert(
        "low-energy".to_string(),
        AudioFeatures {
            id: "low-energy".to_string(),
            energy: 0.5,
            danceability: 0.8,
            acousticness: 0.1,
        },
    );
    // "no-data" has no feature entry at all

    let input: HashSet<String> = ["pass", "low-energy", "no-data"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let thresholds = VibeThresholds {
        min_energy: 0.6,
        min_danceability: 0.6,
        max_acousticness: 0.4,
    };

    let output = vibe::filter(&api, input.clone(), thresholds).await.unwrap();

    assert!(output.is_subset(&input));
    assert_eq!(output, HashSet::from(["pass".to_string()]));
}

#[tokio::test]
async fn replace_policy_with_empty_set_creates_nothing() {
    let api = FakeApi::default();
    api.playlists.lock().unwrap().push(playlist(
        "old-auto",
        "New tracks for the week of 01/01/2025",
    ));
    let store = MemoryStateStore::default();
    let cfg = test_config();

    let report = sync::sync(
        &api,
        &store,
        &cfg,
        SyncPolicy::Replace,
        &[],
        &HashSet::new(),
    )
    .await
    .unwrap();

    assert_eq!(api.created_count(), 0);
    assert_eq!(report.tracks_added, 0);
    assert!(report.playlist_id.is_none());
    // Stale auto-generated playlists are still cleaned up
    assert_eq!(*api.removed.lock().unwrap(), vec!["old-auto"]);
}

#[tokio::test]
async fn replace_policy_deletes_by_prefix_and_recreates() {
    let api = FakeApi::default();
    {
        let mut playlists = api.playlists.lock().unwrap();
        playlists.push(playlist("auto", "New tracks for the week of 01/01/2025"));
        playlists.push(playlist("mine", "Hand-curated favorites"));
    }
    let store = MemoryStateStore::default();
    let cfg = test_config();

    let releases = vec![discovery::DiscoveredAlbum {
        album: album("alb1", "Fresh Drop", &days_ago(1), "a1"),
        tracks: vec![track("t1"), track("t2")],
    }];
    let allowed: HashSet<String> = ["t1", "t2"].iter().map(|s| s.to_string()).collect();

    let report = sync::sync(&api, &store, &cfg, SyncPolicy::Replace, &releases, &allowed)
        .await
        .unwrap();

    // Only the prefix-matching playlist was removed
    assert_eq!(*api.removed.lock().unwrap(), vec!["auto"]);
    assert_eq!(api.created_count(), 1);
    assert_eq!(report.tracks_added, 2);

    let playlist_id = report.playlist_id.unwrap();
    assert_eq!(
        api.added_uris(&playlist_id),
        vec!["spotify:track:t1", "spotify:track:t2"]
    );
}

#[tokio::test]
async fn incremental_policy_is_idempotent() {
    let api = FakeApi::default();
    let store = MemoryStateStore::default();
    let cfg = test_config();

    let releases = vec![discovery::DiscoveredAlbum {
        album: album("alb1", "Fresh Drop", &days_ago(1), "a1"),
        tracks: vec![track("t1"), track("t2")],
    }];
    let allowed: HashSet<String> = ["t1", "t2"].iter().map(|s| s.to_string()).collect();

    let first = sync::sync(
        &api,
        &store,
        &cfg,
        SyncPolicy::Incremental,
        &releases,
        &allowed,
    )
    .await
    .unwrap();
    assert_eq!(first.tracks_added, 2);
    assert_eq!(first.albums_logged, 1);
    assert_eq!(api.created_count(), 1);

    // Second run with an unchanged catalog: same playlist, zero additions
    let second = sync::sync(
        &api,
        &store,
        &cfg,
        SyncPolicy::Incremental,
        &releases,
        &allowed,
    )
    .await
    .unwrap();
    assert_eq!(second.tracks_added, 0);
    assert_eq!(api.created_count(), 1);

    let playlist_id = first.playlist_id.unwrap();
    assert_eq!(api.added_uris(&playlist_id).len(), 2);
}

#[tokio::test]
async fn incremental_policy_reuses_existing_playlist() {
    let api = FakeApi::default();
    api.playlists
        .lock()
        .unwrap()
        .push(playlist("existing", "New Releases Playlist"));
    let store = MemoryStateStore::default();
    let cfg = test_config();

    let releases = vec![discovery::DiscoveredAlbum {
        album: album("alb1", "Fresh Drop", &days_ago(1), "a1"),
        tracks: vec![track("t1")],
    }];
    let allowed: HashSet<String> = HashSet::from(["t1".to_string()]);

    let report = sync::sync(
        &api,
        &store,
        &cfg,
        SyncPolicy::Incremental,
        &releases,
        &allowed,
    )
    .await
    .unwrap();

    assert_eq!(api.created_count(), 0);
    assert_eq!(report.playlist_id.as_deref(), Some("existing"));
    assert_eq!(api.added_uris("existing"), vec!["spotify:track:t1"]);
}

#[tokio::test]
async fn callback_reports_failed_exchange_through_slot() {
    let mut cfg = test_config();
    // Nothing listens here; the exchange fails immediately.
    cfg.token_url = "http://127.0.0.1:1/token".to_string();

    let slot = Arc::new(tokio::sync::Mutex::new(Some(AuthFlowState {
        code_verifier: Some("verifier".to_string()),
        state: "expected".to_string(),
        redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        token: None,
    })));

    let mut params = HashMap::new();
    params.insert("code".to_string(), "code123".to_string());
    params.insert("state".to_string(), "expected".to_string());

    api::callback(Query(params), Extension(Arc::clone(&slot)), Extension(cfg)).await;

    // The failure lands in the slot so the waiting flow aborts right away
    // instead of reporting a timeout minutes later.
    let guard = slot.lock().await;
    let flow = guard.as_ref().unwrap();
    assert!(matches!(flow.token, Some(Err(_))));
    assert!(flow.code_verifier.is_none());
}

#[tokio::test]
async fn hosted_callback_rejects_state_mismatch() {
    let mut cfg = test_config();
    // If the handler attempted an exchange anyway, it would surface as a
    // different failure than the state rejection asserted below.
    cfg.token_url = "http://127.0.0.1:1/token".to_string();

    let mut params = HashMap::new();
    params.insert("code".to_string(), "code123".to_string());
    params.insert("state".to_string(), "xyz".to_string());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        format!("{}=abc", hosted::STATE_COOKIE).parse().unwrap(),
    );

    let response = hosted::callback(Query(params), headers, Extension(cfg)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn health_reports_service_identity() {
    let axum::response::Json(body) = api::health().await;
    assert_eq!(body["service"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unattended_auth_fails_fast_without_listener() {
    let mut cfg = test_config();
    cfg.unattended = true;

    // Fails before binding a port, opening a browser, or touching the network
    let result = auth::interactive(&cfg).await;
    assert!(matches!(result, Err(AuthError::NoCachedToken)));
}
