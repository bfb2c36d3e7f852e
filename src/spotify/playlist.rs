use reqwest::Client;

use crate::{
    config::Config,
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatePlaylistResponse,
        CurrentUser, GetUserPlaylistsResponse, Playlist,
    },
};

/// Identity of the authenticated account; playlist creation is scoped to it.
pub async fn current_user(cfg: &Config, token: &str) -> Result<CurrentUser, reqwest::Error> {
    let api_url = format!("{uri}/me", uri = cfg.api_url);

    let client = Client::new();
    let response = client
        .get(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;

    response.json::<CurrentUser>().await
}

/// Lists every playlist owned or followed by the current account.
///
/// The endpoint is paginated; the `next` URL is followed until exhausted so
/// prefix matching and exact-name lookup see the full collection.
pub async fn get_user_playlists(cfg: &Config, token: &str) -> Result<Vec<Playlist>, reqwest::Error> {
    let client = Client::new();
    let mut playlists = Vec::new();
    let mut url = Some(format!("{uri}/me/playlists?limit=50", uri = cfg.api_url));

    while let Some(api_url) = url {
        let response = client
            .get(&api_url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let page = response.json::<GetUserPlaylistsResponse>().await?;
        playlists.extend(page.items);
        url = page.next;
    }

    Ok(playlists)
}

/// Creates a public playlist for the given user.
pub async fn create(
    cfg: &Config,
    token: &str,
    user_id: &str,
    name: &str,
    description: &str,
) -> Result<CreatePlaylistResponse, reqwest::Error> {
    let api_url = format!(
        "{uri}/users/{user_id}/playlists",
        uri = cfg.api_url,
        user_id = user_id
    );

    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: true,
        collaborative: false,
    };

    let client = Client::new();
    let response = client
        .post(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    response.json::<CreatePlaylistResponse>().await
}

/// Appends track URIs to a playlist. Callers chunk to at most 100 per call.
pub async fn add_tracks(
    cfg: &Config,
    token: &str,
    playlist_id: &str,
    uris: Vec<String>,
) -> Result<AddTracksResponse, reqwest::Error> {
    let api_url = format!(
        "{uri}/playlists/{playlist_id}/tracks",
        uri = cfg.api_url,
        playlist_id = playlist_id
    );

    let body = AddTracksRequest { uris };

    let client = Client::new();
    let response = client
        .post(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    response.json::<AddTracksResponse>().await
}

/// Removes a playlist from the current account.
///
/// Spotify has no hard delete; unfollowing an owned playlist is the API's
/// deletion operation.
pub async fn unfollow(cfg: &Config, token: &str, playlist_id: &str) -> Result<(), reqwest::Error> {
    let api_url = format!(
        "{uri}/playlists/{playlist_id}/followers",
        uri = cfg.api_url,
        playlist_id = playlist_id
    );

    let client = Client::new();
    client
        .delete(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}
