use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config::Config,
    types::{Album, AlbumResponse, AlbumTracksResponse, Track},
    warning,
};

/// Lists an artist's albums and singles.
///
/// Fetches `/artists/{id}/albums` restricted to `include_groups=album,single`;
/// date-window filtering happens in the discovery stage, not here. Rate-limit
/// responses are handled by honoring the `Retry-After` header for delays up
/// to 120 seconds.
pub async fn get_releases_for_artist(
    cfg: &Config,
    token: &str,
    artist_id: &str,
    limit: u32,
) -> Result<Vec<Album>, reqwest::Error> {
    let client = Client::new();
    let api_url = format!(
        "{uri}/artists/{id}/albums?include_groups=album,single&limit={limit}",
        uri = cfg.api_url,
        id = artist_id,
        limit = limit
    );

    loop {
        let response = client.get(&api_url).bearer_auth(token).send().await?;
        // check for retry-after header
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            if let Some(retry_after) = response.headers().get("retry-after") {
                let retry_after = retry_after
                    .to_str()
                    .unwrap_or("0")
                    .parse::<u64>()
                    .unwrap_or(0);
                if retry_after <= 120 {
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                } else {
                    warning!(
                        "Retry-After has reached an abnormal high of {} seconds. Try again tomorrow.",
                        retry_after
                    );
                }
            }
        }

        let json = response.error_for_status()?.json::<AlbumResponse>().await?;
        return Ok(json.items);
    }
}

/// Lists the tracks of one album.
///
/// 502 responses are retried after a 10-second delay, matching the other read
/// paths.
pub async fn get_album_tracks(
    cfg: &Config,
    token: &str,
    album_id: &str,
) -> Result<Vec<Track>, reqwest::Error> {
    let api_url = format!(
        "{uri}/albums/{id}/tracks?limit=50",
        uri = cfg.api_url,
        id = album_id
    );

    loop {
        let client = Client::new();
        let response = client.get(&api_url).bearer_auth(token).send().await;

        let response = match response {
            Ok(resp) => match resp.error_for_status() {
                Ok(valid_response) => valid_response,
                Err(err) => {
                    if let Some(status) = err.status() {
                        if status == StatusCode::BAD_GATEWAY {
                            sleep(Duration::from_secs(10)).await;
                            continue; // retry
                        }
                    }
                    return Err(err); // propagate other errors
                }
            },
            Err(err) => {
                return Err(err);
            } // network or reqwest error
        };

        let res = response.json::<AlbumTracksResponse>().await?;
        return Ok(res.items);
    }
}
