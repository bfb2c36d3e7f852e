use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config::Config,
    types::{Artist, SearchArtistsResponse},
};

/// Resolves an artist display name to its best match.
///
/// Uses the search endpoint with `limit=1` and takes the first result, which
/// is Spotify's own relevance ranking. Returns `Ok(None)` when the name
/// resolves to nothing; callers treat that as a skip, not an error.
///
/// 502 responses are retried after a 10-second delay; other errors propagate.
pub async fn search_artist(
    cfg: &Config,
    token: &str,
    name: &str,
) -> Result<Option<Artist>, reqwest::Error> {
    let api_url = format!("{uri}/search", uri = cfg.api_url);

    loop {
        let client = Client::new();
        let response = client
            .get(&api_url)
            .query(&[("q", name), ("type", "artist"), ("limit", "1")])
            .bearer_auth(token)
            .send()
            .await;

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

        let res = response.json::<SearchArtistsResponse>().await?;
        return Ok(res.artists.items.into_iter().next());
    }
}
