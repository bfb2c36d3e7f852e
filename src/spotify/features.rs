use reqwest::Client;

use crate::{
    config::Config,
    types::{AudioFeatures, AudioFeaturesResponse},
};

/// Bulk audio-features lookup.
///
/// One call covers up to 100 ids; the response preserves input order with a
/// null entry for every id Spotify has no data for, so callers can drop the
/// missing ones silently.
pub async fn get_audio_features(
    cfg: &Config,
    token: &str,
    track_ids: &[String],
) -> Result<Vec<Option<AudioFeatures>>, reqwest::Error> {
    let api_url = format!(
        "{uri}/audio-features?ids={ids}",
        uri = cfg.api_url,
        ids = track_ids.join(",")
    );

    let client = Client::new();
    let response = client
        .get(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;

    let res = response.json::<AudioFeaturesResponse>().await?;
    Ok(res.audio_features)
}
