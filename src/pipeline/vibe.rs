use std::collections::HashSet;

use crate::{Res, types::{AudioFeatures, VibeThresholds}};

use super::StreamingApi;

/// Narrows a track set to those whose audio features satisfy the thresholds.
///
/// Features are fetched in bulk, 100 ids per call. A track Spotify returns
/// no feature data for (removed, regionally restricted) is dropped silently.
/// This is a pure filter: the output is always a subset of the input.
pub async fn filter<S: StreamingApi>(
    api: &S,
    track_ids: HashSet<String>,
    thresholds: VibeThresholds,
) -> Res<HashSet<String>> {
    let ids: Vec<String> = track_ids.iter().cloned().collect();
    let mut passing = HashSet::new();

    for chunk in ids.chunks(100) {
        let features = api.audio_features(chunk).await?;
        for f in features.into_iter().flatten() {
            if track_ids.contains(&f.id) && passes(&f, &thresholds) {
                passing.insert(f.id);
            }
        }
    }

    Ok(passing)
}

/// All three bounds are conjunctive; there is no disjunctive or weighted mode.
pub fn passes(features: &AudioFeatures, thresholds: &VibeThresholds) -> bool {
    features.energy >= thresholds.min_energy
        && features.danceability >= thresholds.min_danceability
        && features.acousticness <= thresholds.max_acousticness
}
