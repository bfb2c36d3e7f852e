use std::collections::HashSet;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Res, utils, warning};

use super::StreamingApi;

use crate::types::{Album, Track};

/// An album inside the date window, together with its tracks.
///
/// Discovery keeps the album/track association so the incremental sync
/// policy can mark whole albums as processed; the flat track-id set is
/// derived from this.
#[derive(Debug, Clone)]
pub struct DiscoveredAlbum {
    pub album: Album,
    pub tracks: Vec<Track>,
}

/// Enumerates every album or single released inside the trailing window.
///
/// For each artist name: resolve the single best match (a name that resolves
/// to nothing is skipped with a warning, never an error for the run), list
/// albums and singles, and keep those dated on or after the cutoff. The
/// boundary is inclusive and date-only. Albums dated before the cutoff are
/// skipped without fetching their tracks. Albums are deduplicated across
/// artists, so a collaboration surfacing from two lookups appears once.
pub async fn discover_releases<S: StreamingApi>(
    api: &S,
    artists: &[String],
    days_back: i64,
) -> Res<Vec<DiscoveredAlbum>> {
    let cutoff = utils::release_cutoff(days_back);

    let pb = ProgressBar::new(artists.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut seen_albums: HashSet<String> = HashSet::new();
    let mut discovered = Vec::new();

    for name in artists {
        pb.set_message(name.clone());

        let artist = match api.search_artist(name).await? {
            Some(artist) => artist,
            None => {
                warning!("Artist not found: {}", name);
                pb.inc(1);
                continue;
            }
        };

        let albums = api.artist_releases(&artist.id).await?;
        for album in albums {
            let Some(date) = utils::parse_release_date(&album.release_date) else {
                warning!(
                    "Skipping {} ({}): unparsable release date '{}'",
                    album.name,
                    album.id,
                    album.release_date
                );
                continue;
            };
            if date < cutoff {
                continue;
            }
            if !seen_albums.insert(album.id.clone()) {
                continue;
            }

            let tracks = api.album_tracks(&album.id).await?;
            discovered.push(DiscoveredAlbum { album, tracks });
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(discovered)
}

/// Deduplicated set of track ids released inside the window.
///
/// Set semantics collapse feature/collab tracks reachable from more than one
/// artist; no ordering is guaranteed.
pub async fn discover<S: StreamingApi>(
    api: &S,
    artists: &[String],
    days_back: i64,
) -> Res<HashSet<String>> {
    let releases = discover_releases(api, artists, days_back).await?;
    Ok(releases
        .into_iter()
        .flat_map(|r| r.tracks.into_iter().map(|t| t.id))
        .collect())
}
