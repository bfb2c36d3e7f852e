use tabled::Table;

use crate::{
    config::Config,
    error, info,
    pipeline::{self, SpotifyApi},
    spotify,
    types::ReleaseTableRow,
    utils, warning,
};

/// Lists the releases the pipeline would pick up, without touching any
/// playlist. Useful for tuning the artist list and the lookback window.
pub async fn preview(cfg: &Config, days_back: Option<i64>) {
    let days_back = days_back.unwrap_or(cfg.days_back);

    let token = match spotify::auth::acquire_token(cfg).await {
        Ok(token) => token,
        Err(e) => error!("Authentication failed: {}", e),
    };

    let artists = match cfg.load_artists().await {
        Ok(artists) => artists,
        Err(e) => error!("Cannot read artists file: {}", e),
    };
    if artists.is_empty() {
        warning!("No artists found in {}.", cfg.artists_file.display());
        return;
    }

    let api = SpotifyApi::new(cfg.clone(), token.access_token);
    let releases = match pipeline::discover_releases(&api, &artists, days_back).await {
        Ok(releases) => releases,
        Err(e) => error!("Discovery failed: {}", e),
    };

    if releases.is_empty() {
        info!("No releases in the last {} day(s).", days_back);
        return;
    }

    let track_count: usize = releases.iter().map(|r| r.tracks.len()).sum();
    let mut rows: Vec<ReleaseTableRow> = releases
        .iter()
        .map(|r| ReleaseTableRow {
            date: r.album.release_date.clone(),
            album: r.album.name.clone(),
            artists: r
                .album
                .artists
                .iter()
                .map(|a| a.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    utils::sort_release_table_rows(&mut rows);

    let table = Table::new(rows);
    println!("{}", table);
    info!(
        "{} release(s) with {} track(s) in the last {} day(s).",
        releases.len(),
        track_count,
        days_back
    );
}
