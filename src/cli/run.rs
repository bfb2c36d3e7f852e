use crate::{
    config::Config,
    error, info,
    pipeline::{self, SyncPolicy},
    success,
};

/// Runs the full pipeline once and reports the outcome.
pub async fn run(cfg: &Config, policy: SyncPolicy) {
    match pipeline::run(cfg, policy).await {
        Ok(report) => match report.playlist_id {
            Some(id) => success!(
                "Playlist {} synchronized: {} track(s) added.",
                id,
                report.tracks_added
            ),
            None => info!("Nothing to synchronize: 0 tracks added."),
        },
        Err(e) => error!("Pipeline run failed: {}", e),
    }
}
