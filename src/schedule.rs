//! Cron-style cadence for the watch loop.
//!
//! Supports hourly, daily at a time of day, and weekly at a time of day on a
//! named weekday. Next-run computation is pure over naive local times so it
//! can be tested without a clock.

use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime, Weekday};

use crate::{
    Res,
    config::Config,
    info,
    pipeline::{self, SyncPolicy},
    warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Hourly,
    Daily { at: NaiveTime },
    Weekly { day: Weekday, at: NaiveTime },
}

/// Parses the CLI cadence flags. The time defaults to midnight; a weekly
/// cadence requires a day of the week.
pub fn parse_cadence(every: &str, at: Option<&str>, day: Option<&str>) -> Result<Cadence, String> {
    let at_time = match at {
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M")
            .map_err(|_| format!("invalid time '{}', expected HH:MM", raw))?,
        None => NaiveTime::MIN,
    };

    match every {
        "hourly" => Ok(Cadence::Hourly),
        "daily" => Ok(Cadence::Daily { at: at_time }),
        "weekly" => {
            let day = day.ok_or_else(|| "weekly cadence requires --day".to_string())?;
            let day = day
                .parse::<Weekday>()
                .map_err(|_| format!("invalid weekday '{}'", day))?;
            Ok(Cadence::Weekly { day, at: at_time })
        }
        other => Err(format!("unknown cadence '{}'", other)),
    }
}

/// First instant strictly after `now` at which the cadence fires.
pub fn next_run_after(cadence: &Cadence, now: NaiveDateTime) -> NaiveDateTime {
    match cadence {
        Cadence::Hourly => now + Duration::hours(1),
        Cadence::Daily { at } => {
            let today = now.date().and_time(*at);
            if today > now {
                today
            } else {
                today + Duration::days(1)
            }
        }
        Cadence::Weekly { day, at } => {
            let days_ahead = (day.num_days_from_monday() + 7
                - now.weekday().num_days_from_monday())
                % 7;
            let candidate = (now.date() + Duration::days(days_ahead as i64)).and_time(*at);
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(7)
            }
        }
    }
}

/// Runs the pipeline once immediately, then on every cadence tick.
///
/// A failed tick is reported and the loop keeps going; the next tick gets a
/// fresh attempt.
pub async fn watch(cfg: &Config, policy: SyncPolicy, cadence: Cadence) -> Res<()> {
    info!("Running initial check...");
    run_once(cfg, policy).await;

    loop {
        let now = Local::now().naive_local();
        let next = next_run_after(&cadence, now);
        let wait = (next - now).to_std().unwrap_or_default();
        info!("Next check at {}.", next.format("%Y-%m-%d %H:%M"));
        tokio::time::sleep(wait).await;
        run_once(cfg, policy).await;
    }
}

async fn run_once(cfg: &Config, policy: SyncPolicy) {
    match pipeline::run(cfg, policy).await {
        Ok(report) => info!("Check complete: {} track(s) added.", report.tracks_added),
        Err(e) => warning!("Pipeline run failed: {}", e),
    }
}
