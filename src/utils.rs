use std::cmp::Ordering;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::ReleaseTableRow;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random anti-forgery state string carried through the authorize redirect.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

/// Parses a release date at day, month, or year precision.
///
/// Spotify reports `release_date` as `YYYY-MM-DD`, `YYYY-MM`, or `YYYY`
/// depending on `release_date_precision`. Missing components default to the
/// earliest value so coarse dates stay comparable. Returns `None` when the
/// string fits none of the three shapes.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(year) = raw.parse::<i32>() {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Earliest release date that still counts as "new": today minus `days_back`.
/// The boundary is inclusive; an album released exactly on the cutoff is in.
pub fn release_cutoff(days_back: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(days_back)
}

pub fn sort_release_table_rows(rows: &mut Vec<ReleaseTableRow>) {
    rows.sort_by(|a, b| {
        match b.date.cmp(&a.date) {
            Ordering::Equal => a.artists.cmp(&b.artists), // secondary sort: name ascending
            other => other,
        }
    });
}
