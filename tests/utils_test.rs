use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use freshtracks::schedule::{Cadence, next_run_after, parse_cadence};
use freshtracks::types::{AudioFeatures, ReleaseTableRow, VibeThresholds};
use freshtracks::utils::*;
use freshtracks::{api::hosted, pipeline::vibe};

// Helper function to create a test release table row
fn create_test_release_row(date: &str, album: &str, artists: &str) -> ReleaseTableRow {
    ReleaseTableRow {
        date: date.to_string(),
        album: album.to_string(),
        artists: artists.to_string(),
    }
}

fn dt(date: (i32, u32, u32), time: (u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap())
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_generate_state() {
    let state = generate_state();
    assert_eq!(state.len(), 20);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(state, generate_state());
}

#[test]
fn test_parse_release_date_day_precision() {
    assert_eq!(
        parse_release_date("2023-06-15"),
        NaiveDate::from_ymd_opt(2023, 6, 15)
    );
}

#[test]
fn test_parse_release_date_month_precision() {
    // Missing day defaults to the first
    assert_eq!(
        parse_release_date("2023-06"),
        NaiveDate::from_ymd_opt(2023, 6, 1)
    );
}

#[test]
fn test_parse_release_date_year_precision() {
    // Missing month and day default to January 1st
    assert_eq!(
        parse_release_date("2023"),
        NaiveDate::from_ymd_opt(2023, 1, 1)
    );
}

#[test]
fn test_parse_release_date_invalid() {
    assert_eq!(parse_release_date("not-a-date"), None);
    assert_eq!(parse_release_date(""), None);
}

#[test]
fn test_release_cutoff() {
    let today = Utc::now().date_naive();
    assert_eq!(release_cutoff(0), today);
    assert_eq!(release_cutoff(7), today - Duration::days(7));
}

#[test]
fn test_sort_release_table_rows() {
    let mut rows = vec![
        create_test_release_row("2023-06-10", "Older", "Zeta"),
        create_test_release_row("2023-06-15", "Newer B", "Beta"),
        create_test_release_row("2023-06-15", "Newer A", "Alpha"),
    ];

    sort_release_table_rows(&mut rows);

    // Newest first; same date sorts by artist ascending
    assert_eq!(rows[0].artists, "Alpha");
    assert_eq!(rows[1].artists, "Beta");
    assert_eq!(rows[2].date, "2023-06-10");
}

#[test]
fn test_vibe_passes_thresholds() {
    let thresholds = VibeThresholds {
        min_energy: 0.6,
        min_danceability: 0.6,
        max_acousticness: 0.4,
    };

    let good = AudioFeatures {
        id: "a".to_string(),
        energy: 0.8,
        danceability: 0.7,
        acousticness: 0.1,
    };
    assert!(vibe::passes(&good, &thresholds));

    // energy 0.5 against a 0.6 minimum fails; bounds are conjunctive
    let low_energy = AudioFeatures {
        energy: 0.5,
        ..good.clone()
    };
    assert!(!vibe::passes(&low_energy, &thresholds));

    // Boundary values are inclusive
    let boundary = AudioFeatures {
        energy: 0.6,
        danceability: 0.6,
        acousticness: 0.4,
        id: "b".to_string(),
    };
    assert!(vibe::passes(&boundary, &thresholds));
}

#[test]
fn test_states_match() {
    assert!(hosted::states_match(Some("abc"), Some("abc")));
    assert!(!hosted::states_match(Some("abc"), Some("xyz")));
    assert!(!hosted::states_match(None, Some("abc")));
    assert!(!hosted::states_match(Some("abc"), None));
    assert!(!hosted::states_match(None, None));
}

#[test]
fn test_parse_cadence() {
    assert_eq!(parse_cadence("hourly", None, None), Ok(Cadence::Hourly));
    assert_eq!(
        parse_cadence("daily", Some("06:30"), None),
        Ok(Cadence::Daily {
            at: NaiveTime::from_hms_opt(6, 30, 0).unwrap()
        })
    );
    assert_eq!(
        parse_cadence("weekly", Some("09:00"), Some("friday")),
        Ok(Cadence::Weekly {
            day: Weekday::Fri,
            at: NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        })
    );

    assert!(parse_cadence("weekly", None, None).is_err());
    assert!(parse_cadence("daily", Some("25:99"), None).is_err());
    assert!(parse_cadence("fortnightly", None, None).is_err());
}

#[test]
fn test_next_run_hourly() {
    let now = dt((2023, 6, 15), (10, 0));
    assert_eq!(next_run_after(&Cadence::Hourly, now), dt((2023, 6, 15), (11, 0)));
}

#[test]
fn test_next_run_daily() {
    let at = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let cadence = Cadence::Daily { at };

    // Before today's slot: fires today
    let morning = dt((2023, 6, 15), (10, 0));
    assert_eq!(next_run_after(&cadence, morning), dt((2023, 6, 15), (12, 0)));

    // At or after today's slot: fires tomorrow
    let noon = dt((2023, 6, 15), (12, 0));
    assert_eq!(next_run_after(&cadence, noon), dt((2023, 6, 16), (12, 0)));
}

#[test]
fn test_next_run_weekly() {
    let at = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let cadence = Cadence::Weekly {
        day: Weekday::Fri,
        at,
    };

    // 2023-06-15 is a Thursday; next Friday slot is the 16th
    let thursday = dt((2023, 6, 15), (10, 0));
    assert_eq!(next_run_after(&cadence, thursday), dt((2023, 6, 16), (9, 0)));

    // On Friday after the slot, it rolls a full week
    let friday_late = dt((2023, 6, 16), (10, 0));
    assert_eq!(next_run_after(&cadence, friday_late), dt((2023, 6, 23), (9, 0)));
}
