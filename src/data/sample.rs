//! Synthetic feed generation for offline runs.
//!
//! The generator emits *raw* payloads (fixed-width date tokens, CSV text)
//! and routes them through the real normalizers, so an offline run exercises
//! the same ingest path as a live one. Output is fully determined by the
//! seed: same seed, same feeds.

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::national::{RawNationalRecord, TimelineResponse, normalize_timeline};
use crate::data::regional::parse_regional_csv;
use crate::domain::{NationalSnapshot, RegionalSnapshot};
use crate::error::AppError;

/// Extra history generated before the requested window so trailing averages
/// have a warm-up runway.
const LEAD_DAYS: u32 = 14;

/// Generate a matched pair of synthetic feeds covering `days` (plus lead-in)
/// and ending at a fixed anchor date.
pub fn generate_feeds(seed: u64, days: u32) -> Result<(NationalSnapshot, RegionalSnapshot), AppError> {
    let total = days.max(1) + LEAD_DAYS;
    let end = NaiveDate::from_ymd_opt(2021, 8, 1).unwrap_or_default();
    let start = end - Duration::days(i64::from(total) - 1);

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::feed(format!("Noise distribution error: {e}")))?;

    let mut raw_national = Vec::with_capacity(total as usize);
    let mut csv = String::from(
        "date,new_cases,new_cases_outskirt,new_deaths,new_deaths_outskirt,\
         accumulated_cases,accumulated_deaths,new_cases_7d_avg,new_deaths_7d_avg\n",
    );

    let mut accumulated_cases = 0.0_f64;
    let mut accumulated_deaths = 0.0_f64;
    let mut city_case_history: Vec<f64> = Vec::with_capacity(total as usize);
    let mut city_death_history: Vec<f64> = Vec::with_capacity(total as usize);

    for t in 0..total {
        let date = start + Duration::days(i64::from(t));
        let phase = f64::from(t);

        // A slow epidemic wave with daily noise; clamped to stay non-negative.
        let national_level = 1200.0 + 900.0 * (phase * 0.12).sin() + phase * 6.0;
        let national_cases = (national_level + 60.0 * noise.sample(&mut rng)).max(0.0).round();

        let city_share = 0.32 + 0.05 * (phase * 0.05).sin();
        let city_cases = (national_cases * city_share + 25.0 * noise.sample(&mut rng))
            .max(0.0)
            .round();
        let outskirt_cases = (city_cases * rng.gen_range(0.15..0.35)).round();

        let city_deaths = (city_cases * 0.012 + 1.5 * noise.sample(&mut rng)).max(0.0).round();
        let outskirt_deaths = (city_deaths * rng.gen_range(0.1..0.4)).round();

        accumulated_cases += city_cases;
        accumulated_deaths += city_deaths;
        city_case_history.push(city_cases);
        city_death_history.push(city_deaths);

        raw_national.push(RawNationalRecord {
            date: format!("{:02}/{:02}/{:04}", date.month(), date.day(), date.year()),
            new_confirmed: Some(national_cases as i64),
            new_deaths: Some((national_cases * 0.011).round() as i64),
            confirmed: None,
            deaths: None,
        });

        // Every 11th regional row goes missing entirely (a coverage gap);
        // every 17th loses its case cell (an absent value).
        if t % 11 == 10 {
            continue;
        }
        let cases_cell = if t % 17 == 16 {
            String::new()
        } else {
            format!("{city_cases}")
        };

        csv.push_str(&format!(
            "{date},{cases_cell},{outskirt_cases},{city_deaths},{outskirt_deaths},{accumulated_cases},{accumulated_deaths},{:.2},{:.2}\n",
            trailing_mean(&city_case_history, 7),
            trailing_mean(&city_death_history, 7),
        ));
    }

    let national = normalize_timeline(TimelineResponse { data: raw_national });
    let regional = parse_regional_csv(&csv)?;
    Ok((national, regional))
}

fn trailing_mean(values: &[f64], n: usize) -> f64 {
    let k = n.min(values.len()).max(1);
    let tail = &values[values.len() - k..];
    tail.iter().sum::<f64>() / tail.len() as f64
}
