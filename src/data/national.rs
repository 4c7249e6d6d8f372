//! National case-count feed: fetch and normalization.
//!
//! The feed returns a JSON body with a `Data` list of per-day records. Each
//! record carries its date as a fixed-width `MM/DD/YYYY` token, which the
//! examined logic sliced apart with no validation; here the token layout is
//! checked explicitly and non-conforming records become row errors instead
//! of malformed, incomparable keys.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{NationalRecord, NationalSnapshot, RowError};
use crate::error::AppError;

const DEFAULT_URL: &str = "https://covid19.th-stat.com/api/open/timeline";

/// Raw response shape of the timeline endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineResponse {
    #[serde(rename = "Data", default)]
    pub data: Vec<RawNationalRecord>,
}

/// One raw per-day record as delivered by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNationalRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "NewConfirmed")]
    pub new_confirmed: Option<i64>,
    #[serde(rename = "NewDeaths")]
    pub new_deaths: Option<i64>,
    #[serde(rename = "Confirmed")]
    pub confirmed: Option<i64>,
    #[serde(rename = "Deaths")]
    pub deaths: Option<i64>,
}

pub struct NationalClient {
    client: Client,
    url: String,
}

impl NationalClient {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("EPI_NATIONAL_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn fetch(&self) -> Result<NationalSnapshot, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::feed(format!("National feed request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::feed(format!(
                "National feed request failed with status {}.",
                resp.status()
            )));
        }

        let body: TimelineResponse = resp
            .json()
            .map_err(|e| AppError::feed(format!("Failed to parse national feed response: {e}")))?;

        Ok(normalize_timeline(body))
    }
}

/// Normalize a raw timeline payload into an immutable snapshot.
///
/// Records with a malformed date token or a missing/negative case count are
/// collected as row errors and dropped; one bad record never aborts the run.
pub fn normalize_timeline(body: TimelineResponse) -> NationalSnapshot {
    let mut records = Vec::with_capacity(body.data.len());
    let mut row_errors = Vec::new();

    for (idx, raw) in body.data.into_iter().enumerate() {
        let line = idx + 1;

        let date = match parse_date_token(&raw.date) {
            Ok(d) => d,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        let new_confirmed = match raw.new_confirmed {
            Some(n) if n >= 0 => n,
            Some(n) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Negative NewConfirmed value {n}."),
                });
                continue;
            }
            None => {
                row_errors.push(RowError {
                    line,
                    message: "Missing NewConfirmed value.".to_string(),
                });
                continue;
            }
        };

        records.push(NationalRecord {
            date,
            new_confirmed,
            new_deaths: raw.new_deaths,
            confirmed: raw.confirmed,
            deaths: raw.deaths,
        });
    }

    NationalSnapshot {
        records,
        row_errors,
    }
}

/// Parse the feed's fixed-width date token.
///
/// Layout: 2-digit month at `[0..2)`, 2-digit day at `[3..5)`, 4-digit year
/// at `[6..10)`; the separator characters at positions 2 and 5 are ignored.
/// Tokens that do not conform to this width are rejected outright.
pub fn parse_date_token(token: &str) -> Result<NaiveDate, String> {
    let bytes = token.as_bytes();
    if bytes.len() != 10 {
        return Err(format!(
            "Invalid date token '{token}': expected 10 characters (MM/DD/YYYY)."
        ));
    }

    let digit_positions = [0, 1, 3, 4, 6, 7, 8, 9];
    if digit_positions.iter().any(|&i| !bytes[i].is_ascii_digit()) {
        return Err(format!("Invalid date token '{token}': non-digit where a digit is required."));
    }

    // Safe to slice: the layout check above guarantees ASCII at these ranges.
    let month: u32 = token[0..2].parse().map_err(|_| bad_token(token))?;
    let day: u32 = token[3..5].parse().map_err(|_| bad_token(token))?;
    let year: i32 = token[6..10].parse().map_err(|_| bad_token(token))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date token '{token}': no such calendar date."))
}

fn bad_token(token: &str) -> String {
    format!("Invalid date token '{token}'.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, new_confirmed: Option<i64>) -> RawNationalRecord {
        RawNationalRecord {
            date: date.to_string(),
            new_confirmed,
            new_deaths: None,
            confirmed: None,
            deaths: None,
        }
    }

    #[test]
    fn date_token_reorders_into_iso() {
        let d = parse_date_token("08/01/2021").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 8, 1).unwrap());
        assert_eq!(d.to_string(), "2021-08-01");
    }

    #[test]
    fn date_token_separators_are_ignored() {
        // The examined feed uses '/', but any single separator byte passes.
        assert!(parse_date_token("08-01-2021").is_ok());
    }

    #[test]
    fn date_token_wrong_width_is_rejected() {
        assert!(parse_date_token("8/1/2021").is_err());
        assert!(parse_date_token("08/01/20211").is_err());
        assert!(parse_date_token("").is_err());
    }

    #[test]
    fn date_token_non_digit_is_rejected() {
        assert!(parse_date_token("0a/01/2021").is_err());
        assert!(parse_date_token("08/01/2o21").is_err());
    }

    #[test]
    fn date_token_impossible_date_is_rejected() {
        assert!(parse_date_token("13/45/2021").is_err());
        assert!(parse_date_token("02/30/2021").is_err());
    }

    #[test]
    fn normalize_keeps_good_rows_and_collects_bad_ones() {
        let body = TimelineResponse {
            data: vec![
                raw("07/31/2021", Some(18_000)),
                raw("bogus", Some(5)),
                raw("08/01/2021", None),
                raw("08/02/2021", Some(-3)),
                raw("08/03/2021", Some(17_500)),
            ],
        };

        let snapshot = normalize_timeline(body);

        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.row_errors.len(), 3);
        assert_eq!(snapshot.records[0].new_confirmed, 18_000);
        assert_eq!(
            snapshot.latest_date(),
            Some(NaiveDate::from_ymd_opt(2021, 8, 3).unwrap())
        );
        // Same malformed input, same dropped rows: degradation is deterministic.
        let lines: Vec<usize> = snapshot.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }
}
