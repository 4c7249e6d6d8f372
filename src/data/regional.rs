//! Regional spreadsheet feed: fetch and CSV normalization.
//!
//! The feed is tabular text with a header row, and the header row is
//! authoritative for field names. Numeric-looking cells are coerced to
//! numbers; blank or non-numeric cells normalize to "field absent" rather
//! than a parse fault.

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;
use reqwest::blocking::Client;

use crate::domain::{RegionalRecord, RegionalSnapshot, RowError};
use crate::error::AppError;

const DEFAULT_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vR5KEVlTJbefwhG7GXg5swMW1rDSctbXuwZR-omHnxdet_DReCYnu0r_CVgzLTxwPqKlz4WMvKOppv1/pub?gid=0&single=true&output=csv";

pub struct RegionalClient {
    client: Client,
    url: String,
}

impl RegionalClient {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("EPI_REGIONAL_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn fetch(&self) -> Result<RegionalSnapshot, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::feed(format!("Regional feed request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::feed(format!(
                "Regional feed request failed with status {}.",
                resp.status()
            )));
        }

        let text = resp
            .text()
            .map_err(|e| AppError::feed(format!("Failed to read regional feed response: {e}")))?;

        parse_regional_csv(&text)
    }
}

/// Parse the regional CSV into an immutable snapshot.
///
/// Rows with a missing or non-ISO date become row errors and are dropped;
/// duplicate dates are kept as-is (the aligner owns the first-wins policy).
pub fn parse_regional_csv(text: &str) -> Result<RegionalSnapshot, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::feed(format!("Failed to read regional feed headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    if !header_map.contains_key("date") {
        return Err(AppError::feed("Regional feed is missing a `date` column."));
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, CSV lines are 1-based.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(date_text) = get_field(&record, &header_map, "date") else {
            row_errors.push(RowError {
                line,
                message: "Missing `date` value.".to_string(),
            });
            continue;
        };

        let date = match NaiveDate::parse_from_str(date_text, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Invalid ISO date '{date_text}': {e}"),
                });
                continue;
            }
        };

        records.push(RegionalRecord {
            date,
            new_cases: numeric_field(&record, &header_map, &["new_cases"]),
            new_cases_outskirt: numeric_field(&record, &header_map, &["new_cases_outskirt"]),
            // Some published sheets use singular `new_death` headers.
            new_deaths: numeric_field(&record, &header_map, &["new_deaths", "new_death"]),
            new_deaths_outskirt: numeric_field(
                &record,
                &header_map,
                &["new_deaths_outskirt", "new_death_outskirt"],
            ),
            accumulated_cases: numeric_field(&record, &header_map, &["accumulated_cases"]),
            accumulated_deaths: numeric_field(
                &record,
                &header_map,
                &["accumulated_deaths", "accumulated_death"],
            ),
            new_cases_7d_avg: numeric_field(
                &record,
                &header_map,
                &["new_cases_7d_avg", "new_cases_7day_average"],
            ),
            new_deaths_7d_avg: numeric_field(
                &record,
                &header_map,
                &["new_deaths_7d_avg", "new_death_7day_average"],
            ),
        });
    }

    Ok(RegionalSnapshot {
        records,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the `date` column goes missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn numeric_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    names: &[&str],
) -> Option<f64> {
    let text = names.iter().find_map(|n| get_field(record, header_map, n))?;
    parse_opt_f64(text)
}

fn parse_opt_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn header_row_is_authoritative_for_field_names() {
        // Columns deliberately reordered relative to the struct.
        let csv = "new_deaths,date,new_cases\n3,2021-08-01,512\n";
        let snapshot = parse_regional_csv(csv).unwrap();

        assert_eq!(snapshot.records.len(), 1);
        let r = &snapshot.records[0];
        assert_eq!(r.date, ymd(2021, 8, 1));
        assert_eq!(r.new_cases, Some(512.0));
        assert_eq!(r.new_deaths, Some(3.0));
        assert_eq!(r.new_cases_outskirt, None);
    }

    #[test]
    fn singular_death_headers_are_accepted() {
        let csv = "date,new_death,new_death_outskirt,accumulated_death\n2021-08-01,4,1,900\n";
        let snapshot = parse_regional_csv(csv).unwrap();

        let r = &snapshot.records[0];
        assert_eq!(r.new_deaths, Some(4.0));
        assert_eq!(r.new_deaths_outskirt, Some(1.0));
        assert_eq!(r.accumulated_deaths, Some(900.0));
    }

    #[test]
    fn non_numeric_cells_normalize_to_absent() {
        let csv = "date,new_cases,new_deaths\n2021-08-01,n/a,\n2021-08-02,17,2\n";
        let snapshot = parse_regional_csv(csv).unwrap();

        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].new_cases, None);
        assert_eq!(snapshot.records[0].new_deaths, None);
        assert_eq!(snapshot.records[1].new_cases, Some(17.0));
        assert!(snapshot.row_errors.is_empty());
    }

    #[test]
    fn bad_dates_become_row_errors_not_faults() {
        let csv = "date,new_cases\n08/01/2021,5\n2021-08-02,7\n,9\n";
        let snapshot = parse_regional_csv(csv).unwrap();

        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].date, ymd(2021, 8, 2));
        assert_eq!(snapshot.row_errors.len(), 2);
        assert_eq!(snapshot.row_errors[0].line, 2);
        assert_eq!(snapshot.row_errors[1].line, 4);
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let csv = "\u{feff}date,new_cases\n2021-08-01,11\n";
        let snapshot = parse_regional_csv(csv).unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].new_cases, Some(11.0));
    }

    #[test]
    fn duplicate_dates_are_preserved_at_ingest() {
        // The aligner owns the first-wins tie-break; ingest keeps source order.
        let csv = "date,new_cases\n2021-08-01,5\n2021-08-01,9\n";
        let snapshot = parse_regional_csv(csv).unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].new_cases, Some(5.0));
    }

    #[test]
    fn missing_date_column_is_a_feed_error() {
        assert!(parse_regional_csv("day,new_cases\n2021-08-01,5\n").is_err());
    }
}
