//! Shared domain types.
//!
//! Dates are `chrono::NaiveDate` throughout: day granularity, calendar
//! equality, canonical `YYYY-MM-DD` text form via `Display`. There is no
//! time-of-day component anywhere in the pipeline.

use chrono::NaiveDate;
use clap::ValueEnum;

/// Which smoothed-series strategy to use.
///
/// These are alternative code paths, not equivalent ones: `Computed` derives
/// a trailing moving average from the combined series, `Feed` passes through
/// the precomputed 7-day-average column carried by the regional feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmoothingSpec {
    /// Trailing moving average computed over the combined series.
    Computed,
    /// Passthrough of the feed's precomputed 7-day-average column.
    Feed,
}

impl std::fmt::Display for SmoothingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmoothingSpec::Computed => write!(f, "computed"),
            SmoothingSpec::Feed => write!(f, "feed"),
        }
    }
}

/// One day of the national case-count feed, normalized.
///
/// `new_confirmed` is validated non-negative at ingest; the remaining fields
/// are passthrough values that the core math never reads.
#[derive(Debug, Clone, PartialEq)]
pub struct NationalRecord {
    pub date: NaiveDate,
    pub new_confirmed: i64,
    pub new_deaths: Option<i64>,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
}

/// One day of the regional spreadsheet feed, normalized.
///
/// Every metric is optional: a blank or non-numeric cell normalizes to
/// `None`, never to a parse failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalRecord {
    pub date: NaiveDate,
    pub new_cases: Option<f64>,
    pub new_cases_outskirt: Option<f64>,
    pub new_deaths: Option<f64>,
    pub new_deaths_outskirt: Option<f64>,
    pub accumulated_cases: Option<f64>,
    pub accumulated_deaths: Option<f64>,
    pub new_cases_7d_avg: Option<f64>,
    pub new_deaths_7d_avg: Option<f64>,
}

/// One date's reconciled view across both feeds.
///
/// Invariant (upheld by `series::align`): a combined sequence holds exactly
/// one record per date of the generated range, ascending, no gaps, no
/// duplicates. A source with no record for the date contributes `None`, and
/// every numeric read goes through the `Option` accessors below, so missing
/// coverage degrades to an absent value rather than a fault.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedRecord {
    pub date: NaiveDate,
    pub national: Option<NationalRecord>,
    pub regional: Option<RegionalRecord>,
}

impl CombinedRecord {
    pub fn national_new_confirmed(&self) -> Option<f64> {
        self.national.as_ref().map(|n| n.new_confirmed as f64)
    }

    pub fn regional_new_cases(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_cases)
    }

    pub fn regional_new_cases_outskirt(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_cases_outskirt)
    }

    pub fn regional_new_deaths(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_deaths)
    }

    pub fn regional_new_deaths_outskirt(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_deaths_outskirt)
    }

    pub fn regional_accumulated_cases(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.accumulated_cases)
    }

    pub fn regional_accumulated_deaths(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.accumulated_deaths)
    }

    pub fn regional_new_cases_7d_avg(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_cases_7d_avg)
    }

    pub fn regional_new_deaths_7d_avg(&self) -> Option<f64> {
        self.regional.as_ref().and_then(|r| r.new_deaths_7d_avg)
    }
}

/// A single derived chart point.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A record-level problem encountered while normalizing a feed.
///
/// Row errors are collected, not raised: one bad record never aborts a run.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based position in the source (CSV line, or JSON array index + 1).
    pub line: usize,
    pub message: String,
}

/// Immutable snapshot of the national feed after normalization.
#[derive(Debug, Clone)]
pub struct NationalSnapshot {
    pub records: Vec<NationalRecord>,
    pub row_errors: Vec<RowError>,
}

impl NationalSnapshot {
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}

/// Immutable snapshot of the regional feed after normalization.
#[derive(Debug, Clone)]
pub struct RegionalSnapshot {
    pub records: Vec<RegionalRecord>,
    pub row_errors: Vec<RowError>,
}

impl RegionalSnapshot {
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}

/// Pixel extent and panel split handed to the scale mapper.
///
/// The vertical extent is split into a cases panel (`break_point` share) and
/// a deaths panel (the remainder minus `gap`), matching the examined layout.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    pub width: f64,
    pub height: f64,
    pub break_point: f64,
    pub gap: f64,
    pub gutter: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            break_point: 0.7,
            gap: 50.0,
            gutter: 2.0,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Length of the active window in days (>= 1).
    pub days: u32,
    /// Fixed window end; `None` means "latest date present in the data".
    pub end: Option<NaiveDate>,
    pub smoothing: SmoothingSpec,
    /// Moving-average window for `SmoothingSpec::Computed`.
    pub window: usize,
    /// Generate seeded synthetic feeds instead of fetching.
    pub offline: bool,
    pub sample_seed: u64,
    /// Include the outskirt breakdown in the latest-record summary.
    pub outskirt: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub layout: PanelLayout,
}
