//! Shared panel pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch both feeds -> align on the date axis -> derive series -> scales
//!
//! The two fetches are independent and explicitly joined: derivation runs
//! only once both snapshots are present, and each source slot is guarded by
//! a request epoch so a stale response can never overwrite a newer snapshot
//! (the examined behavior was last-writer-wins, a latent bug class).

use chrono::{Duration, NaiveDate};
use rayon::join;

use crate::data::{NationalClient, RegionalClient, generate_feeds};
use crate::domain::{
    CombinedRecord, NationalSnapshot, PanelConfig, RegionalSnapshot, SmoothingSpec, ValuePoint,
};
use crate::error::AppError;
use crate::scale::PanelScales;
use crate::series::{Smoothing, align, date_range, feed_series, raw_series, smoothed_series};

/// What a source slot currently holds.
#[derive(Debug, Clone)]
pub enum SourceState<T> {
    /// No fetch has completed yet.
    Missing,
    /// The most recent fetch failed; the reason is user-visible.
    Failed(String),
    Ready(T),
}

/// An epoch-guarded source slot.
///
/// `begin_request` hands out a monotonically increasing epoch; `complete`
/// discards any result carrying an epoch not newer than the one already
/// applied. Out-of-order completions therefore cannot clobber newer state.
#[derive(Debug, Clone)]
pub struct SourceCell<T> {
    state: SourceState<T>,
    issued: u64,
    applied: u64,
}

impl<T> SourceCell<T> {
    pub fn new() -> Self {
        Self {
            state: SourceState::Missing,
            issued: 0,
            applied: 0,
        }
    }

    pub fn begin_request(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply a completed fetch. Returns false (and changes nothing) when the
    /// response is stale.
    pub fn complete(&mut self, epoch: u64, result: Result<T, AppError>) -> bool {
        if epoch <= self.applied {
            return false;
        }
        self.applied = epoch;
        self.state = match result {
            Ok(value) => SourceState::Ready(value),
            Err(e) => SourceState::Failed(e.to_string()),
        };
        true
    }

    pub fn ready(&self) -> Option<&T> {
        match &self.state {
            SourceState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            SourceState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T> Default for SourceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The application's source-side state: one epoch-guarded cell per feed.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub national: SourceCell<NationalSnapshot>,
    pub regional: SourceCell<RegionalSnapshot>,
}

impl PanelState {
    /// Human-readable reason the pipeline cannot run, if any.
    pub fn unavailable_reason(&self) -> Option<String> {
        let describe = |name: &str, failure: Option<&str>| match failure {
            Some(reason) => format!("{name} feed unavailable: {reason}"),
            None => format!("{name} feed not yet loaded."),
        };

        match (self.national.ready(), self.regional.ready()) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(describe("National", self.national.failure())),
            (Some(_), None) => Some(describe("Regional", self.regional.failure())),
            (None, None) => Some(format!(
                "{} {}",
                describe("National", self.national.failure()),
                describe("Regional", self.regional.failure())
            )),
        }
    }
}

/// Fetch (or synthesize) both feeds and apply the results.
///
/// The two fetches run concurrently and are joined: both complete before
/// this returns. Fetch failures land in the cells as `Failed`, never as a
/// returned error, so one dead feed does not abort the run.
pub fn refresh(state: &mut PanelState, config: &PanelConfig) {
    let national_epoch = state.national.begin_request();
    let regional_epoch = state.regional.begin_request();

    let (national, regional) = if config.offline {
        match generate_feeds(config.sample_seed, config.days) {
            Ok((n, r)) => (Ok(n), Ok(r)),
            Err(e) => (Err(e.clone()), Err(e)),
        }
    } else {
        let national_client = NationalClient::from_env();
        let regional_client = RegionalClient::from_env();
        join(|| national_client.fetch(), || regional_client.fetch())
    };

    state.national.complete(national_epoch, national);
    state.regional.complete(regional_epoch, regional);
}

/// Derived per-metric views, ready for a renderer.
#[derive(Debug, Clone)]
pub struct DerivedSeries {
    /// National daily confirmed (absent coerced to 0 by the extractor).
    pub national_cases_raw: Vec<ValuePoint>,
    /// Regional daily cases (absent coerced to 0).
    pub regional_cases_raw: Vec<ValuePoint>,
    /// Smoothed regional daily cases (absent records excluded).
    pub cases_smoothed: Vec<ValuePoint>,
    /// Regional daily deaths (absent coerced to 0).
    pub deaths_raw: Vec<ValuePoint>,
    /// Smoothed regional daily deaths (absent records excluded).
    pub deaths_smoothed: Vec<ValuePoint>,
}

/// All computed outputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PanelOutput {
    pub window: (NaiveDate, NaiveDate),
    pub combined: Vec<CombinedRecord>,
    pub series: DerivedSeries,
    pub scales: Option<PanelScales>,
}

impl PanelOutput {
    /// The latest reconciled record of the active window.
    pub fn latest(&self) -> Option<&CombinedRecord> {
        self.combined.last()
    }
}

/// Pure recompute: state + config in, derived panel out.
///
/// Returns `None` until both snapshots are present (a join, not a race), or
/// when neither snapshot carries a single dated record. Recomputation
/// replaces the previous output wholesale; nothing here mutates the inputs.
pub fn recompute(state: &PanelState, config: &PanelConfig) -> Option<PanelOutput> {
    let national = state.national.ready()?;
    let regional = state.regional.ready()?;

    // The window ends at the data's own latest date unless pinned by config.
    let end = config
        .end
        .or_else(|| match (national.latest_date(), regional.latest_date()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        })?;
    let start = end - Duration::days(i64::from(config.days.max(1)) - 1);

    let range = date_range(start, end);
    let combined = align(&range, &national.records, &regional.records);

    let smoothing = match config.smoothing {
        SmoothingSpec::Computed => Smoothing::Computed {
            window: config.window,
        },
        SmoothingSpec::Feed => Smoothing::Feed,
    };

    let cases_smoothed = match smoothing {
        Smoothing::Computed { window } => {
            smoothed_series(&combined, |r| r.regional_new_cases(), window)
        }
        Smoothing::Feed => feed_series(&combined, |r| r.regional_new_cases_7d_avg()),
    };
    let deaths_smoothed = match smoothing {
        Smoothing::Computed { window } => {
            smoothed_series(&combined, |r| r.regional_new_deaths(), window)
        }
        Smoothing::Feed => feed_series(&combined, |r| r.regional_new_deaths_7d_avg()),
    };

    let series = DerivedSeries {
        national_cases_raw: raw_series(&combined, |r| {
            r.national_new_confirmed().unwrap_or(0.0)
        }),
        regional_cases_raw: raw_series(&combined, |r| r.regional_new_cases().unwrap_or(0.0)),
        cases_smoothed,
        deaths_raw: raw_series(&combined, |r| r.regional_new_deaths().unwrap_or(0.0)),
        deaths_smoothed,
    };

    let scales = PanelScales::compute(&combined, &config.layout);

    Some(PanelOutput {
        window: (start, end),
        combined,
        series,
        scales,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NationalRecord, PanelLayout, RegionalRecord, RowError};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(days: u32) -> PanelConfig {
        PanelConfig {
            days,
            end: None,
            smoothing: SmoothingSpec::Computed,
            window: 7,
            offline: true,
            sample_seed: 42,
            outskirt: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            layout: PanelLayout::default(),
        }
    }

    fn national_snapshot(records: Vec<NationalRecord>) -> NationalSnapshot {
        NationalSnapshot {
            records,
            row_errors: Vec::<RowError>::new(),
        }
    }

    fn regional_snapshot(records: Vec<RegionalRecord>) -> RegionalSnapshot {
        RegionalSnapshot {
            records,
            row_errors: Vec::<RowError>::new(),
        }
    }

    fn national(date: NaiveDate, n: i64) -> NationalRecord {
        NationalRecord {
            date,
            new_confirmed: n,
            new_deaths: None,
            confirmed: None,
            deaths: None,
        }
    }

    fn regional(date: NaiveDate, cases: f64) -> RegionalRecord {
        RegionalRecord {
            date,
            new_cases: Some(cases),
            ..RegionalRecord::default()
        }
    }

    #[test]
    fn recompute_waits_for_both_snapshots() {
        let mut state = PanelState::default();
        assert!(recompute(&state, &config(5)).is_none());
        assert!(state.unavailable_reason().is_some());

        let e = state.national.begin_request();
        state
            .national
            .complete(e, Ok(national_snapshot(vec![national(ymd(2021, 8, 1), 10)])));
        // One snapshot is not enough: this is a join, not a race.
        assert!(recompute(&state, &config(5)).is_none());

        let e = state.regional.begin_request();
        state
            .regional
            .complete(e, Ok(regional_snapshot(vec![regional(ymd(2021, 8, 1), 3.0)])));
        let output = recompute(&state, &config(5)).unwrap();
        assert!(state.unavailable_reason().is_none());
        assert_eq!(output.window, (ymd(2021, 7, 28), ymd(2021, 8, 1)));
        assert_eq!(output.combined.len(), 5);
    }

    #[test]
    fn window_ends_at_the_latest_date_across_sources() {
        let mut state = PanelState::default();
        let e = state.national.begin_request();
        state
            .national
            .complete(e, Ok(national_snapshot(vec![national(ymd(2021, 8, 1), 10)])));
        let e = state.regional.begin_request();
        state
            .regional
            .complete(e, Ok(regional_snapshot(vec![regional(ymd(2021, 8, 3), 3.0)])));

        let output = recompute(&state, &config(3)).unwrap();
        assert_eq!(output.window, (ymd(2021, 8, 1), ymd(2021, 8, 3)));
        assert_eq!(output.latest().unwrap().date, ymd(2021, 8, 3));
        // The national source has no record on the final date.
        assert!(output.latest().unwrap().national.is_none());
    }

    #[test]
    fn stale_response_cannot_overwrite_newer_snapshot() {
        let mut cell: SourceCell<NationalSnapshot> = SourceCell::new();
        let first = cell.begin_request();
        let second = cell.begin_request();

        assert!(cell.complete(second, Ok(national_snapshot(vec![national(ymd(2021, 8, 2), 20)]))));
        // The older request completes afterwards and must be discarded.
        assert!(!cell.complete(first, Ok(national_snapshot(vec![national(ymd(2021, 8, 1), 10)]))));

        let held = cell.ready().unwrap();
        assert_eq!(held.records[0].new_confirmed, 20);
    }

    #[test]
    fn failed_fetch_is_reported_not_fatal() {
        let mut cell: SourceCell<NationalSnapshot> = SourceCell::new();
        let e = cell.begin_request();
        cell.complete(e, Err(AppError::feed("connection refused")));

        assert!(cell.ready().is_none());
        assert_eq!(cell.failure(), Some("connection refused"));
    }

    #[test]
    fn offline_refresh_produces_a_full_panel() {
        let mut state = PanelState::default();
        let cfg = config(30);
        refresh(&mut state, &cfg);

        let output = recompute(&state, &cfg).unwrap();
        assert_eq!(output.combined.len(), 30);
        assert_eq!(output.series.national_cases_raw.len(), 30);
        assert_eq!(output.series.regional_cases_raw.len(), 30);
        // Smoothed series may be shorter: gap days are excluded, not zeroed.
        assert!(output.series.cases_smoothed.len() <= 30);
        assert!(!output.series.cases_smoothed.is_empty());
        assert!(output.scales.is_some());
    }

    #[test]
    fn feed_strategy_reads_the_precomputed_column() {
        let date = ymd(2021, 8, 1);
        let mut state = PanelState::default();
        let e = state.national.begin_request();
        state
            .national
            .complete(e, Ok(national_snapshot(vec![national(date, 10)])));
        let e = state.regional.begin_request();
        let mut rec = regional(date, 100.0);
        rec.new_cases_7d_avg = Some(77.7);
        state.regional.complete(e, Ok(regional_snapshot(vec![rec])));

        let mut cfg = config(1);
        cfg.smoothing = SmoothingSpec::Feed;
        let output = recompute(&state, &cfg).unwrap();

        assert_eq!(output.series.cases_smoothed.len(), 1);
        assert_eq!(output.series.cases_smoothed[0].value, 77.7);
        // Deaths column is absent, so the feed-strategy series is empty.
        assert!(output.series.deaths_smoothed.is_empty());
    }
}
