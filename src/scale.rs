//! Domain→pixel scale mappings and bar geometry.
//!
//! The mappings here drive chart geometry for external renderers (the ASCII
//! panel, the TUI, or anything else consuming `PanelOutput`). They carry no
//! drawing logic of their own.

use chrono::NaiveDate;

use crate::domain::{CombinedRecord, PanelLayout};

/// Linear mapping from a `[min_date, max_date]` domain to a pixel range,
/// linear in elapsed days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (NaiveDate, NaiveDate),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (NaiveDate, NaiveDate) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn range_width(&self) -> f64 {
        (self.range.1 - self.range.0).abs()
    }

    /// Map a date to a pixel position. A degenerate (single-day) domain maps
    /// every date to the start of the range.
    pub fn map(&self, date: NaiveDate) -> f64 {
        let span = (self.domain.1 - self.domain.0).num_days() as f64;
        if span <= 0.0 {
            return self.range.0;
        }
        let u = (date - self.domain.0).num_days() as f64 / span;
        self.range.0 + u * (self.range.1 - self.range.0)
    }
}

/// Linear mapping from `[0, max]` to an inverted pixel range: value 0 maps
/// to the bottom of the range, `max` to the top (screen y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    max: f64,
    range: (f64, f64),
}

impl ValueScale {
    /// `range` is `(bottom, top)` in pixels.
    pub fn new(max: f64, range: (f64, f64)) -> Self {
        Self { max, range }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a value to a pixel position. A degenerate domain (`max <= 0`)
    /// maps every value to the bottom of the range.
    pub fn map(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            return self.range.0;
        }
        self.range.0 + (value / self.max) * (self.range.1 - self.range.0)
    }
}

/// Bar width for `count` bars over `range_width` pixels with a fixed
/// inter-bar `gutter`. Floored at 1 so bars never collapse to zero or
/// negative width for long series.
pub fn bar_width(count: usize, range_width: f64, gutter: f64) -> f64 {
    (range_width / count.max(1) as f64 - gutter).max(1.0)
}

/// The full set of mappings for one chart panel: a shared time scale and two
/// independent value scales (case counts vs death counts differ by orders of
/// magnitude), plus bar geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelScales {
    pub time: TimeScale,
    pub cases: ValueScale,
    pub deaths: ValueScale,
    pub bar_width: f64,
}

impl PanelScales {
    /// Compute the mappings for an aligned, ascending combined series.
    ///
    /// Returns `None` for an empty series (nothing to map). The cases scale
    /// spans the national daily count (the tallest series drawn on that
    /// panel); the deaths scale spans the regional daily deaths.
    pub fn compute(records: &[CombinedRecord], layout: &PanelLayout) -> Option<Self> {
        let first = records.first()?;
        let last = records.last()?;

        let time = TimeScale::new((first.date, last.date), (0.0, layout.width));

        let cases_max = max_over(records, |r| r.national_new_confirmed());
        let deaths_max = max_over(records, |r| r.regional_new_deaths());

        let cases_extent = layout.height * layout.break_point;
        let deaths_extent = (layout.height * (1.0 - layout.break_point) - layout.gap).max(0.0);

        Some(Self {
            time,
            cases: ValueScale::new(cases_max, (cases_extent, 0.0)),
            deaths: ValueScale::new(deaths_max, (deaths_extent, 0.0)),
            bar_width: bar_width(records.len(), time.range_width(), layout.gutter),
        })
    }
}

fn max_over<F>(records: &[CombinedRecord], f: F) -> f64
where
    F: Fn(&CombinedRecord) -> Option<f64>,
{
    records
        .iter()
        .filter_map(f)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}
