//! Derived views over a combined series: raw extraction and smoothing.

use crate::domain::{CombinedRecord, ValuePoint};

/// Default trailing moving-average window.
pub const DEFAULT_WINDOW: usize = 7;

/// Smoothed-series strategy.
///
/// `Computed` and `Feed` are alternative code paths with different outputs:
/// the computed average reflects whatever extractor it is given, while the
/// feed passthrough reproduces the upstream column verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    Computed { window: usize },
    Feed,
}

/// Extract `{date, f(record)}` for every record, order-preserving.
///
/// No filtering happens here: the extractor is total, and any absent-field
/// policy (e.g. coercing missing values to 0) belongs to the caller.
pub fn raw_series<F>(records: &[CombinedRecord], f: F) -> Vec<ValuePoint>
where
    F: Fn(&CombinedRecord) -> f64,
{
    records
        .iter()
        .map(|r| ValuePoint {
            date: r.date,
            value: f(r),
        })
        .collect()
}

/// Trailing moving average with window `n`.
///
/// At index `i`, the window covers the `k = min(n, i+1)` trailing records
/// (the warm-up floor is 1, so the divisor can never be 0), and the value is
/// the mean of the numeric extractor values inside it; window entries where
/// the extractor yields `None` contribute neither to the sum nor to the
/// divisor. Records whose own extractor value is `None` are excluded from
/// the output entirely, so the result may be shorter than the input.
pub fn smoothed_series<F>(records: &[CombinedRecord], f: F, n: usize) -> Vec<ValuePoint>
where
    F: Fn(&CombinedRecord) -> Option<f64>,
{
    let n = n.max(1);
    let values: Vec<Option<f64>> = records.iter().map(&f).collect();

    let mut out = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if values[i].is_none() {
            continue;
        }

        let k = n.min(i + 1);
        let window = &values[i + 1 - k..=i];

        let mut sum = 0.0;
        let mut count = 0usize;
        for v in window.iter().flatten() {
            sum += v;
            count += 1;
        }

        // count >= 1: the current record's own value is numeric.
        out.push(ValuePoint {
            date: record.date,
            value: sum / count as f64,
        });
    }
    out
}

/// Passthrough of a precomputed smoothed column supplied by a feed.
///
/// Records where the column is absent are excluded from the output, matching
/// the exclusion policy of [`smoothed_series`].
pub fn feed_series<F>(records: &[CombinedRecord], f: F) -> Vec<ValuePoint>
where
    F: Fn(&CombinedRecord) -> Option<f64>,
{
    records
        .iter()
        .filter_map(|r| {
            f(r).map(|value| ValuePoint {
                date: r.date,
                value,
            })
        })
        .collect()
}
