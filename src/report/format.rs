//! Run and latest-record summaries.

use crate::app::pipeline::{PanelOutput, PanelState};
use crate::domain::{CombinedRecord, PanelConfig, SmoothingSpec};

/// Format the full run summary (window, source stats, latest record).
pub fn format_run_summary(
    state: &PanelState,
    output: &PanelOutput,
    config: &PanelConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== epi - daily case panel ===\n");
    out.push_str(&format!(
        "Window: {} -> {} ({} days)\n",
        output.window.0,
        output.window.1,
        output.combined.len()
    ));
    out.push_str(&format!("Smoothing: {}\n", smoothing_label(config)));

    if let Some(snapshot) = state.national.ready() {
        out.push_str(&format!(
            "National: {} records, {} rejected rows\n",
            snapshot.records.len(),
            snapshot.row_errors.len()
        ));
    }
    if let Some(snapshot) = state.regional.ready() {
        out.push_str(&format!(
            "Regional: {} records, {} rejected rows\n",
            snapshot.records.len(),
            snapshot.row_errors.len()
        ));
    }

    if let Some(scales) = &output.scales {
        out.push_str(&format!(
            "Peaks: cases {} | deaths {}\n",
            fmt_value(Some(scales.cases.max())),
            fmt_value(Some(scales.deaths.max()))
        ));
    }

    if let Some(latest) = output.latest() {
        out.push('\n');
        out.push_str(&format_latest_summary(latest, config.outskirt));
    }

    out
}

/// Format the latest reconciled record.
///
/// The default form reports the regional counts plus the national total; the
/// alternate form (selected by the outskirt flag) adds the outskirt
/// breakdown lines. Absent values print as `n/a`, never as zero.
pub fn format_latest_summary(record: &CombinedRecord, outskirt: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("Latest ({}):\n", record.date));
    out.push_str(&format!(
        "  New cases : +{} (7d avg {}) | cumulative {}\n",
        fmt_value(record.regional_new_cases()),
        fmt_avg(record.regional_new_cases_7d_avg()),
        fmt_value(record.regional_accumulated_cases()),
    ));
    out.push_str(&format!(
        "  New deaths: +{} (7d avg {}) | cumulative {}\n",
        fmt_value(record.regional_new_deaths()),
        fmt_avg(record.regional_new_deaths_7d_avg()),
        fmt_value(record.regional_accumulated_deaths()),
    ));

    if outskirt {
        out.push_str(&format!(
            "  Outskirt  : cases +{} | deaths +{}\n",
            fmt_value(record.regional_new_cases_outskirt()),
            fmt_value(record.regional_new_deaths_outskirt()),
        ));
    }

    out.push_str(&format!(
        "  National  : +{} new confirmed\n",
        fmt_value(record.national_new_confirmed()),
    ));

    out
}

fn smoothing_label(config: &PanelConfig) -> String {
    match config.smoothing {
        SmoothingSpec::Computed => format!("computed (window {})", config.window),
        SmoothingSpec::Feed => "feed passthrough (precomputed 7d column)".to_string(),
    }
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.0}"),
        None => "n/a".to_string(),
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "n/a".to_string(),
    }
}
