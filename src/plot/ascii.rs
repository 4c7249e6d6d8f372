//! ASCII panel rendering for terminal output.
//!
//! This is intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily bars: `#`
//! - smoothed line: `-` (drawn over the bars)
//!
//! It consumes only the pipeline's published output and maps it through the
//! same scale types the TUI geometry uses.

use crate::app::pipeline::PanelOutput;
use crate::domain::ValuePoint;
use crate::scale::{TimeScale, ValueScale, bar_width};

/// Render the two stacked charts (cases, deaths) as plain text.
pub fn render_ascii_panel(output: &PanelOutput, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(8);

    // Cases panel takes the larger share, mirroring the pixel layout split.
    let cases_rows = (height * 2) / 3;
    let deaths_rows = height - cases_rows;

    let mut out = render_chart(
        &output.series.regional_cases_raw,
        &output.series.cases_smoothed,
        width,
        cases_rows,
        "New cases",
    );
    out.push('\n');
    out.push_str(&render_chart(
        &output.series.deaths_raw,
        &output.series.deaths_smoothed,
        width,
        deaths_rows,
        "New deaths",
    ));
    out
}

fn render_chart(
    raw: &[ValuePoint],
    smoothed: &[ValuePoint],
    width: usize,
    rows: usize,
    label: &str,
) -> String {
    let rows = rows.max(3);

    let (Some(first), Some(last)) = (raw.first(), raw.last()) else {
        return format!("{label}: (no data)\n");
    };

    let time = TimeScale::new((first.date, last.date), (0.0, width as f64 - 1.0));
    let max = raw
        .iter()
        .chain(smoothed.iter())
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    let value = ValueScale::new(max, (rows as f64 - 1.0, 0.0));
    let span = (bar_width(raw.len(), width as f64, 0.0).round() as usize).max(1);

    let mut grid = vec![vec![' '; width]; rows];

    for point in raw {
        if point.value <= 0.0 {
            continue;
        }
        let x = time.map(point.date).round() as usize;
        let top = value.map(point.value).round() as usize;
        for col in x..(x + span).min(width) {
            for row in grid.iter_mut().take(rows).skip(top.min(rows - 1)) {
                row[col] = '#';
            }
        }
    }

    // The smoothed line goes on top of the bars.
    let mut prev: Option<(usize, usize)> = None;
    for point in smoothed {
        let x = (time.map(point.date).round() as usize).min(width - 1);
        let y = (value.map(point.value).round() as usize).min(rows - 1);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, '-'),
            None => grid[y][x] = '-',
        }
        prev = Some((x, y));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{label}: {} -> {} | max {max:.0}\n",
        first.date, last.date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, value: f64) -> ValuePoint {
        ValuePoint {
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            value,
        }
    }

    #[test]
    fn chart_golden_snapshot_small() {
        let raw = vec![point(1, 0.0), point(2, 2.0), point(3, 4.0)];
        let txt = render_chart(&raw, &[], 9, 4, "New cases");
        let expected = concat!(
            "New cases: 2021-01-01 -> 2021-01-03 | max 4\n",
            "        #\n",
            "        #\n",
            "    ### #\n",
            "    ### #\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn smoothed_line_is_drawn_over_the_bars() {
        let raw = vec![point(1, 0.0), point(2, 2.0), point(3, 4.0)];
        let smoothed = vec![point(1, 0.0), point(2, 2.0), point(3, 4.0)];
        let txt = render_chart(&raw, &smoothed, 9, 4, "New cases");

        let grid: Vec<&str> = txt.lines().skip(1).collect();
        // The line terminates at the last smoothed point (top-right), which a
        // bar also occupies; the line wins.
        assert_eq!(grid[0].as_bytes()[8], b'-');
        // The first smoothed point sits on the baseline.
        assert_eq!(grid[3].as_bytes()[0], b'-');
    }

    #[test]
    fn empty_series_renders_a_placeholder() {
        let txt = render_chart(&[], &[], 20, 5, "New deaths");
        assert_eq!(txt, "New deaths: (no data)\n");
    }

    #[test]
    fn single_point_series_does_not_panic() {
        let raw = vec![point(1, 3.0)];
        let txt = render_chart(&raw, &raw, 12, 4, "New cases");
        assert!(txt.contains("max 3"));
    }
}
