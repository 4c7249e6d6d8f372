//! Plotters-powered panel chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are
/// computed outside the render call, in day-offset coordinates relative to
/// `start`. This keeps `render()` focused on drawing.
pub struct PanelChart<'a> {
    /// Window start; day offset 0 maps to this date in tick labels.
    pub start: NaiveDate,
    /// Daily bars for the panel metric.
    pub bars: &'a [(f64, f64)],
    /// Optional backdrop bars (the national series behind the regional one).
    pub backdrop: &'a [(f64, f64)],
    /// Smoothed line.
    pub line: &'a [(f64, f64)],
    /// X bounds (day offsets).
    pub x_bounds: [f64; 2],
    /// Y bounds (counts).
    pub y_bounds: [f64; 2],
    pub y_label: String,
}

impl Widget for PanelChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let start = self.start;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(&self.y_label)
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| {
                    (start + Duration::days(v.round() as i64)).to_string()
                })
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            // Palette: dim backdrop, warm bars, bright line — high contrast
            // for terminal readability.
            let backdrop_color = RGBColor(110, 110, 110);
            let bar_color = RGBColor(255, 99, 132);
            let line_color = WHITE;

            chart.draw_series(self.backdrop.iter().map(|&(x, v)| {
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], backdrop_color.filled())
            }))?;
            chart.draw_series(self.bars.iter().map(|&(x, v)| {
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], bar_color.filled())
            }))?;
            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
