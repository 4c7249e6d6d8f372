//! Ratatui-based terminal UI.
//!
//! The TUI renders the cases and deaths panels plus the latest-record
//! summary, and lets you refresh the feeds, resize the window, and switch
//! smoothing strategy without leaving the terminal.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::panel_config_from_args;
use crate::app::pipeline::{PanelOutput, PanelState, recompute, refresh};
use crate::cli::PanelArgs;
use crate::domain::{PanelConfig, SmoothingSpec, ValuePoint};
use crate::error::AppError;

mod panel_chart;

use panel_chart::PanelChart;

/// Start the TUI.
pub fn run(args: PanelArgs) -> Result<(), AppError> {
    let config = panel_config_from_args(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::feed(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::feed(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::feed(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: PanelConfig,
    state: PanelState,
    output: Option<PanelOutput>,
    status: String,
}

impl App {
    fn new(config: PanelConfig) -> Self {
        let mut app = Self {
            config,
            state: PanelState::default(),
            output: None,
            status: String::new(),
        };
        app.reload();
        app
    }

    /// Re-fetch both feeds, then recompute.
    fn reload(&mut self) {
        self.status = "Fetching feeds...".to_string();
        refresh(&mut self.state, &self.config);
        self.rederive();
    }

    /// Recompute derived state from the held snapshots (no fetch).
    fn rederive(&mut self) {
        self.output = recompute(&self.state, &self.config);
        self.status = match (&self.output, self.state.unavailable_reason()) {
            (Some(_), _) => format!(
                "{} days | smoothing: {} | q quit, r refresh, o outskirt, s smoothing, ←/→ window",
                self.config.days, self.config.smoothing
            ),
            (None, Some(reason)) => reason,
            (None, None) => "No dated records in either feed.".to_string(),
        };
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::feed(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::feed(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::feed(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('o') => {
                self.config.outskirt = !self.config.outskirt;
            }
            KeyCode::Char('s') => {
                self.config.smoothing = match self.config.smoothing {
                    SmoothingSpec::Computed => SmoothingSpec::Feed,
                    SmoothingSpec::Feed => SmoothingSpec::Computed,
                };
                self.rederive();
            }
            KeyCode::Left => {
                self.config.days = self.config.days.saturating_sub(7).max(7);
                self.rederive();
            }
            KeyCode::Right => {
                self.config.days = (self.config.days + 7).min(365);
                self.rederive();
            }
            _ => {}
        }
        false
    }

    fn draw(&self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Min(5),
                Constraint::Length(7),
                Constraint::Length(1),
            ])
            .split(f.area());

        match &self.output {
            Some(output) => {
                let start = output.window.0;
                let days = output.combined.len().max(1) as f64;
                let x_bounds = [-0.5, days - 0.5];

                let backdrop = chart_points(&output.series.national_cases_raw, start);
                let bars = chart_points(&output.series.regional_cases_raw, start);
                let cases_line = chart_points(&output.series.cases_smoothed, start);
                let death_bars = chart_points(&output.series.deaths_raw, start);
                let death_line = chart_points(&output.series.deaths_smoothed, start);

                let (cases_max, deaths_max) = match &output.scales {
                    Some(scales) => (scales.cases.max(), scales.deaths.max()),
                    None => (0.0, 0.0),
                };

                let cases_block = Block::default().borders(Borders::ALL).title("New cases");
                let cases_area = cases_block.inner(chunks[0]);
                f.render_widget(cases_block, chunks[0]);
                f.render_widget(
                    PanelChart {
                        start,
                        bars: &bars,
                        backdrop: &backdrop,
                        line: &cases_line,
                        x_bounds,
                        y_bounds: [0.0, padded_max(cases_max)],
                        y_label: "cases".to_string(),
                    },
                    cases_area,
                );

                let deaths_block = Block::default().borders(Borders::ALL).title("New deaths");
                let deaths_area = deaths_block.inner(chunks[1]);
                f.render_widget(deaths_block, chunks[1]);
                f.render_widget(
                    PanelChart {
                        start,
                        bars: &death_bars,
                        backdrop: &[],
                        line: &death_line,
                        x_bounds,
                        y_bounds: [0.0, padded_max(deaths_max)],
                        y_label: "deaths".to_string(),
                    },
                    deaths_area,
                );

                let summary = output
                    .latest()
                    .map(|r| crate::report::format_latest_summary(r, self.config.outskirt))
                    .unwrap_or_else(|| "The active window contains no dates.".to_string());
                f.render_widget(
                    Paragraph::new(summary)
                        .block(Block::default().borders(Borders::ALL).title("Latest")),
                    chunks[2],
                );
            }
            None => {
                f.render_widget(
                    Paragraph::new("Waiting for both feeds...")
                        .block(Block::default().borders(Borders::ALL).title("epi")),
                    chunks[0],
                );
            }
        }

        f.render_widget(
            Paragraph::new(self.status.clone()).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}

/// Convert derived points into day-offset chart coordinates.
fn chart_points(points: &[ValuePoint], start: NaiveDate) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| ((p.date - start).num_days() as f64, p.value))
        .collect()
}

/// Plotters rejects empty ranges; pad the top and floor the degenerate case.
fn padded_max(max: f64) -> f64 {
    if max <= 0.0 { 1.0 } else { max * 1.05 }
}
