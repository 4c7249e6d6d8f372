//! Command-line parsing for the daily case panel.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline code.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::SmoothingSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "Daily case-feed reconciliation and chart panel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both feeds, print the run summary, and render the text panel.
    Show(PanelArgs),
    /// Print the latest reconciled record only (useful for scripting).
    Latest(PanelArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `epi show`, but renders the
    /// panels in a terminal UI using Ratatui.
    Tui(PanelArgs),
}

/// Common options for all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct PanelArgs {
    /// Length of the active window in days.
    #[arg(short = 'd', long, default_value_t = 60)]
    pub days: u32,

    /// Fix the window end date (YYYY-MM-DD); defaults to the latest date
    /// present in the data.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Smoothed-series strategy.
    #[arg(long, value_enum, default_value_t = SmoothingSpec::Computed)]
    pub smoothing: SmoothingSpec,

    /// Moving-average window (used by `--smoothing computed`).
    #[arg(long, default_value_t = crate::series::derive::DEFAULT_WINDOW)]
    pub window: usize,

    /// Use seeded synthetic feeds instead of the network.
    #[arg(long)]
    pub offline: bool,

    /// Seed for synthetic feed generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Include the outskirt breakdown in the latest-record summary.
    #[arg(long)]
    pub outskirt: bool,

    /// Render the text panel (enabled by default for `show`).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the text panel.
    #[arg(long)]
    pub no_plot: bool,

    /// Panel width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Panel height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}
