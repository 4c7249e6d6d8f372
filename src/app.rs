//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches and reconciles both feeds
//! - prints summaries/panels
//! - hands off to the TUI

use clap::Parser;

use crate::cli::{Command, PanelArgs};
use crate::domain::{PanelConfig, PanelLayout};
use crate::error::AppError;

pub mod pipeline;

use pipeline::{PanelState, recompute, refresh};

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `epi` (and `epi --offline` etc.) to behave like `epi tui`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Latest(args) => handle_latest(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_show(args: PanelArgs) -> Result<(), AppError> {
    let config = panel_config_from_args(&args)?;
    let mut state = PanelState::default();
    refresh(&mut state, &config);

    let output = recompute(&state, &config).ok_or_else(|| {
        AppError::feed(
            state
                .unavailable_reason()
                .unwrap_or_else(|| "No dated records in either feed.".to_string()),
        )
    })?;

    println!("{}", crate::report::format_run_summary(&state, &output, &config));

    if config.plot {
        println!(
            "{}",
            crate::plot::render_ascii_panel(&output, config.plot_width, config.plot_height)
        );
    }

    Ok(())
}

fn handle_latest(args: PanelArgs) -> Result<(), AppError> {
    let config = panel_config_from_args(&args)?;
    let mut state = PanelState::default();
    refresh(&mut state, &config);

    let output = recompute(&state, &config).ok_or_else(|| {
        AppError::feed(
            state
                .unavailable_reason()
                .unwrap_or_else(|| "No dated records in either feed.".to_string()),
        )
    })?;

    let latest = output
        .latest()
        .ok_or_else(|| AppError::feed("The active window contains no dates."))?;

    println!("{}", crate::report::format_latest_summary(latest, config.outskirt));
    Ok(())
}

pub fn panel_config_from_args(args: &PanelArgs) -> Result<PanelConfig, AppError> {
    if args.days == 0 {
        return Err(AppError::config("Window length must be at least 1 day."));
    }
    if args.window == 0 {
        return Err(AppError::config("Moving-average window must be at least 1."));
    }

    Ok(PanelConfig {
        days: args.days,
        end: args.end,
        smoothing: args.smoothing,
        window: args.window,
        offline: args.offline,
        sample_seed: args.seed,
        outskirt: args.outskirt,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        layout: PanelLayout::default(),
    })
}

/// Rewrite argv so `epi` defaults to `epi tui`.
///
/// Rules:
/// - `epi`                      -> `epi tui`
/// - `epi --offline ...`        -> `epi tui --offline ...`
/// - `epi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "latest" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
