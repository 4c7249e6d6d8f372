//! Formatted terminal output.
//!
//! Formatting lives in one place so the pipeline stays clean and output
//! changes are localized.

pub mod format;

pub use format::*;
