//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized per-source records (`NationalRecord`, `RegionalRecord`)
//! - the reconciled per-date view (`CombinedRecord`) and its invariants
//! - derived chart points (`ValuePoint`)
//! - run configuration (`PanelConfig`, `PanelLayout`)

pub mod types;

pub use types::*;
