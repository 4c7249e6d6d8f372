//! The reconciliation-and-derivation core.
//!
//! - `dates`: canonical calendar axis generation
//! - `align`: merging both feeds onto that axis
//! - `derive`: raw extraction and trailing moving averages

pub mod align;
pub mod dates;
pub mod derive;

pub use align::align;
pub use dates::date_range;
pub use derive::{Smoothing, feed_series, raw_series, smoothed_series};
