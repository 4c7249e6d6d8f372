//! Feed clients and per-source normalization.
//!
//! Each submodule owns one source: fetching its raw payload and turning it
//! into a normalized, immutable snapshot. Normalization is pure per record
//! and is exercised by the offline sample generator as well as the clients.

pub mod national;
pub mod regional;
pub mod sample;

pub use national::{NationalClient, normalize_timeline};
pub use regional::{RegionalClient, parse_regional_csv};
pub use sample::generate_feeds;
