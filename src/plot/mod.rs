//! Terminal rendering of the panel.

pub mod ascii;

pub use ascii::render_ascii_panel;
