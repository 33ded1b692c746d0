//! Report output in JSON, CSV and Markdown.

pub mod generator;

pub use generator::{render_report, write_output};
