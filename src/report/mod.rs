//! Output rendering.

pub mod generator;

pub use generator::{generate_json_report, generate_summary_text, render_markdown_table};
