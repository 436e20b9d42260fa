//! Text rendering of monitor state for the operator display

pub mod dashboard;

pub use dashboard::{render_report, StatusBoard};
