//! Error types shared by the generator, the record store and the monitor.

use std::path::PathBuf;
use thiserror::Error;

use crate::sensor::profile::Role;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Age outside the accepted bounds for the role.
    #[error("Invalid age for driver/passenger: {age} is not accepted for a {role}")]
    InvalidAge { age: i32, role: Role },

    #[error("record file {path} could not be opened: {source}")]
    MissingRecordFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record file header is malformed: found {found:?}")]
    MalformedHeader { found: String },

    /// `line` is 1-based and counts the header.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("invalid thresholds: danger={danger}, control={control}")]
    InvalidThresholds { danger: f64, control: f64 },

    #[error("{name} thread panicked")]
    WorkerPanicked { name: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
