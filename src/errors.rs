/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Error types shared by the VASP file codecs

use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing VASP input files
#[derive(Error, Debug)]
pub enum VaspIoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("format error at line {line}: {reason} (got {content:?})")]
    Format {
        /// 1-based line number of the offending line
        line: usize,
        /// Verbatim text of the offending line
        content: String,
        reason: String,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

impl VaspIoError {
    /// Shorthand for a format error carrying line context.
    pub fn format(line: usize, content: &str, reason: impl Into<String>) -> Self {
        VaspIoError::Format {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, VaspIoError>;
