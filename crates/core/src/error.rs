// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the leaderboard pipeline.
//!
//! Almost every failure in this system is tolerated in place: a malformed
//! result file is skipped, a missing metadata file yields defaults, a failed
//! plot leaves a placeholder cell. The variants here exist for the few seams
//! that do return errors, and [`Error::OutputDir`] is the single fatal case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a leaderboard.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON that could not be parsed.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File the JSON came from.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The destination directory could not be created or written.
    ///
    /// This is the only error that aborts a run.
    #[error("cannot write output at {path}: {source}")]
    OutputDir {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A visualization strategy failed or produced no image.
    ///
    /// Always caught at the call site; a failed plot degrades one cell,
    /// never the run.
    #[error("plot generation failed: {0}")]
    Plot(String),

    /// Invalid caller-supplied input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Build an [`Error::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::Json`] for `path`.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::OutputDir`] for `path`.
    pub fn output_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::OutputDir {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::Plot`] with a message.
    pub fn plot(msg: impl Into<String>) -> Self {
        Error::Plot(msg.into())
    }

    /// Build an [`Error::InvalidInput`] with a message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Whether this error should abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::OutputDir { .. })
    }
}

/// Result type for leaderboard operations.
pub type Result<T> = std::result::Result<T, Error>;
