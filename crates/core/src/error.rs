// Copyright 2025 Perfdelta Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared error type for the perfdelta workspace.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and comparing results.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The results directory passed on the command line does not exist.
    #[error("results directory not found: {path}")]
    ResultsDirMissing {
        /// The directory that was requested.
        path: PathBuf,
    },

    /// A file or directory could not be read or written.
    #[error("I/O error on {path}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A result file contained invalid JSON.
    #[error("invalid JSON in {path}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for perfdelta operations.
pub type Result<T> = std::result::Result<T, CompareError>;
