// Copyright 2025 Perfdelta Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data model for perfdelta.
//!
//! This crate defines the normalized record types shared by the whole
//! workspace and the arithmetic used to compare them:
//!
//! - [`record`] - phases, benchmark kinds, `UniformRecord`, `ComparisonSession`
//! - [`delta`] - percentage-change policy and change classification
//! - [`metrics`] - the tracked-metric vocabulary per benchmark kind
//! - [`error`] - the shared [`CompareError`] type
//!
//! No I/O happens here; reading result files and rendering reports live
//! in `perfdelta-report`.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod delta;
pub mod error;
pub mod metrics;
pub mod record;

pub use delta::{percent_change, ChangeClass, DeltaPolicy, DeltaRecord, MetricDelta};
pub use error::{CompareError, Result};
pub use metrics::MetricSpec;
pub use record::{ComparisonSession, Kind, MetricValue, Phase, TransferTool, UniformRecord};
