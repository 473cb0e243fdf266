//! Result normalization and comparison reporting for perfdelta.
//!
//! This crate turns a directory of heterogeneous benchmark output files
//! into a [`perfdelta_core::ComparisonSession`] and renders the
//! comparison in three forms:
//!
//! - [`csv`] - the `comparison_results.csv` table
//! - [`report`] - the sectioned stdout report with a ±5% summary
//! - [`svg`] - pre/post comparison charts as standalone SVG files
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let session = perfdelta_report::io::load_session(Path::new("results"))?;
//! let deltas = session.compute_deltas();
//!
//! perfdelta_report::io::write_csv(&session, Path::new("comparison_results.csv"))?;
//! print!("{}", perfdelta_report::report::render(&deltas));
//! # Ok::<(), perfdelta_core::CompareError>(())
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod csv;
pub mod discover;
pub mod io;
pub mod normalize;
pub mod report;
pub mod svg;
