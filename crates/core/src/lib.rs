// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data model for the benchboard leaderboard generator.
//!
//! Benchboard aggregates benchmark-result artifacts scattered across a
//! `results/` tree into a single static leaderboard document. This crate
//! holds the types shared by the pipeline stages:
//!
//! - [`model`] - benchmark definitions and normalized result records
//! - [`score`] - the recency score used to pick one result per (code, machine)
//! - [`date`] - tolerant ISO-8601 parsing and report timestamp formatting
//! - [`error`] - the error taxonomy for the whole pipeline

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod date;
pub mod error;
pub mod model;
pub mod score;

pub use error::{Error, Result};
pub use model::{BenchmarkDefinition, FieldValue, ResultRecord, SortDir};
pub use score::RecencyScore;
