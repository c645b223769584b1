// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Leaderboard pipeline for benchboard.
//!
//! This crate implements the discovery → normalization → deduplication →
//! ranking → rendering pipeline that turns a tree of benchmark definitions
//! and result records into one standalone HTML leaderboard.
//!
//! The stages run in strict sequence, each feeding the next:
//!
//! - [`registry`] - load benchmark definitions and their declared schemas
//! - [`collect`] - walk the result tree into normalized records
//! - [`plot`] - the visualization collaborator seam used by the collector
//! - [`reduce`] - deduplicate per (code, machine) and apply the sort policy
//! - [`render`] - emit the HTML document
//! - [`pipeline`] - drive a full run and write the output artifacts

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod collect;
pub mod pipeline;
pub mod plot;
pub mod reduce;
pub mod registry;
pub mod render;

pub use collect::{collect, Collected};
pub use pipeline::{run, Options, RunSummary};
pub use plot::{CommandStrategy, PlotRegistry, PlotStrategy};
pub use reduce::reduce;
pub use render::{render_at, ReportInputs};
