// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Recency scoring for duplicate results.
//!
//! Several runs can target the same (code, machine) pair within one test;
//! only one row survives. The winner is picked by this score, compared
//! lexicographically: declared date first, file mtime second, discovery
//! order last. Missing components collapse to `-1.0`, so a record with any
//! real date strictly beats a record with none, regardless of how fresh the
//! dateless file's mtime is.

use std::cmp::Ordering;

/// Derived recency score for one result record.
///
/// Never stored on the record itself; computed where the comparison happens.
#[derive(Debug, Clone, Copy)]
pub struct RecencyScore {
    /// Declared result date as epoch seconds, `-1.0` when absent.
    pub date: f64,
    /// Source file mtime as epoch seconds, `-1.0` when absent.
    pub mtime: f64,
    /// Position in traversal order; deterministic tie-break only.
    pub index: usize,
}

impl RecencyScore {
    /// Build a score from optional recency signals and the discovery index.
    pub fn new(date_epoch: Option<f64>, mtime_epoch: Option<f64>, index: usize) -> Self {
        Self {
            date: date_epoch.unwrap_or(-1.0),
            mtime: mtime_epoch.unwrap_or(-1.0),
            index,
        }
    }
}

impl PartialEq for RecencyScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RecencyScore {}

impl PartialOrd for RecencyScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecencyScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .total_cmp(&other.date)
            .then(self.mtime.total_cmp(&other.mtime))
            .then(self.index.cmp(&other.index))
    }
}
