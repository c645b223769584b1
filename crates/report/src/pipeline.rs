// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pipeline driver: one full leaderboard build.
//!
//! Runs the stages in strict sequence and writes the output artifacts. The
//! run is all-or-nothing only about its destination: failing to create or
//! write the output directory aborts, while every data-level problem has
//! already been degraded to a warning by the earlier stages.

use crate::collect::collect;
use crate::plot::PlotRegistry;
use crate::reduce::reduce;
use crate::registry;
use crate::render::{render_at, ReportInputs};
use benchboard_core::{Error, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the document written into the output directory.
pub const INDEX_FILE: &str = "index.html";

/// Default logo file name when none is supplied.
const DEFAULT_LOGO: &str = "benchboard.png";

/// Input and output locations for one run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory of benchmark definitions.
    pub benchmarks_dir: PathBuf,
    /// Root of the result tree.
    pub results_dir: PathBuf,
    /// Destination directory for the document and plot images.
    pub output_dir: PathBuf,
    /// Logo asset copied beside the document, when present.
    pub logo: Option<PathBuf>,
}

/// What a finished run produced, for CLI reporting.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of tests with at least one kept record.
    pub tests: usize,
    /// Total kept records across all tests.
    pub records: usize,
    /// Distinct codes among kept records.
    pub codes: usize,
    /// Distinct machines among kept records.
    pub machines: usize,
    /// Path of the written document.
    pub output_file: PathBuf,
}

fn dir_link_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

/// Build the leaderboard once.
///
/// Registry → collector → reducer → renderer, then write `index.html` and
/// copy the logo. The embedded generation timestamp is the only
/// nondeterministic part of the output.
pub fn run(options: &Options, plots: &PlotRegistry) -> Result<RunSummary> {
    let mut benchmarks = registry::load(&options.benchmarks_dir);
    info!(benchmarks = benchmarks.len(), "loaded benchmark definitions");

    // The one fatal failure: no destination, no run.
    fs::create_dir_all(&options.output_dir)
        .map_err(|err| Error::output_dir(&options.output_dir, err))?;

    let collected = collect(&mut benchmarks, plots, &options.results_dir, &options.output_dir);
    info!(records = collected.records.len(), "collected result records");

    let reduced = reduce(&benchmarks, collected.records);

    let codes: HashSet<&str> = reduced
        .values()
        .flatten()
        .map(|r| r.code.as_str())
        .collect();
    let machines: HashSet<&str> = reduced
        .values()
        .flatten()
        .map(|r| r.machine.as_str())
        .collect();
    let summary = RunSummary {
        tests: reduced.len(),
        records: reduced.values().map(Vec::len).sum(),
        codes: codes.len(),
        machines: machines.len(),
        output_file: options.output_dir.join(INDEX_FILE),
    };

    let results_href = format!("../{}", dir_link_name(&options.results_dir, "results"));
    let logo_name = options
        .logo
        .as_deref()
        .map(|p| dir_link_name(p, DEFAULT_LOGO))
        .unwrap_or_else(|| DEFAULT_LOGO.to_string());

    let inputs = ReportInputs {
        registry: &benchmarks,
        reduced: &reduced,
        code_urls: &collected.code_urls,
        results_href: &results_href,
        logo: &logo_name,
    };
    let html = render_at(&inputs, Utc::now());

    fs::write(&summary.output_file, html)
        .map_err(|err| Error::output_dir(&summary.output_file, err))?;
    info!(output = %summary.output_file.display(), "wrote leaderboard");

    copy_logo(options, &logo_name);

    Ok(summary)
}

/// Copy the logo beside the document. A missing or unreadable logo is a
/// warning; the document still references the file name.
fn copy_logo(options: &Options, logo_name: &str) {
    let Some(source) = &options.logo else {
        debug!("no logo configured");
        return;
    };
    match fs::copy(source, options.output_dir.join(logo_name)) {
        Ok(_) => debug!(logo = %source.display(), "copied logo"),
        Err(err) => warn!(logo = %source.display(), %err, "logo not copied"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_run_writes_index_html() {
        let root = tempfile::tempdir().unwrap();
        write(
            &root.path().join("results/sim-a/node-1/vortex/c1/result.json"),
            r#"{"result":1.0}"#,
        );
        let options = Options {
            benchmarks_dir: root.path().join("benchmarks"),
            results_dir: root.path().join("results"),
            output_dir: root.path().join("html"),
            logo: None,
        };

        let summary = run(&options, &PlotRegistry::new()).unwrap();
        assert_eq!(summary.tests, 1);
        assert_eq!(summary.records, 1);
        assert_eq!(summary.codes, 1);
        assert_eq!(summary.machines, 1);
        let html = fs::read_to_string(&summary.output_file).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("vortex"));
    }

    #[test]
    fn test_empty_inputs_still_produce_a_document() {
        let root = tempfile::tempdir().unwrap();
        let options = Options {
            benchmarks_dir: root.path().join("no-benchmarks"),
            results_dir: root.path().join("no-results"),
            output_dir: root.path().join("html"),
            logo: None,
        };

        let summary = run(&options, &PlotRegistry::new()).unwrap();
        assert_eq!(summary.tests, 0);
        let html = fs::read_to_string(&summary.output_file).unwrap();
        assert!(html.contains("No results found"));
    }

    #[test]
    fn test_unwritable_output_dir_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        // A file where the output directory should go.
        fs::write(root.path().join("html"), "in the way").unwrap();
        let options = Options {
            benchmarks_dir: root.path().join("benchmarks"),
            results_dir: root.path().join("results"),
            output_dir: root.path().join("html"),
            logo: None,
        };

        let err = run(&options, &PlotRegistry::new()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_logo_is_copied_when_present() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("logo.png"), b"png").unwrap();
        let options = Options {
            benchmarks_dir: root.path().join("benchmarks"),
            results_dir: root.path().join("results"),
            output_dir: root.path().join("html"),
            logo: Some(root.path().join("logo.png")),
        };

        run(&options, &PlotRegistry::new()).unwrap();
        assert!(root.path().join("html/logo.png").is_file());
    }

    #[test]
    fn test_missing_logo_is_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let options = Options {
            benchmarks_dir: root.path().join("benchmarks"),
            results_dir: root.path().join("results"),
            output_dir: root.path().join("html"),
            logo: Some(root.path().join("no-such-logo.png")),
        };

        assert!(run(&options, &PlotRegistry::new()).is_ok());
    }
}
