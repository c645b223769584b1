// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Visualization collaborator seam.
//!
//! Benchmarks that declare a data artifact carry a raw data file next to
//! each result file. Turning that file into an image is not this crate's
//! business: a [`PlotStrategy`] does it, resolved statically per benchmark
//! through a [`PlotRegistry`]. The contract is one operation: given the
//! input directory (holding the raw data file) and an output directory,
//! produce [`RESULT_IMAGE`] inside the output directory or fail.
//!
//! Output paths are distinct per (test, commit) and strategies must place
//! the image atomically, so invocations could run concurrently without
//! coordination. The mtime-based skip check is a best-effort cache, not a
//! lock: a race costs a redundant recomputation, never a corrupt file.

use benchboard_core::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Well-known name of the raw data file beside a result file.
pub const DATA_FILE: &str = "data.h5";

/// Well-known name of the image a strategy must produce.
pub const RESULT_IMAGE: &str = "result.png";

/// A statically-resolved visualization strategy for one benchmark.
pub trait PlotStrategy {
    /// Render the raw data file in `input_dir` into `output_dir`, returning
    /// the path of the produced [`RESULT_IMAGE`].
    ///
    /// The image must be placed atomically: write to a temporary path, then
    /// rename onto the final name. [`write_image_atomic`] does this.
    fn render(&self, input_dir: &Path, output_dir: &Path) -> Result<PathBuf>;
}

/// Closures work as strategies, which keeps tests short.
impl<F> PlotStrategy for F
where
    F: Fn(&Path, &Path) -> Result<PathBuf>,
{
    fn render(&self, input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        self(input_dir, output_dir)
    }
}

/// Maps benchmark names to their visualization strategies.
///
/// Replaces the dynamic per-benchmark plot-script loading of older setups:
/// a benchmark with no registered strategy simply gets no plots.
#[derive(Default)]
pub struct PlotRegistry {
    strategies: HashMap<String, Box<dyn PlotStrategy>>,
}

impl PlotRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy for `benchmark`, replacing any previous one.
    pub fn register(&mut self, benchmark: impl Into<String>, strategy: Box<dyn PlotStrategy>) {
        self.strategies.insert(benchmark.into(), strategy);
    }

    /// Look up the strategy for `benchmark`.
    pub fn get(&self, benchmark: &str) -> Option<&dyn PlotStrategy> {
        self.strategies.get(benchmark).map(|s| s.as_ref())
    }
}

impl std::fmt::Debug for PlotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.strategies.keys().collect();
        names.sort();
        f.debug_struct("PlotRegistry").field("benchmarks", &names).finish()
    }
}

/// Strategy that shells out to an external program.
///
/// The program is invoked as `<program> <input_dir> <output_dir>` and must
/// leave [`RESULT_IMAGE`] in the output directory.
#[derive(Debug, Clone)]
pub struct CommandStrategy {
    program: PathBuf,
}

impl CommandStrategy {
    /// Create a strategy invoking `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PlotStrategy for CommandStrategy {
    fn render(&self, input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        let status = Command::new(&self.program)
            .arg(input_dir)
            .arg(output_dir)
            .status()
            .map_err(|err| Error::plot(format!("{}: {err}", self.program.display())))?;
        if !status.success() {
            return Err(Error::plot(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }
        let image = output_dir.join(RESULT_IMAGE);
        if !image.is_file() {
            return Err(Error::plot(format!(
                "{} produced no {RESULT_IMAGE}",
                self.program.display()
            )));
        }
        Ok(image)
    }
}

/// Atomically place image bytes at `output_dir/result.png`.
///
/// Writes a sibling temporary file first, then renames it onto the final
/// name, so a concurrent cache check never observes a half-written image.
pub fn write_image_atomic(output_dir: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let final_path = output_dir.join(RESULT_IMAGE);
    let tmp_path = output_dir.join(format!(".{RESULT_IMAGE}.tmp"));
    fs::write(&tmp_path, bytes).map_err(|err| Error::io(&tmp_path, err))?;
    fs::rename(&tmp_path, &final_path).map_err(|err| Error::io(&final_path, err))?;
    Ok(final_path)
}

/// Epoch-seconds mtime of `path`, or `None` when the file cannot be stat'd.
pub(crate) fn mtime_epoch(path: &Path) -> Option<f64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(std::time::UNIX_EPOCH).ok()?;
    Some(since_epoch.as_secs_f64())
}

/// Render the plot for one (test, commit), honoring the mtime cache.
///
/// Returns the path of the image inside `output_dir`. Errors bubble up to
/// the collector, which logs them and leaves the record's plot empty.
pub(crate) fn render_cached(
    registry: &PlotRegistry,
    test: &str,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let image = output_dir.join(RESULT_IMAGE);
    let data = input_dir.join(DATA_FILE);

    // Reuse an image that is already newer than its data file.
    if let (Some(image_mtime), Some(data_mtime)) = (mtime_epoch(&image), mtime_epoch(&data)) {
        if image_mtime > data_mtime {
            debug!(test, image = %image.display(), "plot up to date, skipping");
            return Ok(image);
        }
    }

    let strategy = registry
        .get(test)
        .ok_or_else(|| Error::plot(format!("no plot strategy registered for {test}")))?;

    fs::create_dir_all(output_dir).map_err(|err| Error::io(output_dir, err))?;
    let produced = strategy.render(input_dir, output_dir)?;
    if !produced.is_file() {
        return Err(Error::plot(format!(
            "strategy for {test} reported {} but no file exists",
            produced.display()
        )));
    }
    Ok(produced)
}
