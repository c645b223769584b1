// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Result collector: walks the result tree into normalized records.
//!
//! The tree is `results/<code>/<machine>/<test>/<commit>/result.json`, with
//! an optional raw data file beside each result. Anything that does not fit
//! that shape is skipped, never fatal. Directory entries are visited in
//! name order at every level so the discovery index, and with it every
//! downstream tie-break, is deterministic.

use crate::plot::{self, PlotRegistry, DATA_FILE, RESULT_IMAGE};
use crate::registry::read_json_value;
use benchboard_core::{date, BenchmarkDefinition, FieldValue, ResultRecord};
use benchboard_core::model::BOOKKEEPING_KEYS;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the per-code metadata file carrying the project URL.
const CODE_FILE: &str = "code.json";

/// Name a leaf result file must have.
const RESULT_FILE: &str = "result.json";

/// Everything the collector hands to the reducer and renderer.
#[derive(Debug, Default)]
pub struct Collected {
    /// All normalized records, in discovery order.
    pub records: Vec<ResultRecord>,
    /// Code name → project URL, from each code's `code.json`.
    pub code_urls: BTreeMap<String, String>,
}

/// Mutable state threaded through the directory walk.
///
/// Keeps the traversal free of shared module state: the registry (which the
/// walk may extend with inferred schemas and minimal definitions), the
/// record accumulator, and the monotonic discovery counter travel together.
struct CollectContext<'a> {
    registry: &'a mut BTreeMap<String, BenchmarkDefinition>,
    plots: &'a PlotRegistry,
    output_root: &'a Path,
    collected: Collected,
    next_index: usize,
}

/// Subdirectories of `dir` in name order; empty when `dir` is unreadable.
fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    };
    dirs.sort();
    dirs
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Walk the result tree under `results_root` into normalized records.
///
/// `registry` gains a minimal definition for any test present in the results
/// but absent from the benchmarks directory, and inferred `template_keys`
/// for definitions that declared none. `output_root` is where plot images
/// land (`plots/<code>/<machine>/<test>/<commit>/result.png`).
pub fn collect(
    registry: &mut BTreeMap<String, BenchmarkDefinition>,
    plots: &PlotRegistry,
    results_root: &Path,
    output_root: &Path,
) -> Collected {
    let mut ctx = CollectContext {
        registry,
        plots,
        output_root,
        collected: Collected::default(),
        next_index: 0,
    };

    for code_dir in sorted_subdirs(results_root) {
        let code = dir_name(&code_dir);
        if let Some(url) = read_json_value(&code_dir.join(CODE_FILE))
            .and_then(|v| v.get("url").and_then(|u| u.as_str()).map(String::from))
        {
            ctx.collected.code_urls.insert(code.clone(), url);
        }
        for machine_dir in sorted_subdirs(&code_dir) {
            let machine = dir_name(&machine_dir);
            for test_dir in sorted_subdirs(&machine_dir) {
                collect_test(&mut ctx, &code, &machine, &test_dir);
            }
        }
    }

    debug!(
        records = ctx.collected.records.len(),
        codes = ctx.collected.code_urls.len(),
        "result collection finished"
    );
    ctx.collected
}

/// Collect every commit under one `<code>/<machine>/<test>` directory.
fn collect_test(ctx: &mut CollectContext<'_>, code: &str, machine: &str, test_dir: &Path) {
    let test = dir_name(test_dir);

    // A test that only exists in the results tree still gets a section.
    if !ctx.registry.contains_key(&test) {
        debug!(%test, "test has no benchmark definition; using defaults");
        ctx.registry
            .insert(test.clone(), BenchmarkDefinition::minimal(&test));
    }

    if ctx.registry[&test].template_keys.is_empty() {
        let inferred = infer_template_keys(test_dir);
        if !inferred.is_empty() {
            debug!(%test, ?inferred, "inferred schema from first record");
            if let Some(definition) = ctx.registry.get_mut(&test) {
                definition.template_keys = inferred;
            }
        }
    }

    let definition = ctx.registry[&test].clone();
    for commit_dir in sorted_subdirs(test_dir) {
        let result_file = commit_dir.join(RESULT_FILE);
        if !result_file.is_file() {
            continue;
        }
        let Some(mut record) =
            parse_result_file(&result_file, &definition.template_keys, code, machine, &test)
        else {
            continue;
        };
        record.commit = dir_name(&commit_dir);
        record.discovery_index = ctx.next_index;
        ctx.next_index += 1;

        if definition.has_data_artifact && commit_dir.join(DATA_FILE).is_file() {
            record.plot_href = generate_plot(ctx, code, machine, &test, &commit_dir);
        }

        ctx.collected.records.push(record);
    }
}

/// Parse one result file into a record, or `None` when it is not a JSON
/// object. Identity fields other than `commit` and the discovery index are
/// filled in; the caller owns those two.
fn parse_result_file(
    result_file: &Path,
    template_keys: &[String],
    code: &str,
    machine: &str,
    test: &str,
) -> Option<ResultRecord> {
    let value = read_json_value(result_file)?;
    let Some(object) = value.as_object() else {
        warn!(path = %result_file.display(), "result is not a JSON object; skipping");
        return None;
    };

    let fields = template_keys
        .iter()
        .map(|key| (key.clone(), object.get(key).and_then(FieldValue::from_json)))
        .collect();

    // The date lives among the declared fields when the schema names it,
    // but a top-level date still counts as a recency signal either way.
    let date_raw = object
        .get("date")
        .and_then(|v| v.as_str())
        .map(String::from);
    let parsed_date = date_raw.as_deref().and_then(date::parse_iso_date);
    if date_raw.is_some() && parsed_date.is_none() {
        debug!(path = %result_file.display(), raw = ?date_raw, "unparsable date; keeping raw string");
    }

    Some(ResultRecord {
        code: code.to_string(),
        machine: machine.to_string(),
        test: test.to_string(),
        commit: String::new(),
        fields,
        date_raw,
        date: parsed_date,
        mtime_epoch: plot::mtime_epoch(result_file),
        source_path: result_file.to_path_buf(),
        plot_href: None,
        discovery_index: 0,
    })
}

/// Infer a schema from the first parsable record under a test, excluding
/// bookkeeping keys. Key order is the raw object's key order.
fn infer_template_keys(test_dir: &Path) -> Vec<String> {
    for commit_dir in sorted_subdirs(test_dir) {
        let result_file = commit_dir.join(RESULT_FILE);
        if !result_file.is_file() {
            continue;
        }
        if let Some(serde_json::Value::Object(map)) = read_json_value(&result_file) {
            return map
                .keys()
                .filter(|key| !BOOKKEEPING_KEYS.contains(&key.as_str()))
                .cloned()
                .collect();
        }
        // Only the first result file under the test is consulted, parsable
        // or not, matching the one-shot nature of schema resolution.
        break;
    }
    Vec::new()
}

/// Run the visualization strategy for one (test, commit).
///
/// Any failure is logged and degrades to no plot; the record still renders.
fn generate_plot(
    ctx: &CollectContext<'_>,
    code: &str,
    machine: &str,
    test: &str,
    commit_dir: &Path,
) -> Option<String> {
    let commit = dir_name(commit_dir);
    let output_dir = ctx
        .output_root
        .join("plots")
        .join(code)
        .join(machine)
        .join(test)
        .join(&commit);

    match plot::render_cached(ctx.plots, test, commit_dir, &output_dir) {
        Ok(_) => Some(format!("plots/{code}/{machine}/{test}/{commit}/{RESULT_IMAGE}")),
        Err(err) => {
            warn!(%test, %code, %machine, %commit, %err, "plot generation failed");
            None
        }
    }
}
