// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark registry: one [`BenchmarkDefinition`] per benchmark directory.
//!
//! Discovery is deliberately forgiving. A benchmark directory with no
//! `info.json` is still a benchmark; a corrupt `template.json` just means
//! the schema is inferred later from the first parsed record. Nothing here
//! can abort a run.

use benchboard_core::{BenchmarkDefinition, SortDir};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Mirror of `info.json`. Every field is optional so partial metadata still
/// deserializes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfoFile {
    name: Option<String>,
    description: String,
    tags: Vec<String>,
    sort_by: Option<String>,
    sort_dir: Option<String>,
    data_file: bool,
}

/// Read and parse a JSON file, treating any failure as absence.
pub(crate) fn read_json_value(path: &Path) -> Option<serde_json::Value> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), %err, "skipping malformed JSON");
            None
        }
    }
}

/// Ordered top-level keys of `template.json`, or empty when the file is
/// missing, malformed, or not an object.
fn template_keys(path: &Path) -> Vec<String> {
    match read_json_value(path) {
        Some(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        Some(_) => {
            debug!(path = %path.display(), "template is not an object; deferring schema");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Load all benchmark definitions under `benchmarks_root`, keyed by
/// directory name.
///
/// The returned map is ordered by name, which is also the section order of
/// the rendered report.
pub fn load(benchmarks_root: &Path) -> BTreeMap<String, BenchmarkDefinition> {
    let mut benchmarks = BTreeMap::new();

    let entries = match fs::read_dir(benchmarks_root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %benchmarks_root.display(), %err, "benchmarks root not readable");
            return benchmarks;
        }
    };

    // The href prefix assumes the output directory sits beside the
    // benchmarks root, which is the layout the report links against.
    let root_name = benchmarks_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "benchmarks".to_string());

    let mut dirs: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    dirs.sort_by_key(|entry| entry.file_name());

    for entry in dirs {
        let dir = entry.path();
        let dir_name = entry.file_name().to_string_lossy().into_owned();

        let info: InfoFile = read_json_value(&dir.join("info.json"))
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        let readme_href = dir
            .join("README.md")
            .exists()
            .then(|| format!("../{root_name}/{dir_name}/README.md"));

        let definition = BenchmarkDefinition {
            name: info.name.unwrap_or_else(|| dir_name.clone()),
            description: info.description,
            tags: info.tags,
            sort_by: info.sort_by,
            sort_dir: SortDir::parse(info.sort_dir.as_deref()),
            has_data_artifact: info.data_file,
            template_keys: template_keys(&dir.join("template.json")),
            readme_href,
        };

        debug!(
            benchmark = %dir_name,
            keys = definition.template_keys.len(),
            "loaded benchmark definition"
        );
        benchmarks.insert(dir_name, definition);
    }

    benchmarks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_full_definition() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("orszag-tang");
        write(
            &dir.join("info.json"),
            r#"{"name":"Orszag-Tang","description":"MHD vortex","tags":["mhd","2d"],
                "sort_by":"result","sort_dir":"desc","data_file":true}"#,
        );
        write(
            &dir.join("template.json"),
            r#"{"date":"","commit":"","result":""}"#,
        );
        write(&dir.join("README.md"), "# Orszag-Tang\n");

        let benchmarks = load(root.path());
        let def = &benchmarks["orszag-tang"];
        assert_eq!(def.name, "Orszag-Tang");
        assert_eq!(def.description, "MHD vortex");
        assert_eq!(def.tags, ["mhd", "2d"]);
        assert_eq!(def.sort_by.as_deref(), Some("result"));
        assert_eq!(def.sort_dir, SortDir::Desc);
        assert!(def.has_data_artifact);
        assert_eq!(def.template_keys, ["date", "commit", "result"]);
        assert!(def
            .readme_href
            .as_deref()
            .unwrap()
            .ends_with("orszag-tang/README.md"));
    }

    #[test]
    fn test_missing_metadata_yields_defaults() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("bare")).unwrap();

        let benchmarks = load(root.path());
        let def = &benchmarks["bare"];
        assert_eq!(def.name, "bare");
        assert!(def.description.is_empty());
        assert!(def.template_keys.is_empty());
        assert!(def.readme_href.is_none());
        assert!(!def.has_data_artifact);
    }

    #[test]
    fn test_malformed_metadata_is_tolerated() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("broken");
        write(&dir.join("info.json"), "{not json");
        write(&dir.join("template.json"), "[1,2,3]");

        let benchmarks = load(root.path());
        let def = &benchmarks["broken"];
        assert_eq!(def.name, "broken");
        assert!(def.template_keys.is_empty());
    }

    #[test]
    fn test_template_key_order_is_preserved() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("ordered");
        write(
            &dir.join("template.json"),
            r#"{"zeta":"","alpha":"","mid":""}"#,
        );

        let benchmarks = load(root.path());
        assert_eq!(benchmarks["ordered"].template_keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_files_at_root_are_ignored() {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join("stray.json"), "{}");
        fs::create_dir_all(root.path().join("real")).unwrap();

        let benchmarks = load(root.path());
        assert_eq!(benchmarks.len(), 1);
        assert!(benchmarks.contains_key("real"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let benchmarks = load(Path::new("/nonexistent/benchboard-fixture"));
        assert!(benchmarks.is_empty());
    }
}
