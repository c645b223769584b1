// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark definitions and normalized result records.
//!
//! A [`BenchmarkDefinition`] is built once per benchmark directory and fixes
//! the ordered schema (`template_keys`) every record of that benchmark is
//! projected onto. A [`ResultRecord`] is the normalized form of one result
//! file: identity, one optional [`FieldValue`] per declared key, and the
//! recency signals used for deduplication. Raw JSON maps never travel past
//! the collector; everything downstream works on these types.

use crate::score::RecencyScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Field names that render as link icons and must never drive the initial
/// sort, even when named by `sort_by`.
pub const LINK_ONLY_FIELDS: &[&str] = &["setup"];

/// Raw-object keys that are bookkeeping, not result fields. Excluded when a
/// schema has to be inferred from the first parsed record.
pub const BOOKKEEPING_KEYS: &[&str] = &[
    "code", "machine", "test", "file", "date_obj", "plot", "date_ts", "mtime_ts",
];

/// Direction of a benchmark's declared initial sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDir {
    /// Parse a metadata string; anything other than `"desc"` is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }
}

/// One benchmark: metadata plus the ordered result schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    /// Display title; defaults to the directory name.
    pub name: String,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Ordered tag list rendered as chips.
    pub tags: Vec<String>,
    /// Field the table is initially sorted by, if any.
    pub sort_by: Option<String>,
    /// Direction of the initial sort.
    pub sort_dir: SortDir,
    /// Whether records may carry a visualizable raw-data file.
    pub has_data_artifact: bool,
    /// Ordered field names defining schema and column order. Empty means
    /// "infer from the first parsed record"; once resolved it never changes
    /// within a run.
    pub template_keys: Vec<String>,
    /// Relative href of the benchmark's README, when one exists.
    pub readme_href: Option<String>,
}

impl BenchmarkDefinition {
    /// All-defaults definition for a benchmark directory with missing or
    /// malformed metadata.
    pub fn minimal(dir_name: &str) -> Self {
        Self {
            name: dir_name.to_string(),
            description: String::new(),
            tags: Vec::new(),
            sort_by: None,
            sort_dir: SortDir::Asc,
            has_data_artifact: false,
            template_keys: Vec::new(),
            readme_href: None,
        }
    }

    /// Whether `key` renders as a link icon and is excluded from sorting.
    pub fn is_link_only(key: &str) -> bool {
        LINK_ONLY_FIELDS.contains(&key)
    }

    /// The field to sort by initially, with link-only fields filtered out.
    pub fn initial_sort_key(&self) -> Option<&str> {
        self.sort_by
            .as_deref()
            .filter(|key| !Self::is_link_only(key))
    }
}

/// A scalar result field value.
///
/// Result files are arbitrary JSON; by the time a value lands here it is a
/// number or a piece of text. Booleans and nested structures are carried as
/// their JSON text so they still display and sort somehow.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A numeric value.
    Number(f64),
    /// A textual value.
    Text(String),
}

impl FieldValue {
    /// Convert a raw JSON value; `Null` maps to `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
            other => Some(FieldValue::Text(other.to_string())),
        }
    }

    /// Display form of the value.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Numeric interpretation, coercing numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// The normalized form of one parsed result file.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// Simulation/software package that produced the result.
    pub code: String,
    /// Hardware/environment identifier the run executed on.
    pub machine: String,
    /// Benchmark name; keys schema lookup and grouping.
    pub test: String,
    /// Run/revision identifier (the commit directory name).
    pub commit: String,
    /// One entry per resolved template key, in declared order. Declared keys
    /// absent from the raw record carry `None`.
    pub fields: Vec<(String, Option<FieldValue>)>,
    /// The raw date string, kept even when it failed to parse.
    pub date_raw: Option<String>,
    /// Parsed result date.
    pub date: Option<DateTime<Utc>>,
    /// Source file mtime as epoch seconds; `None` when stat failed.
    pub mtime_epoch: Option<f64>,
    /// Path of the originating result file.
    pub source_path: PathBuf,
    /// Relative href of the generated plot image, when one was produced.
    pub plot_href: Option<String>,
    /// Position in traversal order, monotonic across the whole run.
    pub discovery_index: usize,
}

impl ResultRecord {
    /// Look up a field by template key.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Parsed date as epoch seconds.
    pub fn date_epoch(&self) -> Option<f64> {
        self.date.map(|dt| dt.timestamp() as f64)
    }

    /// The recency score used for deduplication.
    pub fn recency_score(&self) -> RecencyScore {
        RecencyScore::new(self.date_epoch(), self.mtime_epoch, self.discovery_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_dir_parse() {
        assert_eq!(SortDir::parse(Some("desc")), SortDir::Desc);
        assert_eq!(SortDir::parse(Some("DESC")), SortDir::Desc);
        assert_eq!(SortDir::parse(Some("asc")), SortDir::Asc);
        assert_eq!(SortDir::parse(Some("sideways")), SortDir::Asc);
        assert_eq!(SortDir::parse(None), SortDir::Asc);
    }

    #[test]
    fn test_minimal_definition_defaults() {
        let def = BenchmarkDefinition::minimal("orszag-tang");
        assert_eq!(def.name, "orszag-tang");
        assert!(def.description.is_empty());
        assert!(def.tags.is_empty());
        assert_eq!(def.sort_dir, SortDir::Asc);
        assert!(!def.has_data_artifact);
        assert!(def.template_keys.is_empty());
    }

    #[test]
    fn test_link_only_field_never_initial_sort_key() {
        let mut def = BenchmarkDefinition::minimal("t");
        def.sort_by = Some("setup".to_string());
        assert_eq!(def.initial_sort_key(), None);

        def.sort_by = Some("score".to_string());
        assert_eq!(def.initial_sort_key(), Some("score"));
    }

    #[test]
    fn test_field_value_from_json() {
        use serde_json::json;
        assert_eq!(FieldValue::from_json(&json!(null)), None);
        assert_eq!(
            FieldValue::from_json(&json!(12.5)),
            Some(FieldValue::Number(12.5))
        );
        assert_eq!(
            FieldValue::from_json(&json!("abc")),
            Some(FieldValue::Text("abc".to_string()))
        );
        assert_eq!(
            FieldValue::from_json(&json!(true)),
            Some(FieldValue::Text("true".to_string()))
        );
        assert_eq!(
            FieldValue::from_json(&json!([1, 2])),
            Some(FieldValue::Text("[1,2]".to_string()))
        );
    }

    #[test]
    fn test_field_value_numeric_coercion() {
        assert_eq!(FieldValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(FieldValue::Text("3.5".to_string()).as_number(), Some(3.5));
        assert_eq!(FieldValue::Text(" 7 ".to_string()).as_number(), Some(7.0));
        assert_eq!(FieldValue::Text("seven".to_string()).as_number(), None);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Number(12.5).display(), "12.5");
        assert_eq!(FieldValue::Number(42.0).display(), "42");
        assert_eq!(FieldValue::Text("x".to_string()).display(), "x");
    }

    fn record(index: usize) -> ResultRecord {
        ResultRecord {
            code: "sim-a".to_string(),
            machine: "node-1".to_string(),
            test: "orszag-tang".to_string(),
            commit: "abc123".to_string(),
            fields: vec![
                ("result".to_string(), Some(FieldValue::Number(12.5))),
                ("note".to_string(), None),
            ],
            date_raw: Some("2024-01-01T00:00:00Z".to_string()),
            date: crate::date::parse_iso_date("2024-01-01T00:00:00Z"),
            mtime_epoch: Some(100.0),
            source_path: PathBuf::from("results/sim-a/node-1/orszag-tang/abc123/result.json"),
            plot_href: None,
            discovery_index: index,
        }
    }

    #[test]
    fn test_record_field_lookup() {
        let rec = record(0);
        assert_eq!(rec.field("result"), Some(&FieldValue::Number(12.5)));
        assert_eq!(rec.field("note"), None);
        assert_eq!(rec.field("missing"), None);
    }

    #[test]
    fn test_record_recency_score_components() {
        let rec = record(4);
        let score = rec.recency_score();
        assert_eq!(score.date, 1_704_067_200.0);
        assert_eq!(score.mtime, 100.0);
        assert_eq!(score.index, 4);
    }
}
