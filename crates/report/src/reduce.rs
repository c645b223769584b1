// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reducer: one record per (code, machine), ordered per benchmark policy.
//!
//! Deduplication keeps the record with the greatest recency score. The
//! comparison is deliberately "greater or equal": when two candidates tie on
//! date and mtime, the later-discovered one wins. That last-wins rule is a
//! compatibility contract with existing leaderboards and must not be turned
//! into first-wins.

use benchboard_core::{BenchmarkDefinition, RecencyScore, ResultRecord, SortDir};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Group records by test, deduplicate, and apply each benchmark's declared
/// sort. Tests come back in name order; records within an unsorted test stay
/// in discovery order.
pub fn reduce(
    registry: &BTreeMap<String, BenchmarkDefinition>,
    records: Vec<ResultRecord>,
) -> BTreeMap<String, Vec<ResultRecord>> {
    let mut by_test: BTreeMap<String, Vec<ResultRecord>> = BTreeMap::new();
    for record in records {
        by_test.entry(record.test.clone()).or_default().push(record);
    }

    for (test, records) in &mut by_test {
        dedup(records);
        if let Some(key) = registry.get(test).and_then(|def| def.initial_sort_key()) {
            let dir = registry[test].sort_dir;
            sort_records(records, key, dir);
        }
    }

    by_test
}

/// Keep the best record per (code, machine), preserving the relative order
/// in which the kept records were discovered.
fn dedup(records: &mut Vec<ResultRecord>) {
    let mut best: HashMap<(String, String), (RecencyScore, usize)> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        let key = (record.code.clone(), record.machine.clone());
        let score = record.recency_score();
        match best.get(&key) {
            // Strictly worse candidates lose; equal-or-better replace, so a
            // tie resolves to the later record.
            Some((incumbent, _)) if score < *incumbent => {}
            _ => {
                best.insert(key, (score, position));
            }
        }
    }

    let keep: HashSet<usize> = best.into_values().map(|(_, position)| position).collect();
    let mut position = 0;
    records.retain(|_| {
        let kept = keep.contains(&position);
        position += 1;
        kept
    });
}

/// A comparable projection of one record onto the sort field.
#[derive(Debug, Clone)]
enum SortValue {
    Number(f64),
    Text(String),
}

/// Missing values yield `None` and always sort last.
fn sort_value(record: &ResultRecord, key: &str) -> Option<SortValue> {
    if key == "date" {
        if let Some(epoch) = record.date_epoch() {
            return Some(SortValue::Number(epoch));
        }
        return record
            .date_raw
            .as_ref()
            .map(|raw| SortValue::Text(raw.to_lowercase()));
    }
    let value = record.field(key)?;
    Some(match value.as_number() {
        Some(n) => SortValue::Number(n),
        None => SortValue::Text(value.display().to_lowercase()),
    })
}

fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        // Numbers sort ahead of non-numeric text.
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    }
}

/// Stable sort on the named field. Direction reverses value comparisons
/// only; missing values stay last either way.
fn sort_records(records: &mut Vec<ResultRecord>, key: &str, dir: SortDir) {
    let mut decorated: Vec<(Option<SortValue>, ResultRecord)> = records
        .drain(..)
        .map(|record| (sort_value(&record, key), record))
        .collect();

    decorated.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = compare_values(a, b);
            match dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        }
    });

    records.extend(decorated.into_iter().map(|(_, record)| record));
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchboard_core::{date, FieldValue};
    use std::path::PathBuf;

    fn record(
        code: &str,
        machine: &str,
        date_str: Option<&str>,
        mtime: Option<f64>,
        index: usize,
    ) -> ResultRecord {
        ResultRecord {
            code: code.to_string(),
            machine: machine.to_string(),
            test: "vortex".to_string(),
            commit: format!("c{index}"),
            fields: Vec::new(),
            date_raw: date_str.map(String::from),
            date: date_str.and_then(date::parse_iso_date),
            mtime_epoch: mtime,
            source_path: PathBuf::new(),
            plot_href: None,
            discovery_index: index,
        }
    }

    fn with_field(mut rec: ResultRecord, key: &str, value: Option<FieldValue>) -> ResultRecord {
        rec.fields.push((key.to_string(), value));
        rec
    }

    fn registry_sorting_by(key: Option<&str>, dir: SortDir) -> BTreeMap<String, BenchmarkDefinition> {
        let mut def = BenchmarkDefinition::minimal("vortex");
        def.sort_by = key.map(String::from);
        def.sort_dir = dir;
        let mut registry = BTreeMap::new();
        registry.insert("vortex".to_string(), def);
        registry
    }

    #[test]
    fn test_dedup_keeps_greatest_recency_score() {
        let registry = registry_sorting_by(None, SortDir::Asc);
        let records = vec![
            record("sim-a", "node-1", Some("2024-02-01T00:00:00Z"), Some(10.0), 0),
            record("sim-a", "node-1", Some("2024-01-01T00:00:00Z"), Some(99.0), 1),
        ];
        let reduced = reduce(&registry, records);
        let kept = &reduced["vortex"];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].discovery_index, 0);
    }

    #[test]
    fn test_dated_record_beats_undated_with_newer_mtime() {
        let registry = registry_sorting_by(None, SortDir::Asc);
        let records = vec![
            record("sim-a", "node-1", Some("2024-01-01T00:00:00Z"), Some(1.0), 0),
            record("sim-a", "node-1", None, Some(9_999_999_999.0), 1),
        ];
        let reduced = reduce(&registry, records);
        let kept = &reduced["vortex"];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].discovery_index, 0);
    }

    #[test]
    fn test_exact_tie_resolves_to_later_record() {
        let registry = registry_sorting_by(None, SortDir::Asc);
        let records = vec![
            record("sim-a", "node-1", Some("2024-01-01T00:00:00Z"), Some(5.0), 0),
            record("sim-a", "node-1", Some("2024-01-01T00:00:00Z"), Some(5.0), 1),
        ];
        let reduced = reduce(&registry, records);
        let kept = &reduced["vortex"];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].discovery_index, 1);
    }

    #[test]
    fn test_kept_records_preserve_discovery_order() {
        let registry = registry_sorting_by(None, SortDir::Asc);
        let records = vec![
            record("sim-b", "node-1", None, Some(1.0), 0),
            record("sim-a", "node-2", None, Some(1.0), 1),
            record("sim-a", "node-1", None, Some(1.0), 2),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"]
            .iter()
            .map(|r| r.discovery_index)
            .collect();
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn test_numeric_sort_ascending_with_missing_last() {
        let registry = registry_sorting_by(Some("score"), SortDir::Asc);
        let records = vec![
            with_field(record("a", "m", None, None, 0), "score", Some(FieldValue::Number(3.0))),
            with_field(record("b", "m", None, None, 1), "score", None),
            with_field(record("c", "m", None, None, 2), "score", Some(FieldValue::Number(1.0))),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn test_descending_sort_keeps_missing_last() {
        let registry = registry_sorting_by(Some("score"), SortDir::Desc);
        let records = vec![
            with_field(record("a", "m", None, None, 0), "score", Some(FieldValue::Number(3.0))),
            with_field(record("b", "m", None, None, 1), "score", None),
            with_field(record("c", "m", None, None, 2), "score", Some(FieldValue::Number(1.0))),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["a", "c", "b"]);
    }

    #[test]
    fn test_numeric_text_coerces_numerically() {
        let registry = registry_sorting_by(Some("score"), SortDir::Asc);
        let records = vec![
            with_field(
                record("a", "m", None, None, 0),
                "score",
                Some(FieldValue::Text("10".to_string())),
            ),
            with_field(record("b", "m", None, None, 1), "score", Some(FieldValue::Number(2.0))),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn test_lexical_sort_is_case_insensitive() {
        let registry = registry_sorting_by(Some("label"), SortDir::Asc);
        let records = vec![
            with_field(
                record("a", "m", None, None, 0),
                "label",
                Some(FieldValue::Text("Zebra".to_string())),
            ),
            with_field(
                record("b", "m", None, None, 1),
                "label",
                Some(FieldValue::Text("apple".to_string())),
            ),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn test_date_sort_uses_epoch_then_raw_string() {
        let registry = registry_sorting_by(Some("date"), SortDir::Asc);
        let records = vec![
            record("a", "m", Some("2024-03-01T00:00:00Z"), None, 0),
            record("b", "m", Some("2024-01-01T00:00:00Z"), None, 1),
            record("c", "m", None, None, 2),
        ];
        let reduced = reduce(&registry, records);
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }

    #[test]
    fn test_link_only_sort_by_means_no_initial_sort() {
        let registry = registry_sorting_by(Some("setup"), SortDir::Asc);
        let records = vec![
            with_field(
                record("a", "m", None, None, 0),
                "setup",
                Some(FieldValue::Text("https://z.example".to_string())),
            ),
            with_field(
                record("b", "m", None, None, 1),
                "setup",
                Some(FieldValue::Text("https://a.example".to_string())),
            ),
        ];
        let reduced = reduce(&registry, records);
        // Discovery order, untouched by sort_by=setup.
        let order: Vec<_> = reduced["vortex"].iter().map(|r| r.code.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
    }
}
