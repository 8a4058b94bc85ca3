//! One-off merge of per-locale legacy rows into multi-locale records.
//!
//! The legacy export stores each locale of an about-page entry as its own row.
//! Rows describing the same entity are grouped by a derived key and folded
//! into one [`AboutItem`]. A group that fails to merge is logged and skipped;
//! the rest of the batch carries on.

use crate::content::{AboutItem, AboutKind, LocalizedText};
use crate::i18n::Locale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// A group that could not be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub key: String,
    pub rows: usize,
    pub error: String,
}

/// Result of a merge run: merged records in first-seen group order, plus
/// the groups that were skipped.
#[derive(Debug, Clone)]
pub struct MergeOutcome<T> {
    pub merged: Vec<T>,
    pub failures: Vec<GroupFailure>,
}

impl<T> MergeOutcome<T> {
    pub fn group_count(&self) -> usize {
        self.merged.len() + self.failures.len()
    }
}

/// Group `rows` by `key_fn` and fold each group with `merge_fn`.
///
/// Groups are visited in the order their first row appears, and rows keep
/// their input order inside a group.
pub fn merge_by_key<R, T, K, E, KF, MF>(
    rows: impl IntoIterator<Item = R>,
    key_fn: KF,
    mut merge_fn: MF,
) -> MergeOutcome<T>
where
    K: Eq + Hash + Clone + Display,
    E: Display,
    KF: Fn(&R) -> K,
    MF: FnMut(&K, Vec<R>) -> Result<T, E>,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, Vec<R>> = HashMap::new();

    for row in rows {
        let key = key_fn(&row);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(row);
    }

    let mut outcome = MergeOutcome {
        merged: Vec::with_capacity(order.len()),
        failures: Vec::new(),
    };

    for key in order {
        let group = groups.remove(&key).unwrap_or_default();
        let rows = group.len();

        match merge_fn(&key, group) {
            Ok(merged) => outcome.merged.push(merged),
            Err(e) => {
                warn!("Skipping group '{}' ({} rows): {}", key, rows, e);
                outcome.failures.push(GroupFailure {
                    key: key.to_string(),
                    rows,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Merge finished: {} merged, {} failed",
        outcome.merged.len(),
        outcome.failures.len()
    );

    outcome
}

// ==================== Legacy about rows ====================

/// One locale variant of an about item, as found in the legacy export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAboutRow {
    pub id: i64,
    pub kind: String,
    pub locale: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("empty group")]
    EmptyGroup,

    #[error("row {row_id}: unknown locale '{code}'")]
    UnknownLocale { row_id: i64, code: String },

    #[error("row {row_id}: unknown kind '{kind}'")]
    UnknownKind { row_id: i64, kind: String },

    #[error("row {row_id}: kind {found} conflicts with {expected}")]
    ConflictingKind {
        row_id: i64,
        expected: AboutKind,
        found: AboutKind,
    },
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Grouping key for a legacy row.
///
/// The basis is the first non-blank of `file_url`, `image_url`, `title`,
/// falling back to the row id, and it is scoped by kind so entries of
/// different kinds never merge.
pub fn legacy_merge_key(row: &LegacyAboutRow) -> String {
    let kind = row.kind.trim().to_ascii_lowercase();
    let basis = non_blank(&row.file_url)
        .or_else(|| non_blank(&row.image_url))
        .or_else(|| non_blank(&row.title))
        .map(str::to_string)
        .unwrap_or_else(|| format!("id:{}", row.id));

    format!("{kind}|{basis}")
}

fn parse_kind(row: &LegacyAboutRow) -> Result<AboutKind, MergeError> {
    row.kind.parse().map_err(|_| MergeError::UnknownKind {
        row_id: row.id,
        kind: row.kind.clone(),
    })
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_none() {
        *slot = non_blank(value).map(str::to_string);
    }
}

fn first_shared(current: &mut Option<String>, candidate: &Option<String>) {
    if current.is_none() {
        *current = non_blank(candidate).map(str::to_string);
    }
}

/// Fold one group of legacy rows into a multi-locale about item.
///
/// Localized fields land in the slot of each row's locale (first non-blank
/// wins); shared fields take the first non-blank value in group order.
pub fn merge_about_group(
    _key: &String,
    rows: Vec<LegacyAboutRow>,
) -> Result<AboutItem, MergeError> {
    let first = rows.first().ok_or(MergeError::EmptyGroup)?;
    let kind = parse_kind(first)?;

    let mut item = AboutItem {
        id: first.id,
        kind,
        title: LocalizedText::default(),
        description: LocalizedText::default(),
        file_url: None,
        image_url: None,
        sort_order: 0,
    };
    let mut sort_order = None;

    for row in &rows {
        let row_kind = parse_kind(row)?;
        if row_kind != kind {
            return Err(MergeError::ConflictingKind {
                row_id: row.id,
                expected: kind,
                found: row_kind,
            });
        }

        let locale = Locale::from_code(&row.locale).map_err(|_| MergeError::UnknownLocale {
            row_id: row.id,
            code: row.locale.clone(),
        })?;

        fill(item.title.slot_mut(locale), &row.title);
        fill(item.description.slot_mut(locale), &row.description);
        first_shared(&mut item.file_url, &row.file_url);
        first_shared(&mut item.image_url, &row.image_url);
        sort_order = sort_order.or(row.sort_order);
    }

    item.sort_order = sort_order.unwrap_or(0);
    Ok(item)
}

/// Merge a full legacy export with the default key and fold functions.
pub fn merge_legacy_about(rows: Vec<LegacyAboutRow>) -> MergeOutcome<AboutItem> {
    merge_by_key(rows, legacy_merge_key, merge_about_group)
}

/// Read a legacy export (a JSON array of rows).
pub fn load_export(path: &Path) -> Result<Vec<LegacyAboutRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export {}", path.display()))?;
    let rows: Vec<LegacyAboutRow> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse export {}", path.display()))?;
    Ok(rows)
}

/// Write merged items as pretty JSON.
pub fn write_merged(path: &Path, items: &[AboutItem]) -> Result<()> {
    let json = serde_json::to_string_pretty(items).context("Failed to serialize merged items")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write merged items to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(id: i64, kind: &str, locale: &str, title: Option<&str>, file_url: Option<&str>) -> LegacyAboutRow {
        LegacyAboutRow {
            id,
            kind: kind.to_string(),
            locale: locale.to_string(),
            title: title.map(str::to_string),
            description: None,
            file_url: file_url.map(str::to_string),
            image_url: None,
            sort_order: None,
        }
    }

    // ==================== merge_by_key Tests ====================

    #[test]
    fn test_merge_by_key_groups_in_first_seen_order() {
        let rows = vec![("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)];

        let outcome = merge_by_key(
            rows,
            |(key, _)| key.to_string(),
            |key, group| -> Result<(String, Vec<i32>), String> {
                Ok((key.clone(), group.into_iter().map(|(_, v)| v).collect()))
            },
        );

        assert!(outcome.failures.is_empty());
        assert_eq!(
            outcome.merged,
            vec![
                ("b".to_string(), vec![1, 3]),
                ("a".to_string(), vec![2, 5]),
                ("c".to_string(), vec![4]),
            ]
        );
    }

    #[test]
    fn test_merge_by_key_skips_failed_groups() {
        let rows = vec![1, 2, 3, 4, 5, 6];

        let outcome = merge_by_key(
            rows,
            |n| n % 3,
            |key, group| {
                if *key == 1 {
                    Err(format!("bad group {key}"))
                } else {
                    Ok(group.iter().sum::<i32>())
                }
            },
        );

        assert_eq!(outcome.merged, vec![7, 9]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].key, "1");
        assert_eq!(outcome.failures[0].rows, 2);
        assert_eq!(outcome.failures[0].error, "bad group 1");
        assert_eq!(outcome.group_count(), 3);
    }

    #[test]
    fn test_merge_by_key_empty_input() {
        let outcome = merge_by_key(
            Vec::<i32>::new(),
            |n| *n,
            |_, group| -> Result<usize, String> { Ok(group.len()) },
        );
        assert!(outcome.merged.is_empty());
        assert!(outcome.failures.is_empty());
    }

    // ==================== legacy_merge_key Tests ====================

    #[test]
    fn test_merge_key_priority() {
        let mut r = row(9, "certificate", "en", Some("ISO"), Some("x.pdf"));
        r.image_url = Some("x.png".to_string());
        assert_eq!(legacy_merge_key(&r), "certificate|x.pdf");

        r.file_url = Some("  ".to_string());
        assert_eq!(legacy_merge_key(&r), "certificate|x.png");

        r.image_url = None;
        assert_eq!(legacy_merge_key(&r), "certificate|ISO");

        r.title = Some(String::new());
        assert_eq!(legacy_merge_key(&r), "certificate|id:9");
    }

    #[test]
    fn test_merge_key_scoped_by_kind() {
        let cert = row(1, "certificate", "en", None, Some("x.pdf"));
        let license = row(2, "License", "en", None, Some("x.pdf"));
        assert_ne!(legacy_merge_key(&cert), legacy_merge_key(&license));
    }

    // ==================== merge_about_group Tests ====================

    #[test]
    fn test_merge_two_locales_sharing_file_url() {
        let rows = vec![
            row(1, "certificate", "en", Some("A"), Some("x.pdf")),
            row(2, "certificate", "ru", Some("Б"), Some("x.pdf")),
        ];

        let outcome = merge_legacy_about(rows);

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.merged.len(), 1);
        let item = &outcome.merged[0];
        assert_eq!(item.id, 1);
        assert_eq!(item.kind, AboutKind::Certificate);
        assert_eq!(item.title.en.as_deref(), Some("A"));
        assert_eq!(item.title.ru.as_deref(), Some("Б"));
        assert_eq!(item.title.kk, None);
        assert_eq!(item.file_url.as_deref(), Some("x.pdf"));
    }

    #[test]
    fn test_shared_fields_take_first_non_null() {
        let mut first = row(1, "distribution", "kk", Some("Серіктес"), None);
        first.sort_order = None;
        let mut second = row(2, "distribution", "en", Some("Partner"), None);
        second.image_url = Some("/uploads/2022/03/partner.png".to_string());
        second.sort_order = Some(4);
        let mut third = row(3, "distribution", "ru", Some("Партнёр"), None);
        third.image_url = Some("/uploads/other.png".to_string());
        third.sort_order = Some(9);

        let item = merge_about_group(&"k".to_string(), vec![first, second, third]).unwrap();

        assert_eq!(item.image_url.as_deref(), Some("/uploads/2022/03/partner.png"));
        assert_eq!(item.sort_order, 4);
        assert_eq!(item.title.kk.as_deref(), Some("Серіктес"));
    }

    #[test]
    fn test_duplicate_locale_keeps_first_value() {
        let rows = vec![
            row(1, "license", "en", Some("First"), None),
            row(2, "license", "en", Some("Second"), None),
        ];
        let item = merge_about_group(&"k".to_string(), rows).unwrap();
        assert_eq!(item.title.en.as_deref(), Some("First"));
    }

    #[test]
    fn test_unknown_locale_fails_group() {
        let rows = vec![row(5, "license", "de", Some("Lizenz"), None)];
        let err = merge_about_group(&"k".to_string(), rows).unwrap_err();
        assert_eq!(
            err,
            MergeError::UnknownLocale {
                row_id: 5,
                code: "de".to_string()
            }
        );
    }

    #[test]
    fn test_conflicting_kind_fails_group() {
        let rows = vec![
            row(1, "license", "en", Some("X"), None),
            row(2, "certificate", "ru", Some("X"), None),
        ];
        let err = merge_about_group(&"k".to_string(), rows).unwrap_err();
        assert!(matches!(err, MergeError::ConflictingKind { row_id: 2, .. }));
    }

    #[test]
    fn test_empty_group_fails() {
        let err = merge_about_group(&"k".to_string(), Vec::new()).unwrap_err();
        assert_eq!(err, MergeError::EmptyGroup);
    }

    #[test]
    fn test_batch_continues_after_bad_group() {
        let rows = vec![
            row(1, "certificate", "en", Some("A"), Some("a.pdf")),
            row(2, "certificate", "xx", Some("?"), Some("broken.pdf")),
            row(3, "certificate", "ru", Some("В"), Some("c.pdf")),
        ];

        let outcome = merge_legacy_about(rows);

        assert_eq!(outcome.merged.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].key, "certificate|broken.pdf");
    }

    // ==================== File I/O Tests ====================

    #[test]
    fn test_load_export_and_write_merged() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let export_path = temp_dir.path().join("about_export.json");
        std::fs::write(
            &export_path,
            r#"[
                {"id": 1, "kind": "certificate", "locale": "en", "title": "A", "file_url": "x.pdf"},
                {"id": 2, "kind": "certificate", "locale": "ru", "title": "Б", "file_url": "x.pdf", "sort_order": 2}
            ]"#,
        )
        .expect("Failed to write export");

        let rows = load_export(&export_path).expect("Should load export");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sort_order, Some(2));

        let outcome = merge_legacy_about(rows);
        let out_path = temp_dir.path().join("merged.json");
        write_merged(&out_path, &outcome.merged).expect("Should write merged");

        let written: Vec<AboutItem> =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].title.ru.as_deref(), Some("Б"));
        assert_eq!(written[0].sort_order, 2);
    }

    #[test]
    fn test_load_export_invalid_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_export(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse export"));
    }
}
