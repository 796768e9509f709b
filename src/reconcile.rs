//! Classify extracted references against the manifest.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::asset_paths::normalize;
use crate::error::{MediaError, MediaResult};
use crate::manifest::MediaManifest;
use crate::models::{
  FileReference, FoundEntry, MissingEntry, ReconciliationReport, UnresolvableEntry,
};

/// Classify every reference as found, missing or unresolvable.
///
/// Each input lands in exactly one bucket and bucket order follows input order, so the
/// same references and manifest always produce the same report.
pub fn reconcile(references: &[FileReference], manifest: &MediaManifest) -> ReconciliationReport {
  let mut report = ReconciliationReport::default();

  for reference in references {
    let derived = reference
      .filename()
      .and_then(|filename| normalize(Some(&filename)).map(|canonical| (filename, canonical)));

    let Some((filename, normalized)) = derived else {
      report.unresolvable.push(UnresolvableEntry {
        origin: reference.origin.clone(),
        field_path: reference.field_path.clone(),
        raw: reference.raw.clone(),
      });
      continue;
    };

    match manifest.get(&normalized) {
      Some(local_path) => report.found.push(FoundEntry {
        origin: reference.origin.clone(),
        field_path: reference.field_path.clone(),
        filename,
        local_path: local_path.to_string(),
        normalized,
      }),
      None => report.missing.push(MissingEntry {
        origin: reference.origin.clone(),
        field_path: reference.field_path.clone(),
        filename,
        normalized,
        remote_path: reference.fetch_path().map(str::to_string),
      }),
    }
  }

  report
}

/// Write a report as pretty JSON.
pub fn persist_report(report: &ReconciliationReport, path: &Path) -> MediaResult<()> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|err| MediaError::io(parent, err))?;
  }
  let json = serde_json::to_string_pretty(report).map_err(|err| MediaError::json(path, err))?;
  fs::write(path, json + "\n").map_err(|err| MediaError::io(path, err))
}

/// Load a report written by a previous check run.
///
/// A missing file is the [`MediaError::MissingReport`] precondition failure.
pub fn load_report(path: &Path) -> MediaResult<ReconciliationReport> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => {
      return Err(MediaError::MissingReport {
        path: path.to_path_buf(),
      });
    }
    Err(err) => return Err(MediaError::io(path, err)),
  };
  serde_json::from_str(&content).map_err(|err| MediaError::json(path, err))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  fn manifest() -> MediaManifest {
    [(
      "team-basel.jpg".to_string(),
      "/media/team-basel.jpg".to_string(),
    )]
    .into_iter()
    .collect()
  }

  fn nameless(field_path: &str) -> FileReference {
    FileReference {
      field_path: field_path.into(),
      raw_name: None,
      remote_path: None,
      signed_path: None,
      raw: json!({"id": "f00", "type": "image/png"}),
      origin: Default::default(),
    }
  }

  #[test]
  fn hashed_name_resolves_to_manifest_entry() {
    let references = vec![FileReference::named("logo", "team-basel_x7K2p9.jpg")];
    let report = reconcile(&references, &manifest());
    assert_eq!(report.found.len(), 1);
    assert_eq!(report.found[0].normalized, "team-basel.jpg");
    assert_eq!(report.found[0].local_path, "/media/team-basel.jpg");
  }

  #[test]
  fn path_only_reference_is_missing_with_verbatim_path() {
    let references = vec![FileReference::at_path("hero", "proj/abc/hero@2x_Q8mN.webp")];
    let report = reconcile(&references, &manifest());
    assert_eq!(report.missing.len(), 1);
    let entry = &report.missing[0];
    assert_eq!(entry.filename, "hero@2x_Q8mN.webp");
    assert_eq!(entry.normalized, "hero@2x.webp");
    assert_eq!(entry.remote_path.as_deref(), Some("proj/abc/hero@2x_Q8mN.webp"));
  }

  #[test]
  fn nameless_reference_is_unresolvable_with_raw_object() {
    let report = reconcile(&[nameless("attachment")], &manifest());
    assert_eq!(report.unresolvable.len(), 1);
    assert_eq!(report.unresolvable[0].raw["id"], "f00");
  }

  #[test]
  fn buckets_partition_the_input() {
    let references = vec![
      FileReference::named("a", "team-basel.jpg"),
      FileReference::named("b", "other.png"),
      nameless("c"),
      FileReference::at_path("d", "/assets/team-basel_abcd.jpg?download"),
      FileReference::at_path("e", "/"),
    ];
    let report = reconcile(&references, &manifest());
    assert_eq!(report.len(), references.len());

    let mut seen: Vec<&str> = report
      .found
      .iter()
      .map(|e| e.field_path.as_str())
      .chain(report.missing.iter().map(|e| e.field_path.as_str()))
      .chain(report.unresolvable.iter().map(|e| e.field_path.as_str()))
      .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(report.summary().found, 2);
  }

  #[test]
  fn identical_inputs_give_identical_reports() {
    let references = vec![
      FileReference::named("a", "team-basel_x7K2p9.jpg"),
      FileReference::at_path("b", "proj/abc/hero@2x_Q8mN.webp"),
      nameless("c"),
    ];
    let first = serde_json::to_string(&reconcile(&references, &manifest())).unwrap();
    let second = serde_json::to_string(&reconcile(&references, &manifest())).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn missing_report_is_a_precondition_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    assert!(matches!(load_report(&path), Err(MediaError::MissingReport { .. })));

    let report = reconcile(&[FileReference::named("a", "x.png")], &manifest());
    persist_report(&report, &path).unwrap();
    assert_eq!(load_report(&path).unwrap(), report);
  }
}
