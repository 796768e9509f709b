//! Data structures exchanged between the pipeline stages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset_paths::generate_filename_candidates;

/// Record context attached to an extracted reference for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOrigin {
  /// Content collection the record was read from.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub collection: Option<String>,
  /// Record identifier.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub record_id: Option<String>,
  /// Human readable record title.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub record_title: Option<String>,
}

/// One embedded media pointer found inside a content record.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
  /// Dot/bracket path of the file object inside the record.
  pub field_path: String,
  /// Filename or title declared by the content source.
  pub raw_name: Option<String>,
  /// Server-relative path (or absolute URL) of the asset.
  pub remote_path: Option<String>,
  /// Signed path, preferred over `remote_path` when building remote URLs.
  pub signed_path: Option<String>,
  /// The file object as it appeared in the record.
  pub raw: Value,
  /// Record the reference was found in.
  pub origin: RecordOrigin,
}

impl FileReference {
  /// Build a reference carrying only a declared name.
  pub fn named(field_path: impl Into<String>, name: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      field_path: field_path.into(),
      raw: serde_json::json!({ "name": name }),
      raw_name: Some(name),
      remote_path: None,
      signed_path: None,
      origin: RecordOrigin::default(),
    }
  }

  /// Build a reference carrying only a server path.
  pub fn at_path(field_path: impl Into<String>, path: impl Into<String>) -> Self {
    let path = path.into();
    Self {
      field_path: field_path.into(),
      raw: serde_json::json!({ "path": path }),
      raw_name: None,
      remote_path: Some(path),
      signed_path: None,
      origin: RecordOrigin::default(),
    }
  }

  /// Filename the reference resolves to, if any can be derived.
  pub fn filename(&self) -> Option<String> {
    generate_filename_candidates(
      self.raw_name.as_deref(),
      self.remote_path.as_deref(),
      self.signed_path.as_deref(),
    )
    .into_iter()
    .next()
  }

  /// Path used to fetch the asset remotely; the signed path wins when present.
  pub fn fetch_path(&self) -> Option<&str> {
    self
      .signed_path
      .as_deref()
      .or(self.remote_path.as_deref())
      .filter(|value| !value.trim().is_empty())
  }
}

/// Reference whose canonical name exists in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundEntry {
  /// Record context.
  #[serde(flatten)]
  pub origin: RecordOrigin,
  /// Location of the file object inside the record.
  pub field_path: String,
  /// Filename as derived from the reference.
  pub filename: String,
  /// Canonical filename used for the manifest lookup.
  pub normalized: String,
  /// Local public path from the manifest.
  pub local_path: String,
}

/// Reference that must be fetched from the remote origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingEntry {
  /// Record context.
  #[serde(flatten)]
  pub origin: RecordOrigin,
  /// Location of the file object inside the record.
  pub field_path: String,
  /// Filename as derived from the reference.
  pub filename: String,
  /// Canonical filename the download is stored under.
  pub normalized: String,
  /// Remote path kept verbatim for the downloader.
  #[serde(default)]
  pub remote_path: Option<String>,
}

/// Reference for which no filename could be determined.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvableEntry {
  /// Record context.
  #[serde(flatten)]
  pub origin: RecordOrigin,
  /// Location of the file object inside the record.
  pub field_path: String,
  /// Raw object for manual inspection.
  pub raw: Value,
}

/// Complete classification of a batch of references.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReconciliationReport {
  /// References available locally.
  #[serde(default)]
  pub found: Vec<FoundEntry>,
  /// References that still need to be downloaded.
  #[serde(default)]
  pub missing: Vec<MissingEntry>,
  /// References without a derivable filename.
  #[serde(default, alias = "noFilename")]
  pub unresolvable: Vec<UnresolvableEntry>,
}

/// Bucket sizes of a [`ReconciliationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
  /// Number of found references.
  pub found: usize,
  /// Number of missing references.
  pub missing: usize,
  /// Number of unresolvable references.
  pub unresolvable: usize,
}

impl ReconciliationReport {
  /// Count the entries in each bucket.
  pub fn summary(&self) -> ReportSummary {
    ReportSummary {
      found: self.found.len(),
      missing: self.missing.len(),
      unresolvable: self.unresolvable.len(),
    }
  }

  /// Total number of classified references.
  pub fn len(&self) -> usize {
    self.found.len() + self.missing.len() + self.unresolvable.len()
  }

  /// Whether the report classified nothing.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// A download that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDownload {
  /// Canonical filename that was attempted.
  pub normalized: String,
  /// URL requested, when one could be built.
  pub url: Option<String>,
  /// Failure description.
  pub reason: String,
}

/// A download that was stored, or planned during a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedDownload {
  /// Canonical filename stored.
  pub normalized: String,
  /// Subfolder chosen by the classification rules.
  pub subfolder: String,
  /// Public path registered in the manifest.
  pub public_path: String,
}

/// Outcome of a download batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
  /// Items stored (or planned) successfully.
  pub success: Vec<CompletedDownload>,
  /// Items that failed; the batch continued past each of them.
  pub failed: Vec<FailedDownload>,
}
