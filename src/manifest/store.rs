//! Read-only manifest snapshots and the builder used to extend them.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asset_paths::normalize;
use crate::error::{MediaError, MediaResult};

/// Immutable mapping from canonical filename to public asset path.
///
/// Keys are kept in a `BTreeMap` so the persisted JSON is sorted and reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MediaManifest {
  entries: BTreeMap<String, String>,
}

impl MediaManifest {
  /// Load a persisted manifest.
  pub fn load(path: &Path) -> MediaResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| MediaError::io(path, err))?;
    serde_json::from_str(&content).map_err(|err| MediaError::json(path, err))
  }

  /// Load a persisted manifest, treating a missing file as empty.
  pub fn load_or_empty(path: &Path) -> MediaResult<Self> {
    match Self::load(path) {
      Err(MediaError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "no manifest on disk yet");
        Ok(Self::default())
      }
      other => other,
    }
  }

  /// Write the manifest as pretty JSON with sorted keys.
  pub fn persist(&self, path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|err| MediaError::io(parent, err))?;
    }
    let mut json = self.to_json_string().map_err(|err| MediaError::json(path, err))?;
    json.push('\n');
    fs::write(path, json).map_err(|err| MediaError::io(path, err))
  }

  /// Serialise to the persisted representation.
  pub fn to_json_string(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.entries)
  }

  /// Exact-key lookup.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  /// Normalise `raw_name` and look the canonical name up.
  pub fn lookup(&self, raw_name: &str) -> Option<&str> {
    normalize(Some(raw_name)).and_then(|canonical| self.get(&canonical))
  }

  /// Whether a canonical name is registered.
  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate entries in key order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, value)| (key.as_str(), value.as_str()))
  }

  /// Start a builder seeded with this snapshot's entries.
  pub fn to_builder(&self) -> ManifestBuilder {
    ManifestBuilder {
      entries: self.entries.clone(),
    }
  }
}

/// Mutable manifest under construction. Entries are only ever added or overwritten.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
  entries: BTreeMap<String, String>,
}

impl ManifestBuilder {
  /// Empty builder.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert only if the key is absent. Returns `false` when an earlier entry won.
  pub fn insert_if_absent(&mut self, key: impl Into<String>, path: impl Into<String>) -> bool {
    use std::collections::btree_map::Entry;

    match self.entries.entry(key.into()) {
      Entry::Vacant(slot) => {
        slot.insert(path.into());
        true
      }
      Entry::Occupied(_) => false,
    }
  }

  /// Insert or overwrite an entry.
  pub fn register(&mut self, key: impl Into<String>, path: impl Into<String>) {
    self.entries.insert(key.into(), path.into());
  }

  /// Overlay every entry of `other`, overwriting shared keys.
  pub fn merge(&mut self, other: &MediaManifest) {
    for (key, value) in other.iter() {
      self.register(key, value);
    }
  }

  /// Whether a key is registered.
  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Produce an immutable snapshot.
  pub fn finish(self) -> MediaManifest {
    MediaManifest {
      entries: self.entries,
    }
  }
}

impl FromIterator<(String, String)> for MediaManifest {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn sample() -> MediaManifest {
    [
      ("zeta.png".to_string(), "/media/zeta.png".to_string()),
      ("alpha.jpg".to_string(), "/media/alpha.jpg".to_string()),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn persists_sorted_keys() {
    let json = sample().to_json_string().unwrap();
    let alpha = json.find("alpha.jpg").unwrap();
    let zeta = json.find("zeta.png").unwrap();
    assert!(alpha < zeta);
  }

  #[test]
  fn round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/manifest.json");
    sample().persist(&path).unwrap();
    assert_eq!(MediaManifest::load(&path).unwrap(), sample());
  }

  #[test]
  fn missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let manifest = MediaManifest::load_or_empty(&dir.path().join("absent.json")).unwrap();
    assert!(manifest.is_empty());
  }

  #[test]
  fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(&path, "[1, 2]").unwrap();
    assert!(matches!(
      MediaManifest::load_or_empty(&path),
      Err(MediaError::Json { .. })
    ));
  }

  #[test]
  fn lookup_normalises_first() {
    let manifest: MediaManifest = [(
      "team-basel.jpg".to_string(),
      "/media/team-basel.jpg".to_string(),
    )]
    .into_iter()
    .collect();
    assert_eq!(
      manifest.lookup("team-basel_x7K2p9.jpg"),
      Some("/media/team-basel.jpg")
    );
    assert_eq!(manifest.lookup("other.jpg"), None);
  }

  #[test]
  fn builder_keeps_first_insert_and_overwrites_on_register() {
    let mut first = ManifestBuilder::new();
    assert!(first.insert_if_absent("a.png", "/media/one/a.png"));
    assert!(!first.insert_if_absent("a.png", "/media/two/a.png"));
    assert_eq!(first.finish().get("a.png"), Some("/media/one/a.png"));

    let mut builder = ManifestBuilder::new();
    builder.register("a.png", "/media/two/a.png");
    builder.register("a.png", "/media/two/a.png");
    let manifest = builder.finish();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.get("a.png"), Some("/media/two/a.png"));
  }
}
