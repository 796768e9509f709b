//! Filters restricting which collections and record fields a check covers.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MediaError, MediaResult};
use crate::models::FileReference;

/// Trait describing scope filters applied while checking content.
pub trait ScopeInclusion {
  /// Returns `true` when the scope (`collection` or `collection/field.path`) is checked.
  fn is_included(&self, scope: &str) -> bool;

  /// Whether a reference found in `collection` survives the filter.
  fn includes_reference(&self, collection: &str, reference: &FileReference) -> bool {
    self.is_included(&reference_scope(collection, &reference.field_path))
  }
}

/// Include-everything filter.
impl ScopeInclusion for () {
  fn is_included(&self, _scope: &str) -> bool {
    true
  }
}

/// On-disk layout of the selection file.
#[derive(Debug, Default, Deserialize)]
struct SelectionFile {
  #[serde(default)]
  include: Vec<String>,
  #[serde(default)]
  exclude: Vec<String>,
}

/// Include/exclude rules over collections and field paths.
///
/// `projects` matches the whole collection, `projects/gallery` matches the gallery field
/// including its items (`projects/gallery[3]`) and nested fields. Exclusions win.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSelection {
  include: Option<BTreeSet<String>>,
  exclude: BTreeSet<String>,
}

impl ReferenceSelection {
  /// Load rules from the selection file, treating a missing file as "everything".
  pub fn load_from_path(path: impl AsRef<Path>) -> MediaResult<Self> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => return Err(MediaError::io(path, err)),
    };

    let file: SelectionFile =
      serde_json::from_str(&contents).map_err(|err| MediaError::json(path, err))?;
    Ok(Self::from(file))
  }

  /// Determine whether a scope should be checked.
  pub fn is_included(&self, scope: &str) -> bool {
    if self.exclude.iter().any(|rule| scope_matches(rule, scope)) {
      return false;
    }

    match &self.include {
      Some(include) => include
        .iter()
        .any(|rule| scope_matches(rule, scope) || scope_matches(scope, rule)),
      None => true,
    }
  }

  /// Returns true when no filtering rules are active.
  #[cfg(test)]
  fn is_unfiltered(&self) -> bool {
    self.include.is_none() && self.exclude.is_empty()
  }
}

impl ScopeInclusion for ReferenceSelection {
  fn is_included(&self, scope: &str) -> bool {
    ReferenceSelection::is_included(self, scope)
  }
}

impl From<SelectionFile> for ReferenceSelection {
  fn from(file: SelectionFile) -> Self {
    let include = normalise_list(file.include);
    let exclude = normalise_list(file.exclude);

    Self {
      include: (!include.is_empty()).then_some(include),
      exclude,
    }
  }
}

/// Scope string for a field inside a collection.
pub fn reference_scope(collection: &str, field_path: &str) -> String {
  format!("{collection}/{field_path}")
}

/// Convert raw rules into a sorted, de-duplicated set, dropping blanks.
fn normalise_list(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().trim_matches('/').to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

fn scope_matches(rule: &str, candidate: &str) -> bool {
  if candidate == rule {
    return true;
  }

  candidate
    .strip_prefix(rule)
    .is_some_and(|suffix| suffix.starts_with(['/', '.', '[']))
}
