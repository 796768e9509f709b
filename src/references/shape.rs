//! Closed set of shape signatures used to recognise file objects in content records.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Keys that always carry a filename when they hold a non-empty string.
const FILENAME_KEYS: &[&str] = &["filename_download", "filename", "filename_disk"];
/// Label keys that only count as a filename when the value has an extension.
const LABEL_KEYS: &[&str] = &["name", "title"];
const PATH_KEYS: &[&str] = &["path"];
const SIGNED_PATH_KEYS: &[&str] = &["signedPath", "signed_path", "signedUrl", "signed_url"];
const MIME_KEYS: &[&str] = &["type", "mimeType", "mime_type"];

fn filename_like() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\.[A-Za-z0-9]{2,5}$").expect("invalid filename regex"))
}

/// File attributes recognised on an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFields<'a> {
  /// Declared filename, from a label or filename attribute.
  pub name: Option<&'a str>,
  /// Server path attribute.
  pub path: Option<&'a str>,
  /// Signed path attribute.
  pub signed_path: Option<&'a str>,
  /// Whether the object declared a MIME type.
  pub has_mime_type: bool,
}

impl FileFields<'_> {
  fn is_file(&self) -> bool {
    self.name.is_some() || self.path.is_some() || self.signed_path.is_some() || self.has_mime_type
  }
}

/// What a JSON value looks like to the reference extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
  /// An object matching one of the file signatures.
  File(FileFields<'a>),
  /// A sequence to expand with index suffixes.
  Collection(&'a [Value]),
  /// A nested record (or relation join record) to recurse into.
  Record(&'a Map<String, Value>),
  /// Anything else: strings, numbers, booleans, null.
  Scalar,
}

/// Classify a value against the file signatures.
pub fn classify(value: &Value) -> Shape<'_> {
  match value {
    Value::Array(items) => Shape::Collection(items),
    Value::Object(map) => {
      let fields = file_fields(map);
      if fields.is_file() {
        Shape::File(fields)
      } else {
        Shape::Record(map)
      }
    }
    _ => Shape::Scalar,
  }
}

/// Pull the file-identifying fields out of an object.
///
/// A `name` or `title` only counts as the file name when its value looks like a filename
/// with an extension (`cover.jpg`). Otherwise the explicit `filename*` keys are used, so a
/// related record titled "Basel" is never mistaken for a file called `Basel`.
fn file_fields(map: &Map<String, Value>) -> FileFields<'_> {
  let label = LABEL_KEYS
    .iter()
    .filter_map(|key| non_empty_str(map, key))
    .find(|value| filename_like().is_match(value));
  let filename = FILENAME_KEYS.iter().find_map(|key| non_empty_str(map, key));

  FileFields {
    name: label.or(filename),
    path: PATH_KEYS.iter().find_map(|key| non_empty_str(map, key)),
    signed_path: SIGNED_PATH_KEYS.iter().find_map(|key| non_empty_str(map, key)),
    has_mime_type: MIME_KEYS
      .iter()
      .filter_map(|key| non_empty_str(map, key))
      .any(|value| value.contains('/')),
  }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  map
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|value| !value.is_empty())
}
