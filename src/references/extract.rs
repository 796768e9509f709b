//! Walk arbitrary content records collecting embedded file references.

use serde_json::{Map, Value};

use crate::models::{FileReference, RecordOrigin};
use crate::references::shape::{FileFields, Shape, classify};

const MAX_DEPTH: usize = 16;
const TITLE_KEYS: &[&str] = &["title", "name", "slug"];

/// Collect every file reference inside `record`.
///
/// Fields are visited in declaration order and arrays in index order. Nulls and scalars
/// are skipped, so partially populated records never fail.
pub fn extract_references(record: &Value) -> Vec<FileReference> {
  let mut references = Vec::new();
  match record {
    Value::Object(map) => walk_fields(map, "", 0, &mut references),
    Value::Array(items) => walk_items(items, "", 0, &mut references),
    _ => {}
  }
  references
}

/// Collect references and stamp them with the record's collection, id and title.
pub fn extract_record_references(collection: &str, record: &Value) -> Vec<FileReference> {
  let origin = record_origin(collection, record);
  let mut references = extract_references(record);
  for reference in &mut references {
    reference.origin = origin.clone();
  }
  references
}

fn record_origin(collection: &str, record: &Value) -> RecordOrigin {
  let record_id = record.get("id").and_then(|id| match id {
    Value::String(value) => Some(value.clone()),
    Value::Number(value) => Some(value.to_string()),
    _ => None,
  });
  let record_title = TITLE_KEYS
    .iter()
    .find_map(|key| record.get(*key).and_then(Value::as_str))
    .map(str::to_string);

  RecordOrigin {
    collection: Some(collection.to_string()),
    record_id,
    record_title,
  }
}

fn walk_value(value: &Value, path: &str, depth: usize, out: &mut Vec<FileReference>) {
  if depth > MAX_DEPTH {
    tracing::debug!(path, "record nesting too deep, skipping");
    return;
  }

  match classify(value) {
    Shape::File(fields) => out.push(file_reference(path, fields, value)),
    Shape::Collection(items) => walk_items(items, path, depth, out),
    Shape::Record(map) => walk_fields(map, path, depth + 1, out),
    Shape::Scalar => {}
  }
}

fn walk_items(items: &[Value], prefix: &str, depth: usize, out: &mut Vec<FileReference>) {
  for (index, item) in items.iter().enumerate() {
    walk_value(item, &format!("{prefix}[{index}]"), depth + 1, out);
  }
}

fn walk_fields(map: &Map<String, Value>, prefix: &str, depth: usize, out: &mut Vec<FileReference>) {
  for (key, value) in map {
    let path = if prefix.is_empty() {
      key.clone()
    } else {
      format!("{prefix}.{key}")
    };
    walk_value(value, &path, depth, out);
  }
}

fn file_reference(path: &str, fields: FileFields<'_>, raw: &Value) -> FileReference {
  FileReference {
    field_path: path.to_string(),
    raw_name: fields.name.map(str::to_string),
    remote_path: fields.path.map(str::to_string),
    signed_path: fields.signed_path.map(str::to_string),
    raw: raw.clone(),
    origin: RecordOrigin::default(),
  }
}
