//! Content source access: the headless CMS API or a local JSON export of it.

use std::fs;
use std::path::Path;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{MediaError, MediaResult};

/// Collection name used for exports that are a bare array of records.
pub const DEFAULT_EXPORT_COLLECTION: &str = "records";

/// Records read from one content collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRecords {
  /// Collection name.
  pub collection: String,
  /// Records in source order.
  pub records: Vec<Value>,
}

/// Authenticated, paginated reader for the content API.
#[derive(Debug, Clone)]
pub struct ContentClient {
  client: Client,
  api_url: String,
  token: String,
  page_size: usize,
}

impl ContentClient {
  /// Create a client for `api_url` authenticating with a bearer `token`.
  pub fn new(api_url: impl Into<String>, token: impl Into<String>, page_size: usize) -> Self {
    Self {
      client: Client::new(),
      api_url: api_url.into(),
      token: token.into(),
      page_size: page_size.max(1),
    }
  }

  /// Fetch every record of `collection`, following pages until all are read.
  ///
  /// When the response carries `meta.filter_count` (or `meta.total_count`), paging runs
  /// until that many records arrived, which survives servers capping `limit` below the
  /// configured page size. Without a count, a short page ends the collection.
  #[instrument(skip(self))]
  pub async fn fetch_collection(&self, collection: &str) -> MediaResult<CollectionRecords> {
    let mut records = Vec::new();
    let mut page = 1usize;

    loop {
      let url = self.page_url(collection, page);
      let response = self
        .client
        .get(&url)
        .bearer_auth(&self.token)
        .send()
        .await
        .map_err(|err| MediaError::remote(&url, err))?;

      let status = response.status();
      if !status.is_success() {
        return Err(MediaError::remote(&url, status));
      }

      let body: Value = response
        .json()
        .await
        .map_err(|err| MediaError::remote(&url, err))?;
      let total = reported_total(&body);
      let items = page_items(body);
      let count = items.len();
      records.extend(items);
      debug!(page, count, total, "fetched content page");

      let done = match total {
        Some(total) if count == 0 && records.len() < total => {
          warn!(
            received = records.len(),
            total, "content API ran out of pages before the reported total"
          );
          true
        }
        Some(total) => records.len() >= total,
        None => {
          if page == 1 && count > 0 && count < self.page_size {
            debug!(count, "first page was short; assuming the collection is complete");
          }
          count < self.page_size
        }
      };
      if done {
        break;
      }
      page += 1;
    }

    Ok(CollectionRecords {
      collection: collection.to_string(),
      records,
    })
  }

  /// Fetch several collections one after another.
  pub async fn fetch_collections(&self, collections: &[String]) -> MediaResult<Vec<CollectionRecords>> {
    let mut result = Vec::with_capacity(collections.len());
    for collection in collections {
      result.push(self.fetch_collection(collection).await?);
    }
    Ok(result)
  }

  fn page_url(&self, collection: &str, page: usize) -> String {
    format!(
      "{}/items/{}?limit={}&page={}&fields=*.*.*&meta=filter_count",
      self.api_url.trim_end_matches('/'),
      collection,
      self.page_size,
      page
    )
  }
}

/// Read records from a local export.
///
/// Accepts `{ "<collection>": [records] }` (each value may also be wrapped as
/// `{ "data": [...] }`) or a bare array, which is filed under
/// [`DEFAULT_EXPORT_COLLECTION`].
pub fn load_records_file(path: &Path) -> MediaResult<Vec<CollectionRecords>> {
  let content = fs::read_to_string(path).map_err(|err| MediaError::io(path, err))?;
  let value: Value = serde_json::from_str(&content).map_err(|err| MediaError::json(path, err))?;

  Ok(match value {
    Value::Object(map) => map
      .into_iter()
      .map(|(collection, records)| CollectionRecords {
        collection,
        records: page_items(records),
      })
      .collect(),
    other => vec![CollectionRecords {
      collection: DEFAULT_EXPORT_COLLECTION.to_string(),
      records: page_items(other),
    }],
  })
}

fn reported_total(body: &Value) -> Option<usize> {
  let meta = body.get("meta")?;
  ["filter_count", "total_count"]
    .iter()
    .find_map(|key| meta.get(key).and_then(Value::as_u64))
    .and_then(|total| usize::try_from(total).ok())
}

fn page_items(body: Value) -> Vec<Value> {
  match body {
    Value::Array(items) => items,
    Value::Object(mut map) => match map.remove("data") {
      Some(Value::Array(items)) => items,
      Some(record @ Value::Object(_)) => vec![record],
      _ => Vec::new(),
    },
    _ => Vec::new(),
  }
}
