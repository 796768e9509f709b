//! Sequential downloader closing the gaps found by a reconciliation run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::asset_paths::{make_public_asset_path, make_remote_url};
use crate::error::{MediaError, MediaResult};
use crate::fetch::classify::classify_subfolder;
use crate::manifest::ManifestBuilder;
use crate::models::{
  CompletedDownload, DownloadSummary, FailedDownload, MissingEntry, ReconciliationReport,
};
use crate::project::MediaProjectLayout;

/// Source of remote asset bytes.
#[allow(async_fn_in_trait)]
pub trait RemoteAssets {
  /// Fetch the bytes at `url` in a single attempt.
  async fn fetch(&self, url: &str) -> MediaResult<Vec<u8>>;
}

/// [`RemoteAssets`] backed by plain, unauthenticated HTTP GET requests.
#[derive(Debug, Clone, Default)]
pub struct HttpAssets {
  client: Client,
}

impl HttpAssets {
  /// Create a fetcher with a default client.
  pub fn new() -> Self {
    Self::default()
  }
}

impl RemoteAssets for HttpAssets {
  #[instrument(skip(self))]
  async fn fetch(&self, url: &str) -> MediaResult<Vec<u8>> {
    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|err| MediaError::remote(url, err))?;

    let status = response.status();
    if !status.is_success() {
      return Err(MediaError::remote(url, status));
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|err| MediaError::remote(url, err))?;
    debug!(bytes = bytes.len(), "fetched asset");
    Ok(bytes.to_vec())
  }
}

/// Where downloads are written and fetched from.
#[derive(Debug, Clone, Copy)]
pub struct DownloadTarget<'a> {
  /// Layout supplying the URL prefix and subfolder rules.
  pub layout: MediaProjectLayout<'a>,
  /// Directory downloads are written under.
  pub asset_root: &'a Path,
  /// Origin prefixed to each remote path.
  pub remote_origin: &'a str,
}

/// Download every `missing` entry of `report`, one at a time.
///
/// Each success is written to `<asset_root>/<subfolder>/<canonical>` and registered in
/// `manifest` straight away. Failures are recorded and the batch moves on; nothing is
/// retried. With `dry_run` the planned destinations are reported without fetching.
pub async fn download_missing<R: RemoteAssets>(
  report: &ReconciliationReport,
  target: &DownloadTarget<'_>,
  remote: &R,
  manifest: &mut ManifestBuilder,
  dry_run: bool,
) -> DownloadSummary {
  let mut summary = DownloadSummary::default();
  let mut attempted = BTreeSet::new();

  for entry in &report.missing {
    if !attempted.insert(entry.normalized.clone()) {
      debug!(name = %entry.normalized, "already handled in this batch");
      continue;
    }

    match download_entry(entry, target, remote, manifest, dry_run).await {
      Ok(done) => {
        info!(name = %done.normalized, path = %done.public_path, dry_run, "mirrored asset");
        summary.success.push(done);
      }
      Err(failure) => {
        warn!(name = %failure.normalized, reason = %failure.reason, "download failed");
        summary.failed.push(failure);
      }
    }
  }

  summary
}

async fn download_entry<R: RemoteAssets>(
  entry: &MissingEntry,
  target: &DownloadTarget<'_>,
  remote: &R,
  manifest: &mut ManifestBuilder,
  dry_run: bool,
) -> Result<CompletedDownload, FailedDownload> {
  let fail = |url: Option<String>, reason: String| FailedDownload {
    normalized: entry.normalized.clone(),
    url,
    reason,
  };

  if !is_safe_file_name(&entry.normalized) {
    return Err(fail(None, "filename is not a plain file name".into()));
  }

  let Some(remote_path) = entry.remote_path.as_deref().filter(|path| !path.trim().is_empty())
  else {
    return Err(fail(None, "no remote path".into()));
  };

  let url = make_remote_url(target.remote_origin, remote_path);
  let subfolder = classify_subfolder(&target.layout, &entry.normalized);
  let public_path = make_public_asset_path(&target.layout, Some(subfolder), &entry.normalized);
  let done = CompletedDownload {
    normalized: entry.normalized.clone(),
    subfolder: subfolder.to_string(),
    public_path,
  };

  if dry_run {
    return Ok(done);
  }

  let bytes = remote
    .fetch(&url)
    .await
    .map_err(|err| fail(Some(url.clone()), err.to_string()))?;

  let destination = destination_path(target.asset_root, subfolder, &entry.normalized);
  write_asset(&destination, &bytes)
    .await
    .map_err(|err| fail(Some(url.clone()), err.to_string()))?;

  manifest.register(done.normalized.clone(), done.public_path.clone());
  Ok(done)
}

fn destination_path(asset_root: &Path, subfolder: &str, file_name: &str) -> PathBuf {
  subfolder
    .split(['/', '\\'])
    .filter(|segment| !segment.is_empty())
    .fold(asset_root.to_path_buf(), |path, segment| path.join(segment))
    .join(file_name)
}

async fn write_asset(destination: &Path, bytes: &[u8]) -> MediaResult<()> {
  if let Some(parent) = destination.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|err| MediaError::io(parent, err))?;
  }
  tokio::fs::write(destination, bytes)
    .await
    .map_err(|err| MediaError::io(destination, err))
}

fn is_safe_file_name(name: &str) -> bool {
  !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::sync::Mutex;
  use tempfile::tempdir;

  use crate::config::ProjectConfig;
  use crate::models::RecordOrigin;

  #[derive(Default)]
  struct StubAssets {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
  }

  impl StubAssets {
    fn with(mut self, url: &str, body: &[u8]) -> Self {
      self.bodies.insert(url.to_string(), body.to_vec());
      self
    }

    fn requests(&self) -> Vec<String> {
      self.requests.lock().unwrap().clone()
    }
  }

  impl RemoteAssets for StubAssets {
    async fn fetch(&self, url: &str) -> MediaResult<Vec<u8>> {
      self.requests.lock().unwrap().push(url.to_string());
      self
        .bodies
        .get(url)
        .cloned()
        .ok_or_else(|| MediaError::remote(url, "404 Not Found"))
    }
  }

  fn missing(normalized: &str, remote_path: Option<&str>) -> MissingEntry {
    MissingEntry {
      origin: RecordOrigin::default(),
      field_path: "cover".into(),
      filename: normalized.into(),
      normalized: normalized.into(),
      remote_path: remote_path.map(str::to_string),
    }
  }

  #[tokio::test]
  async fn stores_successes_and_continues_past_failures() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::default();
    let target = DownloadTarget {
      layout: config.layout(),
      asset_root: dir.path(),
      remote_origin: "https://cms.example",
    };
    let report = ReconciliationReport {
      missing: vec![
        missing("broken.png", Some("/assets/broken")),
        missing("team-basel.jpg", Some("/assets/basel")),
        missing("orphan.png", None),
        missing("hero@2x.webp", Some("proj/abc/hero@2x_Q8mN.webp")),
      ],
      ..Default::default()
    };
    let remote = StubAssets::default()
      .with("https://cms.example/assets/basel", b"basel")
      .with("https://cms.example/proj/abc/hero@2x_Q8mN.webp", b"hero");
    let mut manifest = ManifestBuilder::new();

    let summary = download_missing(&report, &target, &remote, &mut manifest, false).await;

    assert_eq!(summary.success.len(), 2);
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(summary.failed[0].normalized, "broken.png");
    assert_eq!(summary.failed[1].reason, "no remote path");

    assert_eq!(
      std::fs::read(dir.path().join("teams/team-basel.jpg")).unwrap(),
      b"basel"
    );
    assert!(dir.path().join("projects/hero@2x.webp").exists());

    let manifest = manifest.finish();
    assert_eq!(manifest.get("team-basel.jpg"), Some("/media/teams/team-basel.jpg"));
    assert_eq!(manifest.get("hero@2x.webp"), Some("/media/projects/hero@2x.webp"));
    assert!(!manifest.contains("broken.png"));
  }

  #[tokio::test]
  async fn rerunning_overwrites_instead_of_duplicating() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::default();
    let target = DownloadTarget {
      layout: config.layout(),
      asset_root: dir.path(),
      remote_origin: "https://cms.example/",
    };
    let report = ReconciliationReport {
      missing: vec![
        missing("cover.jpg", Some("/assets/cover")),
        missing("cover.jpg", Some("/assets/cover")),
      ],
      ..Default::default()
    };
    let remote = StubAssets::default().with("https://cms.example/assets/cover", b"c");
    let mut manifest = ManifestBuilder::new();

    let first = download_missing(&report, &target, &remote, &mut manifest, false).await;
    let second = download_missing(&report, &target, &remote, &mut manifest, false).await;

    assert_eq!(first.success.len(), 1);
    assert_eq!(second.success, first.success);
    assert_eq!(remote.requests().len(), 2);
    let manifest = manifest.finish();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.get("cover.jpg"), Some("/media/projects/cover.jpg"));
  }

  #[tokio::test]
  async fn dry_run_plans_without_fetching() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::default();
    let target = DownloadTarget {
      layout: config.layout(),
      asset_root: dir.path(),
      remote_origin: "https://cms.example",
    };
    let report = ReconciliationReport {
      missing: vec![missing("studio-logo.svg", Some("/assets/logo"))],
      ..Default::default()
    };
    let remote = StubAssets::default();
    let mut manifest = ManifestBuilder::new();

    let summary = download_missing(&report, &target, &remote, &mut manifest, true).await;

    assert_eq!(summary.success[0].public_path, "/media/logos/studio-logo.svg");
    assert!(remote.requests().is_empty());
    assert!(!manifest.contains("studio-logo.svg"));
  }

  #[tokio::test]
  async fn rejects_names_that_escape_the_asset_root() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::default();
    let target = DownloadTarget {
      layout: config.layout(),
      asset_root: dir.path(),
      remote_origin: "https://cms.example",
    };
    let report = ReconciliationReport {
      missing: vec![missing("../evil.png", Some("/assets/evil"))],
      ..Default::default()
    };
    let remote = StubAssets::default().with("https://cms.example/assets/evil", b"x");
    let mut manifest = ManifestBuilder::new();

    let summary = download_missing(&report, &target, &remote, &mut manifest, false).await;
    assert_eq!(summary.failed.len(), 1);
    assert!(remote.requests().is_empty());
  }
}
