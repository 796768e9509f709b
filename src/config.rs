//! Project configuration loader describing where media lives and where it comes from.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MediaError, MediaResult};
use crate::project::MediaProjectLayout;

/// File name searched for in the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "media.config.json";

/// One substring rule mapping downloaded filenames onto an asset subfolder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubfolderRule {
  /// Lower-case substring matched against the canonical filename.
  pub contains: String,
  /// Subfolder (relative to the asset root) receiving matching files.
  pub folder: String,
}

impl SubfolderRule {
  fn new(contains: &str, folder: &str) -> Self {
    Self {
      contains: contains.into(),
      folder: folder.into(),
    }
  }
}

/// Discoverable project configuration describing filesystem layout and remote endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
  /// Directory (relative to the project) holding mirrored media.
  pub asset_root: String,
  /// Public URL prefix the asset root is served under.
  pub asset_root_url: String,
  /// Persisted manifest location.
  pub manifest_file: String,
  /// Persisted reconciliation report location.
  pub report_file: String,
  /// Optional include/exclude file restricting which collections and fields are checked.
  pub selection_file: String,
  /// Origin that serves remote assets (`remoteOrigin + remotePath`).
  pub remote_origin: String,
  /// Base URL of the headless content API.
  pub content_api_url: String,
  /// Collections fetched from the content API during a check.
  pub collections: Vec<String>,
  /// Records requested per page from the content API.
  pub page_size: usize,
  /// Environment variable holding the content API token.
  pub token_env: String,
  /// Subfolder used when no rule matches.
  pub default_subfolder: String,
  /// Ordered classification rules; the first match wins.
  pub subfolder_rules: Vec<SubfolderRule>,
  /// Map scanned files to `<url>/<basename>` instead of keeping their subfolder.
  pub flatten_manifest_paths: bool,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      asset_root: "public/media".into(),
      asset_root_url: "/media".into(),
      manifest_file: "src/data/media-manifest.json".into(),
      report_file: "media-report.json".into(),
      selection_file: "media.local.json".into(),
      remote_origin: "http://localhost:8055".into(),
      content_api_url: "http://localhost:8055".into(),
      collections: vec![
        "projects".into(),
        "skills".into(),
        "teams".into(),
        "about".into(),
      ],
      page_size: 100,
      token_env: "CONTENT_API_TOKEN".into(),
      default_subfolder: "projects".into(),
      subfolder_rules: vec![
        SubfolderRule::new("logo", "logos"),
        SubfolderRule::new("icon", "icons"),
        SubfolderRule::new("team", "teams"),
        SubfolderRule::new("skill", "skills"),
        SubfolderRule::new("portrait", "about"),
        SubfolderRule::new("timeline", "about"),
      ],
      flatten_manifest_paths: true,
    }
  }
}

impl ProjectConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or malformed file falls back to defaults so the pipeline can still run
  /// against a conventional layout.
  pub fn discover(project_dir: &Path) -> Self {
    let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
      Ok(config) => Some(config),
      Err(err) => {
        tracing::warn!(path = %path.display(), error = %err, "ignoring unparsable config");
        None
      }
    }
  }

  /// Borrow the configuration as a layout description.
  pub fn layout(&self) -> MediaProjectLayout<'_> {
    MediaProjectLayout {
      asset_root_url: &self.asset_root_url,
      default_subfolder: &self.default_subfolder,
      subfolder_rules: &self.subfolder_rules,
      flatten_manifest_paths: self.flatten_manifest_paths,
    }
  }

  /// Read the content API token from the environment.
  pub fn api_token(&self) -> MediaResult<String> {
    env::var(&self.token_env)
      .ok()
      .filter(|value| !value.trim().is_empty())
      .ok_or_else(|| MediaError::MissingCredentials {
        variable: self.token_env.clone(),
      })
  }
}

impl ProjectConfig {
  /// Absolute asset root for the given project directory.
  pub fn asset_root_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.asset_root)
  }

  /// Absolute manifest path.
  pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.manifest_file)
  }

  /// Absolute report path.
  pub fn report_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.report_file)
  }

  /// Absolute selection file path.
  pub fn selection_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.selection_file)
  }
}
