//! Borrowed layout and filesystem context shared by the pipeline stages.

use std::path::{Path, PathBuf};

use crate::config::{ProjectConfig, SubfolderRule};

/// Layout settings every stage needs, borrowed from a [`ProjectConfig`].
#[derive(Debug, Clone, Copy)]
pub struct MediaProjectLayout<'a> {
  /// Public URL prefix of the asset root (`/media`).
  pub asset_root_url: &'a str,
  /// Subfolder for downloads that match no rule.
  pub default_subfolder: &'a str,
  /// Ordered subfolder classification rules.
  pub subfolder_rules: &'a [SubfolderRule],
  /// Whether scanned files are mapped to `<url>/<basename>`.
  pub flatten_manifest_paths: bool,
}

/// Resolved filesystem locations for one project.
#[derive(Debug, Clone)]
pub struct MediaBuildContext<'a> {
  /// Layout derived from configuration.
  pub layout: MediaProjectLayout<'a>,
  /// Directory the configuration was discovered in.
  pub project_dir: &'a Path,
  /// Directory holding mirrored media.
  pub asset_root: PathBuf,
  /// Persisted manifest file.
  pub manifest_path: PathBuf,
  /// Persisted reconciliation report.
  pub report_path: PathBuf,
  /// Remote asset origin.
  pub remote_origin: &'a str,
}

impl<'a> MediaBuildContext<'a> {
  /// Resolve every configured path against `project_dir`.
  pub fn new(config: &'a ProjectConfig, project_dir: &'a Path) -> Self {
    Self {
      layout: config.layout(),
      project_dir,
      asset_root: config.asset_root_path(project_dir),
      manifest_path: config.manifest_path(project_dir),
      report_path: config.report_path(project_dir),
      remote_origin: &config.remote_origin,
    }
  }
}
