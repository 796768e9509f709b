//! Pipeline orchestrator: build the manifest, check content against it, close the gaps.

use tracing::{info, warn};

use crate::error::MediaResult;
use crate::fetch::{CollectionRecords, DownloadTarget, RemoteAssets, download_missing};
use crate::manifest::{MediaManifest, rebuild_manifest};
use crate::models::{DownloadSummary, ReconciliationReport};
use crate::project::MediaBuildContext;
use crate::reconcile::{load_report, persist_report, reconcile};
use crate::references::extract_record_references;
use crate::selection::ScopeInclusion;

/// High-level helper running each pipeline stage against one project.
///
/// Stages are independent: `check` needs a manifest (an absent one counts as empty) and
/// `download` needs the report persisted by a previous `check`.
pub struct MediaBuilder<'a> {
  context: MediaBuildContext<'a>,
}

impl<'a> MediaBuilder<'a> {
  /// Create a builder for the provided context.
  pub fn new(context: MediaBuildContext<'a>) -> Self {
    Self { context }
  }

  /// Load the persisted manifest, treating a missing file as empty.
  pub fn load_manifest(&self) -> MediaResult<MediaManifest> {
    MediaManifest::load_or_empty(&self.context.manifest_path)
  }

  /// Rescan the asset root, merge over the persisted manifest and write it back.
  pub fn build_manifest(&self) -> MediaResult<MediaManifest> {
    let previous = self.load_manifest()?;
    let manifest = rebuild_manifest(&self.context.layout, &self.context.asset_root, &previous)?;
    manifest.persist(&self.context.manifest_path)?;
    info!(
      entries = manifest.len(),
      path = %self.context.manifest_path.display(),
      "wrote media manifest"
    );
    Ok(manifest)
  }

  /// Extract references from `sources`, classify them and persist the report.
  ///
  /// The report is only written once every collection has been processed.
  pub fn check<S: ScopeInclusion>(
    &self,
    sources: &[CollectionRecords],
    selection: &S,
  ) -> MediaResult<ReconciliationReport> {
    let manifest = self.load_manifest()?;
    if manifest.is_empty() {
      warn!("manifest is empty; every reference will be reported missing");
    }

    let mut references = Vec::new();
    for source in sources {
      if !selection.is_included(&source.collection) {
        info!(collection = %source.collection, "collection excluded by selection");
        continue;
      }
      for record in &source.records {
        references.extend(
          extract_record_references(&source.collection, record)
            .into_iter()
            .filter(|reference| selection.includes_reference(&source.collection, reference)),
        );
      }
    }

    let report = reconcile(&references, &manifest);
    persist_report(&report, &self.context.report_path)?;

    let summary = report.summary();
    info!(
      found = summary.found,
      missing = summary.missing,
      unresolvable = summary.unresolvable,
      path = %self.context.report_path.display(),
      "wrote reconciliation report"
    );
    Ok(report)
  }

  /// Download everything the last report marked missing and persist the grown manifest.
  ///
  /// Fails early with [`crate::MediaError::MissingReport`] when no check has run.
  pub async fn download<R: RemoteAssets>(
    &self,
    remote: &R,
    dry_run: bool,
  ) -> MediaResult<DownloadSummary> {
    let report = load_report(&self.context.report_path)?;
    if report.missing.is_empty() {
      info!("nothing to download");
      return Ok(DownloadSummary::default());
    }

    let mut manifest = self.load_manifest()?.to_builder();
    let target = DownloadTarget {
      layout: self.context.layout,
      asset_root: &self.context.asset_root,
      remote_origin: self.context.remote_origin,
    };

    let summary = download_missing(&report, &target, remote, &mut manifest, dry_run).await;

    if !dry_run {
      manifest.finish().persist(&self.context.manifest_path)?;
    }
    info!(
      success = summary.success.len(),
      failed = summary.failed.len(),
      dry_run,
      "download batch finished"
    );
    Ok(summary)
  }
}
