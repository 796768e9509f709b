//! Generate the media manifest by scanning the mirrored asset tree.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::asset_paths::make_public_asset_path;
use crate::error::{MediaError, MediaResult};
use crate::manifest::scanning::collect_asset_files;
use crate::manifest::store::{ManifestBuilder, MediaManifest};
use crate::project::MediaProjectLayout;

/// Scan `asset_root` and map every file's basename to its public path.
///
/// Directory structure is flattened into basename keys, so two files sharing a name in
/// different subfolders collide and the first one visited wins. A missing asset root
/// produces an empty manifest and a warning rather than an error.
pub fn build_manifest(
  layout: &MediaProjectLayout,
  asset_root: &Path,
) -> MediaResult<MediaManifest> {
  let assets = match collect_asset_files(asset_root) {
    Ok(assets) => assets,
    Err(MediaError::DirectoryNotFound { path }) => {
      warn!(path = %path.display(), "asset root missing, producing an empty manifest");
      return Ok(MediaManifest::default());
    }
    Err(err) => return Err(err),
  };

  let mut builder = ManifestBuilder::new();
  for asset in &assets {
    let subfolder = if layout.flatten_manifest_paths {
      None
    } else {
      asset.subfolder()
    };
    let public_path = make_public_asset_path(layout, subfolder, &asset.basename);
    if !builder.insert_if_absent(asset.basename.clone(), public_path) {
      debug!(
        basename = %asset.basename,
        path = %asset.relative_path,
        "duplicate basename ignored; an earlier file already claimed it"
      );
    }
  }

  let manifest = builder.finish();
  info!(files = assets.len(), entries = manifest.len(), "scanned asset root");
  Ok(manifest)
}

/// Merge a fresh scan over the previously persisted manifest.
///
/// Rebuilds never delete: entries that disappeared from disk stay until removed by hand,
/// and scanned entries overwrite persisted ones with the same key.
pub fn rebuild_manifest(
  layout: &MediaProjectLayout,
  asset_root: &Path,
  previous: &MediaManifest,
) -> MediaResult<MediaManifest> {
  let scanned = build_manifest(layout, asset_root)?;
  let mut builder = previous.to_builder();
  builder.merge(&scanned);
  Ok(builder.finish())
}
