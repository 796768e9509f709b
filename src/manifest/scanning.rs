//! Directory scanning utilities for harvesting mirrored media files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::asset_paths::is_os_artifact;
use crate::error::{MediaError, MediaResult};

/// A media file discovered under the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAsset {
    /// File name without any directory component.
    pub basename: String,
    /// Path relative to the asset root, using forward slashes.
    pub relative_path: String,
}

impl ScannedAsset {
    /// Subfolder portion of the relative path, if the file is nested.
    pub fn subfolder(&self) -> Option<&str> {
        self.relative_path
            .rsplit_once('/')
            .map(|(folder, _)| folder)
    }
}

/// Walk the asset root collecting every media file.
///
/// Entries are visited in name order, depth first, so repeated scans of an unchanged tree
/// return the same sequence. OS artifacts are skipped. Symlinks to files are listed under
/// the link's own name; symlinked directories are not descended into.
pub fn collect_asset_files(root: &Path) -> MediaResult<Vec<ScannedAsset>> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(MediaError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(MediaError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(err) => return Err(MediaError::io(root, err)),
    }

    let mut assets = Vec::new();
    collect_assets_recursively(root, Path::new(""), &mut assets)?;
    Ok(assets)
}

fn collect_assets_recursively(
    dir: &Path,
    relative_root: &Path,
    assets: &mut Vec<ScannedAsset>,
) -> MediaResult<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|err| MediaError::io(dir, err))?
        .flatten()
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name();
        let name_str = file_name.to_string_lossy();
        if is_os_artifact(&name_str) {
            continue;
        }

        let next_relative: PathBuf = if relative_root.as_os_str().is_empty() {
            PathBuf::from(&file_name)
        } else {
            relative_root.join(&file_name)
        };

        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            collect_assets_recursively(&entry.path(), &next_relative, assets)?;
        } else if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            assets.push(ScannedAsset {
                basename: name_str.into_owned(),
                relative_path: next_relative.to_string_lossy().replace('\\', "/"),
            });
        }
    }

    Ok(())
}
