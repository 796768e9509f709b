//! Media manifest generation and persistence, split into focused submodules for testing.

mod generation;
mod scanning;
mod store;

pub use generation::{build_manifest, rebuild_manifest};
pub use scanning::{ScannedAsset, collect_asset_files};
pub use store::{ManifestBuilder, MediaManifest};
