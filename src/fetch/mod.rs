//! Remote access: reading content records and mirroring missing assets.

mod classify;
mod content;
mod download;

pub use classify::classify_subfolder;
pub use content::{CollectionRecords, ContentClient, DEFAULT_EXPORT_COLLECTION, load_records_file};
pub use download::{DownloadTarget, HttpAssets, RemoteAssets, download_missing};
