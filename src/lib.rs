#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod asset_paths;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod models;
pub mod project;
pub mod reconcile;
pub mod references;
pub mod resolver;
pub mod selection;

pub use builder::MediaBuilder;
pub use config::ProjectConfig;
pub use error::{MediaError, MediaResult};
pub use manifest::{ManifestBuilder, MediaManifest};
pub use models::{FileReference, ReconciliationReport};
pub use project::{MediaBuildContext, MediaProjectLayout};
pub use resolver::{LoadFailure, MediaRef, MediaResolver, ResolvedSource, SourceCursor};
pub use selection::{ReferenceSelection, ScopeInclusion};
