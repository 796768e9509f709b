//! Helpers for naming, deriving and locating media assets.
//!
//! The responsibilities are split into focused submodules so canonical naming, filename
//! derivation, filtering and public-path construction can be tested independently. The
//! same code is shared by the build-time manifest generator, the reconciler and the
//! runtime resolver.

mod candidates;
mod filters;
mod normalize;
mod public;

pub use candidates::{generate_filename_candidates, last_path_segment};
pub use filters::{is_os_artifact, is_remote_reference};
pub use normalize::{canonical_name, decode_component, normalize};
pub use public::{make_public_asset_path, make_remote_url};
