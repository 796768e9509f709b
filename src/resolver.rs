//! Render-time resolution of media references to usable URLs.
//!
//! The manifest is loaded once and shared read-only; each rendered instance owns its own
//! [`SourceCursor`], so fallback state is never shared between renders.

use crate::asset_paths::{generate_filename_candidates, last_path_segment, make_remote_url};
use crate::manifest::MediaManifest;
use crate::models::FileReference;

/// Anything a page may ask to render.
#[derive(Debug, Clone, Copy)]
pub enum MediaRef<'a> {
  /// A file object extracted from a content record.
  File(&'a FileReference),
  /// A bare filename.
  Name(&'a str),
  /// A remote URL or server-relative path.
  Url(&'a str),
}

/// Sources chosen for one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
  /// Source to try first.
  pub primary: String,
  /// Alternate source used after the primary fails to load.
  pub secondary: Option<String>,
}

impl ResolvedSource {
  /// Start a fallback cursor at the primary source.
  pub fn cursor(&self) -> SourceCursor {
    let mut candidates = vec![self.primary.clone()];
    candidates.extend(self.secondary.clone());
    SourceCursor {
      candidates,
      index: 0,
    }
  }
}

/// Every candidate source failed to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("media failed to load from {}", .attempted.join(", "))]
pub struct LoadFailure {
  /// Sources that were tried, in order.
  pub attempted: Vec<String>,
}

/// Ordered candidate sources with a cursor; allows a single fallback swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCursor {
  candidates: Vec<String>,
  index: usize,
}

impl SourceCursor {
  /// Source currently in use, `None` once exhausted.
  pub fn current(&self) -> Option<&str> {
    self.candidates.get(self.index).map(String::as_str)
  }

  /// Record a load failure of the current source and advance.
  ///
  /// Returns the fallback to try next, or [`LoadFailure`] once every candidate failed.
  pub fn report_failure(&mut self) -> Result<&str, LoadFailure> {
    if self.index < self.candidates.len() {
      self.index += 1;
    }
    match self.candidates.get(self.index) {
      Some(next) => Ok(next.as_str()),
      None => Err(LoadFailure {
        attempted: self.candidates.clone(),
      }),
    }
  }

  /// Whether every candidate has failed.
  pub fn is_exhausted(&self) -> bool {
    self.index >= self.candidates.len()
  }
}

/// Resolves references against a manifest snapshot, falling back to the remote origin.
#[derive(Debug, Clone, Copy)]
pub struct MediaResolver<'m> {
  manifest: &'m MediaManifest,
  remote_origin: &'m str,
}

impl<'m> MediaResolver<'m> {
  /// Resolver over a loaded manifest.
  pub fn new(manifest: &'m MediaManifest, remote_origin: &'m str) -> Self {
    Self {
      manifest,
      remote_origin,
    }
  }

  /// Pick the sources for `reference`.
  ///
  /// A local manifest hit is primary with the remote URL as fallback when the two differ.
  /// Returns `None` when nothing resolves, in which case nothing should be rendered.
  pub fn resolve(&self, reference: MediaRef<'_>) -> Option<ResolvedSource> {
    let (filename, remote) = match reference {
      MediaRef::File(file) => (
        file.filename(),
        file
          .fetch_path()
          .map(|path| make_remote_url(self.remote_origin, path)),
      ),
      MediaRef::Name(name) => (
        generate_filename_candidates(Some(name), None, None)
          .into_iter()
          .next(),
        None,
      ),
      MediaRef::Url(url) => (
        last_path_segment(url),
        Some(url)
          .filter(|value| !value.trim().is_empty())
          .map(|value| make_remote_url(self.remote_origin, value)),
      ),
    };

    let local = filename
      .as_deref()
      .and_then(|name| self.manifest.lookup(name))
      .map(str::to_string);

    match (local, remote) {
      (Some(local), Some(remote)) if local != remote => Some(ResolvedSource {
        primary: local,
        secondary: Some(remote),
      }),
      (Some(primary), _) | (None, Some(primary)) => Some(ResolvedSource {
        primary,
        secondary: None,
      }),
      (None, None) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn manifest() -> MediaManifest {
    [(
      "team-basel.jpg".to_string(),
      "/media/teams/team-basel.jpg".to_string(),
    )]
    .into_iter()
    .collect()
  }

  #[test]
  fn local_hit_with_remote_fallback() {
    let manifest = manifest();
    let resolver = MediaResolver::new(&manifest, "https://cms.example");
    let mut file = FileReference::named("logo", "team-basel_x7K2p9.jpg");
    file.remote_path = Some("/assets/abc".into());

    let resolved = resolver.resolve(MediaRef::File(&file)).unwrap();
    assert_eq!(resolved.primary, "/media/teams/team-basel.jpg");
    assert_eq!(resolved.secondary.as_deref(), Some("https://cms.example/assets/abc"));
  }

  #[test]
  fn bare_names_resolve_locally_only() {
    let manifest = manifest();
    let resolver = MediaResolver::new(&manifest, "https://cms.example");
    let resolved = resolver.resolve(MediaRef::Name("team-basel.jpg")).unwrap();
    assert_eq!(resolved.secondary, None);
    assert_eq!(resolver.resolve(MediaRef::Name("unknown.jpg")), None);
  }

  #[test]
  fn remote_only_when_not_mirrored() {
    let manifest = manifest();
    let resolver = MediaResolver::new(&manifest, "https://cms.example/");
    let resolved = resolver
      .resolve(MediaRef::Url("proj/abc/hero@2x_Q8mN.webp"))
      .unwrap();
    assert_eq!(resolved.primary, "https://cms.example/proj/abc/hero@2x_Q8mN.webp");
    assert_eq!(resolved.secondary, None);
  }

  #[test]
  fn absolute_urls_are_matched_by_their_last_segment() {
    let manifest = manifest();
    let resolver = MediaResolver::new(&manifest, "https://cms.example");
    let resolved = resolver
      .resolve(MediaRef::Url("https://cdn.example/x/team-basel_abcd.jpg"))
      .unwrap();
    assert_eq!(resolved.primary, "/media/teams/team-basel.jpg");
    assert_eq!(
      resolved.secondary.as_deref(),
      Some("https://cdn.example/x/team-basel_abcd.jpg")
    );
  }

  #[test]
  fn unresolvable_references_render_nothing() {
    let manifest = manifest();
    let resolver = MediaResolver::new(&manifest, "https://cms.example");
    let file = FileReference {
      field_path: "attachment".into(),
      raw_name: None,
      remote_path: None,
      signed_path: None,
      raw: json!({"type": "image/png"}),
      origin: Default::default(),
    };
    assert_eq!(resolver.resolve(MediaRef::File(&file)), None);
    assert_eq!(resolver.resolve(MediaRef::Url("")), None);
  }

  #[test]
  fn cursor_swaps_exactly_once() {
    let resolved = ResolvedSource {
      primary: "/media/a.jpg".into(),
      secondary: Some("https://cms.example/a".into()),
    };
    let mut cursor = resolved.cursor();
    assert_eq!(cursor.current(), Some("/media/a.jpg"));
    assert_eq!(cursor.report_failure(), Ok("https://cms.example/a"));
    assert_eq!(cursor.current(), Some("https://cms.example/a"));

    let failure = cursor.report_failure().unwrap_err();
    assert_eq!(failure.attempted.len(), 2);
    assert!(cursor.is_exhausted());
    assert!(cursor.report_failure().is_err());
  }

  #[test]
  fn cursor_without_fallback_fails_on_first_error() {
    let resolved = ResolvedSource {
      primary: "/media/a.jpg".into(),
      secondary: None,
    };
    let mut cursor = resolved.cursor();
    assert!(cursor.report_failure().is_err());
    assert_eq!(cursor.current(), None);
  }
}
