//! Error taxonomy shared by every pipeline stage.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type MediaResult<T> = Result<T, MediaError>;

/// Failures raised by the media pipeline.
///
/// Per-item failures (one reference, one download) are recorded and never abort a batch;
/// only whole-run preconditions such as [`MediaError::MissingCredentials`] or
/// [`MediaError::MissingReport`] stop a run.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
  /// The asset root does not exist. Callers degrade to an empty manifest.
  #[error("asset directory not found: {}", .path.display())]
  DirectoryNotFound {
    /// Directory that was expected.
    path: PathBuf,
  },
  /// A remote request failed or returned a non-success status.
  #[error("failed to fetch {url}: {reason}")]
  RemoteFetch {
    /// URL that was requested.
    url: String,
    /// Status or transport error description.
    reason: String,
  },
  /// A required credential is not configured.
  #[error("missing credentials: set the {variable} environment variable")]
  MissingCredentials {
    /// Environment variable expected to hold the credential.
    variable: String,
  },
  /// The download stage ran before a check produced a report.
  #[error("no reconciliation report at {}; run `check` first", .path.display())]
  MissingReport {
    /// Location the report was expected at.
    path: PathBuf,
  },
  /// Filesystem failure.
  #[error("failed to access {}: {source}", .path.display())]
  Io {
    /// Path being accessed.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// JSON (de)serialisation failure for a file on disk.
  #[error("invalid JSON in {}: {source}", .path.display())]
  Json {
    /// File being parsed or written.
    path: PathBuf,
    /// Underlying serde error.
    #[source]
    source: serde_json::Error,
  },
}

impl MediaError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
    Self::Json {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn remote(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::RemoteFetch {
      url: url.into(),
      reason: reason.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_offending_input() {
    let err = MediaError::MissingCredentials {
      variable: "CONTENT_API_TOKEN".into(),
    };
    assert!(err.to_string().contains("CONTENT_API_TOKEN"));

    let err = MediaError::remote("https://cms.example/assets/a.png", "404 Not Found");
    assert_eq!(
      err.to_string(),
      "failed to fetch https://cms.example/assets/a.png: 404 Not Found"
    );
  }
}
