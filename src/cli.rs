//! Command-line interface for the media mirror.
//!
//! Each pipeline stage is its own subcommand so they can run independently:
//!
//! - `build-manifest` rescans the asset root
//! - `check` reconciles content records against the manifest and writes a report
//! - `download` fetches whatever the last report marked missing
//! - `resolve` shows which source a reference would render from

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mirror headless-CMS media into a static site and keep its manifest current.
#[derive(Debug, Parser)]
#[command(name = "media-mirror", version, about)]
pub struct Cli {
  /// Project directory holding `media.config.json`.
  #[arg(long, global = true, default_value = ".")]
  pub project_dir: PathBuf,

  /// Explicit configuration file (overrides discovery in the project directory).
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Pipeline stage to run.
  #[command(subcommand)]
  pub command: Commands,
}

/// Available pipeline stages.
#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Rescan the asset root and rewrite the manifest.
  BuildManifest,

  /// Reconcile content references against the manifest and write the report.
  Check {
    /// Read records from a local JSON export instead of the content API.
    #[arg(long)]
    records: Option<PathBuf>,
  },

  /// Download the assets the last report marked missing.
  Download {
    /// Print planned destinations without fetching anything.
    #[arg(long)]
    dry_run: bool,

    /// Override the configured remote origin.
    #[arg(long)]
    remote_origin: Option<String>,
  },

  /// Resolve a filename or URL against the manifest.
  Resolve {
    /// Filename, server path or absolute URL.
    reference: String,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_stage_flags() {
    let cli = Cli::parse_from(["media-mirror", "--project-dir", "site", "download", "--dry-run"]);
    assert_eq!(cli.project_dir, PathBuf::from("site"));
    assert!(matches!(
      cli.command,
      Commands::Download {
        dry_run: true,
        remote_origin: None
      }
    ));
  }

  #[test]
  fn check_accepts_a_records_export() {
    let cli = Cli::parse_from(["media-mirror", "check", "--records", "export.json"]);
    match cli.command {
      Commands::Check { records } => assert_eq!(records, Some(PathBuf::from("export.json"))),
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn verifies_command_definition() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
  }
}
