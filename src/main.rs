use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use media_mirror::cli::{Cli, Commands};
use media_mirror::fetch::{ContentClient, HttpAssets, load_records_file};
use media_mirror::{
  MediaBuildContext, MediaBuilder, MediaRef, MediaResolver, ProjectConfig, ReferenceSelection,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  // Secrets usually live in a local .env next to the site.
  let _ = dotenvy::dotenv();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let mut config = match &cli.config {
    Some(path) => ProjectConfig::from_path(path)
      .with_context(|| format!("failed to load config from {}", path.display()))?,
    None => ProjectConfig::discover(&cli.project_dir),
  };

  if let Commands::Download {
    remote_origin: Some(origin),
    ..
  } = &cli.command
  {
    config.remote_origin = origin.clone();
  }

  run(&cli, &config).await
}

async fn run(cli: &Cli, config: &ProjectConfig) -> Result<()> {
  let project_dir: &Path = &cli.project_dir;
  let builder = MediaBuilder::new(MediaBuildContext::new(config, project_dir));

  match &cli.command {
    Commands::BuildManifest => {
      let manifest = builder.build_manifest()?;
      println!("{} entries", manifest.len());
    }

    Commands::Check { records } => {
      let sources = match records {
        Some(path) => load_records_file(path)?,
        None => {
          let token = config.api_token()?;
          let client = ContentClient::new(&config.content_api_url, token, config.page_size);
          client
            .fetch_collections(&config.collections)
            .await
            .context("failed to read content records")?
        }
      };
      let selection = ReferenceSelection::load_from_path(config.selection_path(project_dir))?;
      let report = builder.check(&sources, &selection)?;
      println!("{}", serde_json::to_string_pretty(&report.summary())?);
    }

    Commands::Download { dry_run, .. } => {
      let summary = builder.download(&HttpAssets::new(), *dry_run).await?;
      println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Commands::Resolve { reference } => {
      let manifest = builder.load_manifest()?;
      let resolver = MediaResolver::new(&manifest, &config.remote_origin);
      let media = if reference.contains('/') {
        MediaRef::Url(reference)
      } else {
        MediaRef::Name(reference)
      };

      match resolver.resolve(media) {
        Some(resolved) => {
          println!("primary: {}", resolved.primary);
          if let Some(secondary) = resolved.secondary {
            println!("fallback: {secondary}");
          }
        }
        None => eprintln!("no source for {reference}; nothing would be rendered"),
      }
    }
  }

  Ok(())
}
