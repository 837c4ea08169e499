//! garden CLI: create and edit photo stories, plus store maintenance. Config from env.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use garden_cli::{read_upload, Cli, Commands};
use garden_core::{
    build_service, init_tracing, open_repository, parse_id_list, GardenConfig, StoreBackend,
    StoryMetadata, StoryService, StoryUpdate,
};
use serde::Serialize;
use storage::{copy_records, PhotoUpload};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = GardenConfig::load().context("Load config from .env or environment")?;
    init_tracing(&config.log_file)?;

    let service = build_service(&config).await?;
    match cli.command {
        Commands::Create {
            date,
            weather,
            location,
            photos,
        } => {
            let uploads = read_uploads(&photos).await?;
            let story = service
                .create_story(
                    StoryMetadata {
                        date,
                        weather,
                        location,
                    },
                    uploads,
                )
                .await?;
            print_json(&story)
        }
        Commands::List => print_json(&service.list_stories().await?),
        Commands::Show { story_id } => print_json(&service.get_story(&story_id).await?),
        Commands::Photos { story_id } => print_json(&service.list_photos(&story_id).await?),
        Commands::Update {
            story_id,
            date,
            weather,
            location,
            keep,
            photos,
        } => {
            let update = StoryUpdate {
                date,
                weather,
                location,
                keep_photo_ids: parse_id_list(keep.as_deref()),
                uploads: read_uploads(&photos).await?,
            };
            print_json(&service.update_story(&story_id, update).await?)
        }
        Commands::DeletePhotos {
            story_id,
            photo_ids,
        } => {
            let ids = parse_id_list(Some(&photo_ids));
            print_json(&service.delete_photos(&story_id, &ids).await?)
        }
        Commands::AudioPath { story_id } => {
            let path = service.story_audio(&story_id).await?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::MigratePaths => {
            let migrated = service.migrate_legacy_paths().await?;
            println!("Migrated {} stories", migrated);
            Ok(())
        }
        Commands::SweepOrphans { min_age_secs } => handle_sweep(&service, min_age_secs).await,
        Commands::CopyStore { from, to } => handle_copy_store(&config, &from, &to).await,
    }
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<PhotoUpload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(read_upload(path).await?);
    }
    Ok(uploads)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_sweep(service: &StoryService, min_age_secs: u64) -> Result<()> {
    let removed = service
        .sweep_orphans(Duration::from_secs(min_age_secs))
        .await?;
    for path in &removed {
        println!("{}", path.display());
    }
    println!("Removed {} orphaned files", removed.len());
    Ok(())
}

/// Copies all records between backends; ids are preserved, so the copy is not repeatable
/// into a store that already holds them.
async fn handle_copy_store(config: &GardenConfig, from: &str, to: &str) -> Result<()> {
    let from: StoreBackend = from.parse()?;
    let to: StoreBackend = to.parse()?;
    if from == to {
        anyhow::bail!("Source and target backend are the same");
    }
    let source = open_repository(config, from).await?;
    let target = open_repository(config, to).await?;

    let copied = copy_records(source.as_ref(), target.as_ref()).await?;
    info!(copied, ?from, ?to, "Copied story records");
    println!("Copied {} stories", copied);
    Ok(())
}
