//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "garden")]
#[command(about = "Memory garden: turn photos into short stories", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a story from one or more photos.
    Create {
        #[arg(long)]
        date: String,
        #[arg(long)]
        weather: String,
        #[arg(long)]
        location: String,
        #[arg(required = true)]
        photos: Vec<PathBuf>,
    },
    /// List all stories in insertion order.
    List,
    /// Show one story.
    Show { story_id: String },
    /// List the photos of a story.
    Photos { story_id: String },
    /// Replace metadata and photos of a story and regenerate its narrative.
    Update {
        story_id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        weather: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Photo ids to keep, as a JSON array or comma list; omitted keeps all.
        #[arg(long)]
        keep: Option<String>,
        photos: Vec<PathBuf>,
    },
    /// Remove photos from a story; clears its narrative.
    DeletePhotos {
        story_id: String,
        /// Photo ids, as a JSON array or comma list.
        #[arg(long)]
        photo_ids: String,
    },
    /// Print the cached Cantonese audio file of a story.
    AudioPath { story_id: String },
    /// Rewrite legacy photo paths to `uploads/<file>`.
    MigratePaths,
    /// Delete upload files that no story references.
    SweepOrphans {
        /// Only files at least this old are removed.
        #[arg(long, default_value = "3600")]
        min_age_secs: u64,
    },
    /// Copy every story from one backend to another (json, sqlite).
    CopyStore {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "garden", "create", "--date", "2024-05-01", "--weather", "sunny", "--location",
            "Park", "a.jpg", "b.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Create { date, photos, .. } => {
                assert_eq!(date, "2024-05-01");
                assert_eq!(photos, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_create_requires_photos() {
        let result = Cli::try_parse_from([
            "garden", "create", "--date", "d", "--weather", "w", "--location", "l",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_delete_photos_and_sweep_default() {
        let cli =
            Cli::try_parse_from(["garden", "delete-photos", "s1", "--photo-ids", "a,b"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::DeletePhotos { ref story_id, ref photo_ids } if story_id == "s1" && photo_ids == "a,b"
        ));

        let cli = Cli::try_parse_from(["garden", "sweep-orphans"]).unwrap();
        assert!(matches!(cli.command, Commands::SweepOrphans { min_age_secs: 3600 }));
    }
}
