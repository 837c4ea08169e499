use narration::NarrationError;
use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Narration service error: {0}")]
    Narration(#[from] NarrationError),

    #[error("Story {0} not found")]
    StoryNotFound(String),

    #[error("Photo {photo_id} not found for story {story_id}")]
    PhotoNotFound { story_id: String, photo_id: String },

    /// Caller-supplied photo ids that do not belong to the story.
    #[error("Invalid photo selection: {0}")]
    InvalidSelection(String),

    #[error("At least one photo is required")]
    NoPhotos,

    #[error("Too many photos: {actual} given, at most {max} allowed")]
    TooManyPhotos { max: usize, actual: usize },

    #[error("No story text available for story {0}")]
    NoStoryText(String),

    #[error("Speech synthesis is not configured")]
    SpeechUnavailable,

    #[error("Speech synthesis failed: {0}")]
    Speech(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoryError>;
