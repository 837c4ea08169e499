//! # garden-core
//!
//! Request orchestration for the memory garden: [`StoryService`] ties photo storage, the
//! story repository and the narrator together. Also hosts env-driven [`GardenConfig`],
//! the component factory, tracing initialization and the Cantonese [`AudioCache`].

pub mod audio;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod selection;
pub mod service;
pub mod staging;

pub use audio::{AudioCache, SpeechSynthesizer};
pub use components::{build_narrator, build_repository, build_service, open_repository};
pub use config::{GardenConfig, NarratorKind, StoreBackend};
pub use error::{Result, StoryError};
pub use logger::init_tracing;
pub use selection::parse_id_list;
pub use service::{StoryMetadata, StoryService, StoryUpdate};
pub use staging::StagedPhotos;
