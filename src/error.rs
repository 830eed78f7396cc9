use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlatPagesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error(
        "Multiple pages resolve to the path '{path}': {} and {}",
        .first.display(),
        .second.display()
    )]
    Collision {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Expected a mapping in metadata for '{path}', got {found}")]
    MetadataType { path: String, found: &'static str },

    #[error("Failed to decode metadata for '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("Metadata key '{key}' not found in page '{path}'")]
    MissingKey { path: String, key: String },

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Project not initialized. Run 'flatpages init' first.")]
    NotInitialized,

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),
}

impl FlatPagesError {
    pub(crate) fn decode(path: &str, message: impl Into<String>) -> Self {
        FlatPagesError::Decode {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlatPagesError>;
