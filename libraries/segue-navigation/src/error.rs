//! Error types for chapter navigation

use crate::types::ChapterIssue;
use thiserror::Error;

/// Navigation errors
///
/// None of these are raised from playback event handling; the session logs
/// and absorbs them so a running playback never stops on an error.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// Chapter list failed validation
    #[error("Malformed chapter list: {0}")]
    MalformedChapters(ChapterIssue),

    /// A link could not be parsed as an absolute URL
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// Navigation mode name not recognised
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Chapter index does not exist
    #[error("Unknown chapter index: {0}")]
    UnknownChapter(usize),

    /// Media transport rejected a command
    #[error("Transport error: {0}")]
    Transport(String),

    /// Copying a share link failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[source] serde_json::Error),

    /// Chapter JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigatorError>;
