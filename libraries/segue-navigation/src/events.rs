//! Session Events
//!
//! Event-based communication for UI synchronization. Events are queued by
//! the session and drained by the host after each call:
//! - Active chapter changes (for timeline highlighting)
//! - Filter and mode changes
//! - Guided jumps and the guided terminal pause
//! - Deep-link restoration
//! - Share-link notices

use crate::types::NavigationMode;
use serde::{Deserialize, Serialize};

/// Events emitted by a chapter session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Playhead entered a different chapter (or left all chapters)
    ActiveChapterChanged {
        previous: Option<usize>,
        current: Option<usize>,
    },

    /// Topic selection changed
    FilterChanged {
        /// Selected topics, sorted
        selected: Vec<String>,
        /// Indices of chapters passing the filter
        filtered: Vec<usize>,
    },

    /// Navigation mode changed
    ModeChanged { mode: NavigationMode },

    /// Play state changed (from transport feedback or a session command)
    PlaybackStateChanged { playing: bool },

    /// Guided mode skipped ahead
    GuidedJump {
        from_chapter: usize,
        to_chapter: usize,
        target_secs: f64,
    },

    /// Guided mode reached the end of the last filtered chapter and paused
    GuidedSessionFinished { chapter: usize },

    /// Link state applied at startup
    DeepLinkRestored {
        topic: Option<String>,
        timestamp: Option<u64>,
    },

    /// Queued startup seek was executed
    StartupSeekApplied { position: f64 },

    /// Share link copied to the clipboard
    ShareLinkCopied { link: String },

    /// Share link could not be produced or copied
    ShareFailed { message: String, retryable: bool },

    /// Non-fatal error (transport command rejected, link write failed)
    Error { message: String },
}

impl SessionEvent {
    /// Short transient message for a toast, if this event warrants one
    pub fn notice(&self) -> Option<String> {
        match self {
            SessionEvent::ShareLinkCopied { .. } => Some("Link copied".to_string()),
            SessionEvent::ShareFailed { retryable: true, .. } => {
                Some("Couldn't copy link, try again".to_string())
            }
            SessionEvent::ShareFailed { message, .. } => Some(message.clone()),
            SessionEvent::GuidedSessionFinished { .. } => {
                Some("End of selected chapters".to_string())
            }
            _ => None,
        }
    }
}
