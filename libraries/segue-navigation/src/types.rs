//! Core types for chapter navigation

use crate::error::{NavigatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A labeled, topic-tagged time range within a recording
///
/// Chapters are supplied once when a session is created and never change
/// afterwards. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Display title
    pub title: String,

    /// Start time in seconds (inclusive)
    pub start: f64,

    /// End time in seconds (exclusive)
    pub end: f64,

    /// Topic tags (may be empty)
    #[serde(default)]
    pub topics: BTreeSet<String>,
}

impl Chapter {
    /// Create a chapter from a title, time range and topic list
    pub fn new<I, S>(title: impl Into<String>, start: f64, end: f64, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            start,
            end,
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Chapter length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check whether `t` falls inside `[start, end)`
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Check whether this chapter carries any of the given topics
    pub fn has_any_topic(&self, topics: &BTreeSet<String>) -> bool {
        self.topics.iter().any(|topic| topics.contains(topic))
    }
}

/// Parse a chapter list from JSON
///
/// The list is returned as-is; validation happens when it is turned into a
/// [`Timeline`](crate::Timeline).
pub fn load_chapters_json(json: &str) -> Result<Vec<Chapter>> {
    Ok(serde_json::from_str(json)?)
}

/// Why a chapter list was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterIssue {
    /// No chapters at all
    Empty,

    /// Chapter has `end <= start` or a non-finite bound
    InvalidRange { index: usize },

    /// Chapter starts before the one preceding it
    Unsorted { index: usize },
}

impl fmt::Display for ChapterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterIssue::Empty => write!(f, "chapter list is empty"),
            ChapterIssue::InvalidRange { index } => {
                write!(f, "chapter {} does not end after it starts", index)
            }
            ChapterIssue::Unsorted { index } => {
                write!(f, "chapter {} starts before the previous chapter", index)
            }
        }
    }
}

/// How the timeline is presented and whether playback is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Every chapter listed, linear playback
    #[default]
    Full,

    /// Only filtered chapters listed, non-matching ranges skipped
    Guided,

    /// Every chapter listed with matches flagged, linear playback
    Highlight,
}

impl NavigationMode {
    /// Lowercase name used by hosts and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::Full => "full",
            NavigationMode::Guided => "guided",
            NavigationMode::Highlight => "highlight",
        }
    }
}

impl std::str::FromStr for NavigationMode {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(NavigationMode::Full),
            "guided" => Ok(NavigationMode::Guided),
            "highlight" => Ok(NavigationMode::Highlight),
            other => Err(NavigatorError::InvalidMode(other.to_string())),
        }
    }
}

/// Playback snapshot owned by the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    /// Current position in seconds, within `[0, duration]` once known
    pub current_time: f64,

    /// Media duration in seconds (0 until metadata loads)
    pub duration: f64,

    /// Whether media metadata has been reported
    pub metadata_ready: bool,

    /// Whether the transport is playing
    pub is_playing: bool,

    /// Volume in `[0, 1]`
    pub volume: f64,

    /// Mute state (independent of volume)
    pub muted: bool,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            metadata_ready: false,
            is_playing: false,
            volume: 1.0,
            muted: false,
        }
    }
}

/// One row of the timeline as the UI renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterView {
    /// Index into the session chapter list
    pub index: usize,
    pub title: String,
    pub start: f64,
    pub end: f64,
    pub topics: Vec<String>,

    /// Chapter matches the current topic selection
    pub matches_filter: bool,

    /// Chapter contains the playhead
    pub is_active: bool,
}

/// Upper bound for the position-check interval
pub const MAX_TICK_INTERVAL_MS: u64 = 150;

/// Configuration for a chapter session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How far before a chapter end guided mode jumps (default: 0.3s)
    pub boundary_epsilon_secs: f64,

    /// Cooldown after a guided jump (default: 500ms)
    pub jump_cooldown_ms: u64,

    /// Position-check interval for polling hosts (default: 100ms, max 150ms)
    pub tick_interval_ms: u64,

    /// Mode before any deep link is applied (default: Full)
    pub initial_mode: NavigationMode,

    /// Initial volume in `[0, 1]` (default: 1.0)
    pub initial_volume: f64,

    /// Write the canonical topic link back to the host on filter changes (default: true)
    pub sync_link_on_filter_change: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            boundary_epsilon_secs: 0.3,
            jump_cooldown_ms: 500,
            tick_interval_ms: 100,
            initial_mode: NavigationMode::Full,
            initial_volume: 1.0,
            sync_link_on_filter_change: true,
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(NavigatorError::Config)?;
        Ok(config.sanitized())
    }

    /// Clamp fields into their valid ranges
    pub fn sanitized(mut self) -> Self {
        if !self.boundary_epsilon_secs.is_finite() || self.boundary_epsilon_secs < 0.0 {
            self.boundary_epsilon_secs = Self::default().boundary_epsilon_secs;
        }
        self.tick_interval_ms = self.tick_interval_ms.clamp(1, MAX_TICK_INTERVAL_MS);
        self.initial_volume = if self.initial_volume.is_finite() {
            self.initial_volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }
}
