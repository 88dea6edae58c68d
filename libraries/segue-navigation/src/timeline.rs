//! Chapter timeline and active-chapter tracking
//!
//! A [`Timeline`] is the immutable, validated chapter list for one session.
//! [`ActiveChapterTracker`] turns a stream of playhead positions into
//! edge-triggered "active chapter changed" notifications.

use crate::error::{NavigatorError, Result};
use crate::types::{Chapter, ChapterIssue};
use tracing::{debug, warn};

/// Immutable chapter list with its validation outcome
///
/// A malformed list is still usable for display and active-chapter lookup;
/// it only disables guided jumping.
#[derive(Debug, Clone)]
pub struct Timeline {
    chapters: Vec<Chapter>,
    issue: Option<ChapterIssue>,
}

impl Timeline {
    /// Build a timeline, keeping malformed input and recording the problem
    pub fn new(chapters: Vec<Chapter>) -> Self {
        let issue = Self::validate(&chapters).err();
        if let Some(issue) = issue {
            warn!(%issue, chapters = chapters.len(), "chapter list malformed, guided jumps disabled");
        }
        Self { chapters, issue }
    }

    /// Build a timeline, rejecting malformed input
    pub fn try_new(chapters: Vec<Chapter>) -> Result<Self> {
        Self::validate(&chapters).map_err(NavigatorError::MalformedChapters)?;
        Ok(Self {
            chapters,
            issue: None,
        })
    }

    /// Check ranges and ordering
    ///
    /// Overlap between neighbours is allowed; lookups resolve it by list order.
    pub fn validate(chapters: &[Chapter]) -> std::result::Result<(), ChapterIssue> {
        if chapters.is_empty() {
            return Err(ChapterIssue::Empty);
        }

        for (index, chapter) in chapters.iter().enumerate() {
            let finite = chapter.start.is_finite() && chapter.end.is_finite();
            if !finite || chapter.end <= chapter.start {
                return Err(ChapterIssue::InvalidRange { index });
            }
            if index > 0 && chapter.start < chapters[index - 1].start {
                return Err(ChapterIssue::Unsorted { index });
            }
        }

        Ok(())
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Validation problem, if any
    pub fn issue(&self) -> Option<ChapterIssue> {
        self.issue
    }

    /// True when the list passed validation
    pub fn is_well_formed(&self) -> bool {
        self.issue.is_none()
    }

    /// Index of the first chapter with `start <= t < end`
    ///
    /// A position exactly on the last chapter's end (usually the media
    /// duration) has no active chapter.
    pub fn chapter_at(&self, t: f64) -> Option<usize> {
        if !t.is_finite() {
            return None;
        }
        self.chapters.iter().position(|chapter| chapter.contains(t))
    }
}

/// Change in the active chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Remembers the last active chapter and reports only changes
#[derive(Debug, Clone, Default)]
pub struct ActiveChapterTracker {
    current: Option<usize>,
}

impl ActiveChapterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported active chapter
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Resolve the chapter at `t`
    ///
    /// Returns the change when the active chapter differs from the last one.
    pub fn update(&mut self, timeline: &Timeline, t: f64) -> Option<ActiveChange> {
        let current = timeline.chapter_at(t);
        if current == self.current {
            return None;
        }

        let change = ActiveChange {
            previous: self.current,
            current,
        };
        debug!(previous = ?change.previous, current = ?change.current, position = t, "active chapter changed");
        self.current = current;
        Some(change)
    }
}
