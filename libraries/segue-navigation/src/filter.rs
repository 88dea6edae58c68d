//! Topic filtering
//!
//! The selection is a plain set; filtering is a pure function of the
//! chapter list and that set. An empty selection means "show everything".

use crate::types::Chapter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Selected topics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFilter {
    selected: BTreeSet<String>,
}

impl TopicFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the topic if absent, remove it if present
    ///
    /// Returns true when the topic is selected afterwards.
    pub fn toggle(&mut self, topic: &str) -> bool {
        if self.selected.remove(topic) {
            false
        } else {
            self.selected.insert(topic.to_string());
            true
        }
    }

    /// Make `topic` the only selected topic
    pub fn select_only(&mut self, topic: &str) {
        self.selected.clear();
        self.selected.insert(topic.to_string());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, topic: &str) -> bool {
        self.selected.contains(topic)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Whether a chapter passes this filter
    pub fn matches(&self, chapter: &Chapter) -> bool {
        chapter_matches(chapter, &self.selected)
    }

    /// Indices of the chapters passing this filter
    pub fn apply(&self, chapters: &[Chapter]) -> Vec<usize> {
        filtered_indices(chapters, &self.selected)
    }
}

/// Membership test shared by every filtering path
pub fn chapter_matches(chapter: &Chapter, selected: &BTreeSet<String>) -> bool {
    selected.is_empty() || chapter.has_any_topic(selected)
}

/// Indices of chapters whose topics intersect `selected`, in list order
///
/// Returns every index when `selected` is empty.
pub fn filtered_indices(chapters: &[Chapter], selected: &BTreeSet<String>) -> Vec<usize> {
    chapters
        .iter()
        .enumerate()
        .filter(|(_, chapter)| chapter_matches(chapter, selected))
        .map(|(index, _)| index)
        .collect()
}

/// Chapters whose topics intersect `selected`, in list order
pub fn compute_filtered_chapters<'a>(
    chapters: &'a [Chapter],
    selected: &BTreeSet<String>,
) -> Vec<&'a Chapter> {
    chapters
        .iter()
        .filter(|chapter| chapter_matches(chapter, selected))
        .collect()
}

/// Sorted union of every chapter's topics
pub fn known_topics(chapters: &[Chapter]) -> BTreeSet<String> {
    chapters
        .iter()
        .flat_map(|chapter| chapter.topics.iter().cloned())
        .collect()
}

/// Number of chapters tagged with each topic
pub fn topic_counts(chapters: &[Chapter]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for topic in chapters.iter().flat_map(|chapter| chapter.topics.iter()) {
        *counts.entry(topic.clone()).or_insert(0) += 1;
    }
    counts
}
