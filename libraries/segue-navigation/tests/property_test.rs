//! Property-based tests for chapter navigation
//!
//! Uses proptest to verify invariants across many random chapter lists.
//! Every property checks a behavioral guarantee, not a restatement of code.

mod common;

use common::MockTransport;
use proptest::prelude::*;
use segue_navigation::deep_link::{decode, encode};
use segue_navigation::filter::{chapter_matches, filtered_indices};
use segue_navigation::{
    ActiveChapterTracker, Chapter, ChapterSession, ManualClock, NavigationMode, SessionConfig,
    Timeline, TransportEvent,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

// ===== Helpers =====

const TOPICS: [&str; 3] = ["strings", "winds", "brass"];

/// Contiguous chapters from (duration, topic mask) pairs
fn build_chapters(parts: &[(f64, [bool; 3])]) -> Vec<Chapter> {
    let mut start = 0.0;
    parts
        .iter()
        .enumerate()
        .map(|(index, (duration, mask))| {
            let topics: Vec<&str> = TOPICS
                .iter()
                .zip(mask)
                .filter(|(_, on)| **on)
                .map(|(topic, _)| *topic)
                .collect();
            let end = start + duration;
            let chapter = Chapter::new(format!("Chapter {}", index + 1), start, end, topics);
            start = end;
            chapter
        })
        .collect()
}

fn arbitrary_chapters() -> impl Strategy<Value = Vec<Chapter>> {
    prop::collection::vec((2.0f64..20.0, any::<[bool; 3]>()), 1..12)
        .prop_map(|parts| build_chapters(&parts))
}

fn arbitrary_selection() -> impl Strategy<Value = BTreeSet<String>> {
    any::<[bool; 3]>().prop_map(|mask| {
        TOPICS
            .iter()
            .zip(mask)
            .filter(|(_, on)| *on)
            .map(|(topic, _)| topic.to_string())
            .collect()
    })
}

/// Outcome of simulated guided playback
struct Simulation {
    seeks: Vec<f64>,
    finished_paused: bool,
}

/// Play from 0 in guided mode, advancing 0.1s per 100ms update
fn simulate_guided(chapters: Vec<Chapter>, selection: &BTreeSet<String>) -> Simulation {
    let duration = chapters.last().map(|chapter| chapter.end).unwrap_or_default();
    let transport = Rc::new(RefCell::new(MockTransport::new(Some(duration))));
    let clock = ManualClock::new(0);
    let mut session = ChapterSession::new(
        chapters,
        Box::new(transport.clone()),
        SessionConfig::default(),
    )
    .with_clock(Box::new(clock.clone()));

    for topic in selection {
        session.toggle_topic(topic);
    }
    session.set_mode(NavigationMode::Guided);
    session.play().unwrap();

    let steps = (duration * 10.0) as usize + 20;
    for _ in 0..steps {
        if !transport.borrow().playing {
            break;
        }
        clock.advance(100);
        let position = (transport.borrow().position + 0.1).min(duration);
        transport.borrow_mut().position = position;
        session.handle_transport_event(TransportEvent::TimeUpdate { position });
        if position >= duration {
            session.handle_transport_event(TransportEvent::Ended);
            break;
        }
    }

    let seeks = transport.borrow().seeks.clone();
    let finished_paused = transport.borrow().pause_calls == 1;
    Simulation {
        seeks,
        finished_paused,
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: The active chapter is the first chapter containing t
    #[test]
    fn active_chapter_contains_position(
        chapters in arbitrary_chapters(),
        fraction in 0.0f64..1.0,
    ) {
        let end = chapters.last().unwrap().end;
        let t = end * fraction;
        let timeline = Timeline::new(chapters.clone());

        let active = timeline.chapter_at(t);
        let index = active.expect("contiguous chapters cover [0, end)");
        prop_assert!(chapters[index].start <= t && t < chapters[index].end);
        prop_assert!(chapters[..index].iter().all(|chapter| !chapter.contains(t)));

        let mut tracker = ActiveChapterTracker::new();
        tracker.update(&timeline, t);
        prop_assert_eq!(tracker.current(), active);
    }

    /// Property: Reporting the same position twice never reports a change
    #[test]
    fn tracker_changes_are_real_changes(
        chapters in arbitrary_chapters(),
        positions in prop::collection::vec(0.0f64..250.0, 1..40),
    ) {
        let timeline = Timeline::new(chapters);
        let mut tracker = ActiveChapterTracker::new();

        for t in positions {
            let before = tracker.current();
            match tracker.update(&timeline, t) {
                Some(change) => {
                    prop_assert_eq!(change.previous, before);
                    prop_assert_ne!(change.previous, change.current);
                }
                None => prop_assert_eq!(tracker.current(), before),
            }
            prop_assert!(tracker.update(&timeline, t).is_none());
        }
    }

    /// Property: Empty selection is the identity filter
    #[test]
    fn empty_selection_keeps_every_chapter(chapters in arbitrary_chapters()) {
        let indices = filtered_indices(&chapters, &BTreeSet::new());
        prop_assert_eq!(indices, (0..chapters.len()).collect::<Vec<_>>());
    }

    /// Property: Filtered chapters are exactly those sharing a selected topic
    #[test]
    fn filter_is_topic_intersection(
        chapters in arbitrary_chapters(),
        selection in arbitrary_selection(),
    ) {
        prop_assume!(!selection.is_empty());
        let indices = filtered_indices(&chapters, &selection);

        for (index, chapter) in chapters.iter().enumerate() {
            let shares_topic = chapter.topics.iter().any(|topic| selection.contains(topic));
            prop_assert_eq!(indices.contains(&index), shares_topic);
            prop_assert_eq!(chapter_matches(chapter, &selection), shares_topic);
        }
        prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Property: Growing the selection never removes chapters
    #[test]
    fn filter_is_monotonic(
        chapters in arbitrary_chapters(),
        selection in arbitrary_selection(),
        extra in prop::sample::select(TOPICS.to_vec()),
    ) {
        prop_assume!(!selection.is_empty());
        let narrow = filtered_indices(&chapters, &selection);

        let mut wider = selection.clone();
        wider.insert(extra.to_string());
        let wide = filtered_indices(&chapters, &wider);

        prop_assert!(narrow.iter().all(|index| wide.contains(index)));
    }

    /// Property: Decoding an encoded link recovers topic and floored timestamp
    #[test]
    fn link_round_trip(
        topic in "[a-z][a-z &=?#%+]{0,15}",
        timestamp in 0.0f64..1_000_000.0,
    ) {
        let known: BTreeSet<String> = [topic.clone()].into();
        let decoded = decode(&encode(Some(&topic), Some(timestamp)), &known);

        prop_assert_eq!(decoded.topic.as_deref(), Some(topic.as_str()));
        prop_assert_eq!(decoded.timestamp, Some(timestamp.floor() as u64));
    }

    /// Property: Guided playback only moves forward, only to filtered
    /// chapter starts, and ends paused in the last filtered chapter
    #[test]
    fn guided_playback_converges(
        chapters in arbitrary_chapters(),
        selection in arbitrary_selection(),
    ) {
        let filtered = filtered_indices(&chapters, &selection);
        prop_assume!(!filtered.is_empty());

        let starts: Vec<f64> = filtered.iter().map(|&index| chapters[index].start).collect();
        let simulation = simulate_guided(chapters, &selection);

        prop_assert!(
            simulation.seeks.windows(2).all(|pair| pair[0] < pair[1]),
            "guided seeks went backwards: {:?}",
            simulation.seeks
        );
        for seek in &simulation.seeks {
            prop_assert!(starts.contains(seek), "seek {} is not a filtered start", seek);
        }
        prop_assert!(simulation.seeks.len() <= filtered.len());
        prop_assert!(simulation.finished_paused, "guided session did not pause at the end");
    }
}
