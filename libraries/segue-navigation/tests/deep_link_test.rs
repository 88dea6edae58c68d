//! End-to-end tests for deep links and sharing
//!
//! Covers:
//! - Link encoding and decoding
//! - Startup restoration and the readiness gate
//! - Address-bar sync on filter changes
//! - Share link building and clipboard failures

mod common;

use common::{harness, orchestra, MockClipboard};
use segue_navigation::deep_link::{decode, encode};
use segue_navigation::{
    DeepLink, LinkContext, NavigationMode, SessionEvent, ShareKind, ShareLinkBuilder, TransportEvent,
};
use std::collections::BTreeSet;

// ===== Helpers =====

fn known(topics: &[&str]) -> BTreeSet<String> {
    topics.iter().map(|topic| topic.to_string()).collect()
}

// ===== Codec =====

#[test]
fn encoded_link_decodes_to_floored_state() {
    let query = encode(Some("winds"), Some(125.7));
    assert!(query.contains("topic=winds&t=125"));

    let link = format!("https://example.com/watch/7?{}", query);
    let decoded = decode(&link, &known(&["strings", "winds"]));
    assert_eq!(
        decoded,
        DeepLink {
            topic: Some("winds".to_string()),
            timestamp: Some(125),
        }
    );
}

#[test]
fn unknown_topic_is_dropped_but_timestamp_kept() {
    let decoded = decode(
        "https://example.com/watch/7?topic=brass&t=40",
        &known(&["strings", "winds"]),
    );
    assert_eq!(decoded.topic, None);
    assert_eq!(decoded.timestamp, Some(40));
}

#[test]
fn unrelated_parameters_are_ignored() {
    let decoded = decode(
        "https://example.com/watch/7?utm_source=mail&t=8&lang=de",
        &known(&["strings"]),
    );
    assert_eq!(decoded, DeepLink::new(None, Some(8.0)));
}

#[test]
fn topics_with_reserved_characters_survive() {
    let topics = known(&["q&a", "brass & winds"]);
    for topic in &topics {
        let query = encode(Some(topic), None);
        assert_eq!(decode(&query, &topics).topic.as_deref(), Some(topic.as_str()));
    }
}

// ===== Startup restoration =====

#[test]
fn restore_topic_and_timestamp_before_metadata() {
    let mut h = harness(
        orchestra(),
        None,
        "https://example.com/watch/7?topic=winds&t=15",
    );

    let restored = h.session.restore_from_link_context();
    assert_eq!(restored.topic.as_deref(), Some("winds"));
    assert_eq!(h.session.mode(), NavigationMode::Guided);
    assert_eq!(h.session.filtered_indices(), &[1]);
    assert_eq!(h.session.pending_startup_seek(), Some(15.0));
    assert!(h.seeks().is_empty());

    let events = h.session.drain_events();
    assert!(events.contains(&SessionEvent::ModeChanged {
        mode: NavigationMode::Guided
    }));
    assert!(events.contains(&SessionEvent::DeepLinkRestored {
        topic: Some("winds".to_string()),
        timestamp: Some(15),
    }));

    h.session
        .handle_transport_event(TransportEvent::MetadataLoaded { duration: 30.0 });
    assert_eq!(h.seeks(), vec![15.0]);
    assert_eq!(h.session.active_chapter(), Some(1));
    assert!(h
        .session
        .drain_events()
        .contains(&SessionEvent::StartupSeekApplied { position: 15.0 }));

    // A second readiness report (source refresh) does not seek again
    h.session
        .handle_transport_event(TransportEvent::MetadataLoaded { duration: 30.0 });
    assert_eq!(h.seeks(), vec![15.0]);
}

#[test]
fn restore_with_metadata_already_loaded_seeks_at_once() {
    let mut h = harness(orchestra(), Some(30.0), "https://example.com/watch/7?t=22");
    h.session.restore_from_link_context();
    assert_eq!(h.seeks(), vec![22.0]);
    assert_eq!(h.session.mode(), NavigationMode::Full);
    assert_eq!(h.session.pending_startup_seek(), None);
}

#[test]
fn polling_host_flushes_startup_seek_on_tick() {
    let mut h = harness(orchestra(), None, "https://example.com/watch/7?t=12");
    h.session.restore_from_link_context();
    h.session.tick();
    assert!(h.seeks().is_empty());

    h.transport.borrow_mut().duration = Some(30.0);
    h.session.tick();
    assert_eq!(h.seeks(), vec![12.0]);
}

#[test]
fn timestamp_past_end_is_clamped() {
    let mut h = harness(orchestra(), None, "https://example.com/watch/7?t=999");
    h.session.restore_from_link_context();
    h.session
        .handle_transport_event(TransportEvent::MetadataLoaded { duration: 30.0 });
    assert_eq!(h.seeks(), vec![30.0]);
}

#[test]
fn manual_seek_before_metadata_cancels_startup_seek() {
    let mut h = harness(orchestra(), None, "https://example.com/watch/7?t=25");
    h.session.restore_from_link_context();
    h.session.seek(3.0).unwrap();
    assert_eq!(h.session.pending_startup_seek(), None);

    h.session
        .handle_transport_event(TransportEvent::MetadataLoaded { duration: 30.0 });
    assert_eq!(h.seeks(), vec![3.0]);
}

#[test]
fn restore_with_unknown_topic_keeps_full_mode() {
    let mut h = harness(
        orchestra(),
        Some(30.0),
        "https://example.com/watch/7?topic=brass&t=5",
    );
    let restored = h.session.restore_from_link_context();
    assert_eq!(restored, DeepLink::new(None, Some(5.0)));
    assert_eq!(h.session.mode(), NavigationMode::Full);
    assert!(h.session.selected_topics().is_empty());
    assert_eq!(h.seeks(), vec![5.0]);
}

#[test]
fn restored_guided_session_jumps_once_playing() {
    let mut h = harness(
        orchestra(),
        Some(30.0),
        "https://example.com/watch/7?topic=strings&t=12",
    );
    h.session.restore_from_link_context();
    assert_eq!(h.seeks(), vec![12.0]);

    h.session.play().unwrap();
    h.play_to(12.1, 100);
    assert_eq!(h.seeks(), vec![12.0, 20.0]);
}

#[test]
fn link_without_state_restores_nothing() {
    let mut h = harness(orchestra(), Some(30.0), "https://example.com/watch/7");
    assert!(h.session.restore_from_link_context().is_empty());
    assert!(!h.session.has_pending_events());
}

// ===== Address-bar sync =====

#[test]
fn filter_changes_rewrite_current_link() {
    let mut h = harness(
        orchestra(),
        Some(30.0),
        "https://example.com/watch/7?autoplay=1#notes",
    );

    h.session.select_only_topic("winds");
    assert_eq!(
        h.link.borrow().current_link(),
        "https://example.com/watch/7?autoplay=1&topic=winds"
    );

    h.session.toggle_topic("strings");
    assert_eq!(h.link.borrow().current_link(), "https://example.com/watch/7?autoplay=1");

    h.session.toggle_topic("winds");
    assert_eq!(
        h.link.borrow().current_link(),
        "https://example.com/watch/7?autoplay=1&topic=strings"
    );

    h.session.clear_topics();
    assert_eq!(h.link.borrow().current_link(), "https://example.com/watch/7?autoplay=1");
    assert_eq!(h.link.borrow().writes(), 4);
}

// ===== Sharing =====

#[test]
fn share_links_for_each_kind() {
    let mut h = harness(orchestra(), Some(120.0), "https://example.com/watch/7?autoplay=1");
    h.session.seek(61.7).unwrap();

    assert_eq!(
        h.session.share_link(&ShareKind::Moment).unwrap(),
        "https://example.com/watch/7?autoplay=1&t=61"
    );

    h.session.select_only_topic("winds");
    assert_eq!(
        h.session.share_link(&ShareKind::Moment).unwrap(),
        "https://example.com/watch/7?autoplay=1&topic=winds&t=61"
    );
    assert_eq!(
        h.session.share_link(&ShareKind::Chapter(1)).unwrap(),
        "https://example.com/watch/7?autoplay=1&t=10"
    );
    assert_eq!(
        h.session
            .share_link(&ShareKind::Topic("strings".to_string()))
            .unwrap(),
        "https://example.com/watch/7?autoplay=1&topic=strings"
    );
    assert!(h.session.share_link(&ShareKind::Chapter(7)).is_err());
}

#[test]
fn copied_link_is_reported() {
    let mut h = harness(orchestra(), Some(30.0), "https://example.com/watch/7");
    h.session.seek(20.0).unwrap();
    let mut clipboard = MockClipboard::default();

    let link = h
        .session
        .copy_share_link(&ShareKind::Moment, &mut clipboard)
        .unwrap();
    assert_eq!(link, "https://example.com/watch/7?t=20");
    assert_eq!(clipboard.copied, vec![link.clone()]);
    assert!(h
        .session
        .drain_events()
        .contains(&SessionEvent::ShareLinkCopied { link }));
}

#[test]
fn clipboard_failure_is_retryable_and_harmless() {
    let mut h = harness(orchestra(), Some(30.0), "https://example.com/watch/7");
    h.session.play().unwrap();
    h.session.drain_events();
    let mut clipboard = MockClipboard {
        deny: true,
        ..MockClipboard::default()
    };

    assert!(h
        .session
        .copy_share_link(&ShareKind::Moment, &mut clipboard)
        .is_err());
    let events = h.session.drain_events();
    let failure = events
        .iter()
        .find(|event| matches!(event, SessionEvent::ShareFailed { retryable: true, .. }))
        .unwrap();
    assert!(failure.notice().unwrap().contains("try again"));
    assert!(h.session.is_playing());
}

#[test]
fn share_builder_replaces_existing_link_params() {
    let builder =
        ShareLinkBuilder::new("https://example.com/watch/7?t=3&topic=old&lang=de").unwrap();
    assert_eq!(
        builder.build(&DeepLink::new(Some("winds"), Some(9.9))),
        "https://example.com/watch/7?lang=de&topic=winds&t=9"
    );
}
