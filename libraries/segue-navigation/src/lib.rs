//! Segue - Chaptered Video Navigation
//!
//! Platform-agnostic navigation engine for long recordings split into
//! labeled, topic-tagged chapters.
//!
//! This crate provides:
//! - Active chapter tracking (end-exclusive ranges, first match wins)
//! - Topic filtering (empty selection shows everything)
//! - Guided mode: a virtual supercut that skips non-matching chapters
//! - Deep links (`?topic=...&t=...`) with one-shot startup restoration
//! - Share links for a moment, a chapter or a topic
//! - A playback controller that is the sole writer of transport state
//!
//! # Architecture
//!
//! `segue-navigation` never touches a browser, window or media API:
//! - the media element is a [`MediaTransport`]
//! - the page address is a [`LinkContext`]
//! - the clipboard is a [`Clipboard`]
//! - time comes from a [`Clock`]
//!
//! Everything runs on the host's event loop; nothing blocks.
//!
//! # Example: Guided Playback
//!
//! ```rust
//! use segue_navigation::{
//!     Chapter, ChapterSession, ManualClock, MediaTransport, NavigationMode, Result,
//!     SessionConfig, TransportEvent,
//! };
//!
//! #[derive(Default)]
//! struct Player {
//!     position: f64,
//! }
//!
//! impl MediaTransport for Player {
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, position: f64) -> Result<()> {
//!         self.position = position;
//!         Ok(())
//!     }
//!     fn set_volume(&mut self, _volume: f64) -> Result<()> { Ok(()) }
//!     fn set_muted(&mut self, _muted: bool) -> Result<()> { Ok(()) }
//!     fn position(&self) -> f64 { self.position }
//!     fn duration(&self) -> Option<f64> { Some(30.0) }
//!     fn is_playing(&self) -> bool { true }
//! }
//!
//! let chapters = vec![
//!     Chapter::new("A", 0.0, 10.0, ["strings"]),
//!     Chapter::new("B", 10.0, 20.0, ["winds"]),
//!     Chapter::new("C", 20.0, 30.0, ["strings"]),
//! ];
//!
//! let mut session = ChapterSession::new(chapters, Box::new(Player::default()), SessionConfig::default())
//!     .with_clock(Box::new(ManualClock::new(0)));
//!
//! session.toggle_topic("strings");
//! session.set_mode(NavigationMode::Guided);
//!
//! // Playhead wanders into chapter B: the session skips to C
//! session.handle_transport_event(TransportEvent::TimeUpdate { position: 12.0 });
//! assert_eq!(session.current_time(), 20.0);
//! assert_eq!(session.active_chapter(), Some(2));
//! ```
//!
//! # Example: Deep Links
//!
//! ```rust
//! use segue_navigation::deep_link::{decode, encode};
//! use std::collections::BTreeSet;
//!
//! let query = encode(Some("winds"), Some(125.7));
//! assert_eq!(query, "topic=winds&t=125");
//!
//! let known: BTreeSet<String> = ["strings".to_string()].into();
//! let link = decode(&query, &known);
//! assert_eq!(link.topic, None); // unknown topics are dropped
//! assert_eq!(link.timestamp, Some(125));
//! ```

mod clock;
mod context;
mod controller;
pub mod deep_link;
mod error;
mod events;
pub mod filter;
mod guided;
mod session;
mod timeline;
mod transport;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{Clipboard, LinkContext, StaticLinkContext};
pub use controller::PlaybackController;
pub use deep_link::{DeepLink, ReadinessGate, ShareKind, ShareLinkBuilder};
pub use error::{NavigatorError, Result};
pub use events::SessionEvent;
pub use filter::TopicFilter;
pub use guided::{GuidedAction, GuidedNavigator, GuidedPhase};
pub use session::ChapterSession;
pub use timeline::{ActiveChange, ActiveChapterTracker, Timeline};
pub use transport::{MediaTransport, TransportEvent};
pub use types::{
    load_chapters_json, Chapter, ChapterIssue, ChapterView, NavigationMode, SessionConfig,
    TimelineState,
};
pub use volume::Volume;
