//! Chapter session - core orchestration
//!
//! Coordinates the timeline, topic filter, guided navigator, deep-link
//! restoration and the playback controller. The host drives a session from
//! a single event loop:
//! - forward transport notifications with [`ChapterSession::handle_transport_event`]
//!   and/or call [`ChapterSession::tick`] every [`ChapterSession::tick_interval`]
//! - forward user intents (topic toggles, mode, seeks, share requests)
//! - drain [`SessionEvent`]s after each call

use crate::{
    clock::{Clock, SystemClock},
    context::{Clipboard, LinkContext},
    controller::PlaybackController,
    deep_link::{self, DeepLink, ReadinessGate, ShareKind, ShareLinkBuilder},
    error::{NavigatorError, Result},
    events::SessionEvent,
    filter::{self, TopicFilter},
    guided::{GuidedAction, GuidedNavigator, GuidedPhase},
    timeline::{ActiveChapterTracker, Timeline},
    transport::{MediaTransport, TransportEvent},
    types::{Chapter, ChapterView, NavigationMode, SessionConfig, TimelineState},
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// "Previous chapter" restarts the current chapter when further in than this
const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// Interactive navigation over one chaptered recording
///
/// Owns:
/// - the validated chapter timeline (immutable)
/// - topic selection and the derived filtered set
/// - navigation mode and the guided-jump state machine
/// - the playback controller (sole writer of transport state)
/// - the one-shot startup seek gate
pub struct ChapterSession {
    config: SessionConfig,

    // Chapters
    timeline: Timeline,
    known_topics: BTreeSet<String>,

    // Filtering
    filter: TopicFilter,
    filtered: Vec<usize>,
    mode: NavigationMode,

    // Playback
    controller: PlaybackController,
    tracker: ActiveChapterTracker,
    navigator: GuidedNavigator,
    was_playing: bool,

    // Deep links
    startup: ReadinessGate,
    link_restored: bool,
    link_context: Option<Box<dyn LinkContext>>,

    clock: Box<dyn Clock>,

    // Event queue for UI synchronization
    pending_events: Vec<SessionEvent>,

    shut_down: bool,
}

impl std::fmt::Debug for ChapterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChapterSession")
            .field("mode", &self.mode)
            .field("selected", self.filter.selected())
            .field("active", &self.tracker.current())
            .field("phase", &self.navigator.phase())
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl ChapterSession {
    /// Create a session over `chapters`, driving `transport`
    ///
    /// A malformed chapter list does not fail construction; it disables
    /// guided jumps and is reported by [`Timeline::issue`].
    pub fn new(
        chapters: Vec<Chapter>,
        transport: Box<dyn MediaTransport>,
        config: SessionConfig,
    ) -> Self {
        let config = config.sanitized();
        let timeline = Timeline::new(chapters);
        let known_topics = filter::known_topics(timeline.chapters());
        let filtered = filter::filtered_indices(timeline.chapters(), &BTreeSet::new());
        let navigator = GuidedNavigator::new(
            config.boundary_epsilon_secs,
            config.jump_cooldown_ms,
            timeline.is_well_formed(),
        );
        let controller = PlaybackController::new(transport, config.initial_volume);
        let was_playing = controller.is_playing();

        debug!(
            chapters = timeline.len(),
            topics = known_topics.len(),
            mode = config.initial_mode.as_str(),
            "chapter session created"
        );

        let mut session = Self {
            mode: config.initial_mode,
            config,
            timeline,
            known_topics,
            filter: TopicFilter::new(),
            filtered,
            controller,
            tracker: ActiveChapterTracker::new(),
            navigator,
            was_playing,
            startup: ReadinessGate::default(),
            link_restored: false,
            link_context: None,
            clock: default_clock(),
            pending_events: Vec::new(),
            shut_down: false,
        };
        if session.was_playing && session.mode == NavigationMode::Guided {
            session.navigator.on_playing();
        }
        session
    }

    /// Replace the clock (tests, WASM hosts)
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach the host's link adapter
    pub fn with_link_context(mut self, context: Box<dyn LinkContext>) -> Self {
        self.set_link_context(context);
        self
    }

    /// Attach or replace the host's link adapter in place
    pub fn set_link_context(&mut self, context: Box<dyn LinkContext>) {
        self.link_context = Some(context);
    }

    // ===== Startup restoration =====

    /// Read the attached link context once and apply its deep-link state
    pub fn restore_from_link_context(&mut self) -> DeepLink {
        let link = match &self.link_context {
            Some(context) => context.current_link(),
            None => {
                debug!("no link context attached, nothing to restore");
                return DeepLink::default();
            }
        };
        self.restore_from_link(&link)
    }

    /// Apply deep-link state from `link`
    ///
    /// Only the first call has any effect. A topic becomes the sole filter
    /// and forces guided mode; a timestamp is queued until the transport
    /// reports metadata.
    pub fn restore_from_link(&mut self, link: &str) -> DeepLink {
        if self.shut_down || self.link_restored {
            return DeepLink::default();
        }
        self.link_restored = true;

        let restored = deep_link::decode(link, &self.known_topics);
        if restored.is_empty() {
            return restored;
        }

        info!(topic = ?restored.topic, timestamp = ?restored.timestamp, "restoring deep link");

        if let Some(topic) = &restored.topic {
            self.filter.select_only(topic);
            self.refilter();
            self.set_mode(NavigationMode::Guided);
        }

        if let Some(timestamp) = restored.timestamp {
            self.startup = ReadinessGate::new(Some(timestamp as f64));
        }

        self.emit(SessionEvent::DeepLinkRestored {
            topic: restored.topic.clone(),
            timestamp: restored.timestamp,
        });

        self.flush_startup_seek();
        restored
    }

    /// Startup seek still waiting for media readiness
    pub fn pending_startup_seek(&self) -> Option<f64> {
        self.startup.pending()
    }

    fn flush_startup_seek(&mut self) {
        let Some(position) = self.startup.flush(self.controller.is_ready()) else {
            return;
        };

        match self.controller.seek(position) {
            Ok(position) => {
                info!(position, "applied startup seek");
                self.navigator.on_manual_seek();
                self.emit(SessionEvent::StartupSeekApplied { position });
                self.update_active_chapter();
            }
            Err(e) => self.report_error("startup seek", e),
        }
    }

    // ===== Transport feedback =====

    /// Apply a notification pushed by the media element
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.shut_down {
            return;
        }

        self.controller.handle_event(&event);
        self.reconcile_play_state();

        match event {
            TransportEvent::MetadataLoaded { .. } => {
                self.flush_startup_seek();
                self.on_time_advance();
            }
            TransportEvent::TimeUpdate { .. } => self.on_time_advance(),
            TransportEvent::Ended => self.update_active_chapter(),
            TransportEvent::Playing
            | TransportEvent::Paused
            | TransportEvent::VolumeChanged { .. } => {}
        }
    }

    /// Poll the transport (for hosts without push notifications)
    ///
    /// Call every [`tick_interval`](Self::tick_interval).
    pub fn tick(&mut self) {
        if self.shut_down {
            return;
        }

        self.controller.sync();
        self.reconcile_play_state();
        self.flush_startup_seek();
        self.on_time_advance();
    }

    /// Position-check interval for polling hosts
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }

    fn reconcile_play_state(&mut self) {
        let playing = self.controller.is_playing();
        if playing == self.was_playing {
            return;
        }
        self.was_playing = playing;

        if playing {
            if self.mode == NavigationMode::Guided {
                self.navigator.on_playing();
            }
        } else {
            self.navigator.on_paused();
        }
        self.emit(SessionEvent::PlaybackStateChanged { playing });
    }

    fn on_time_advance(&mut self) {
        let now_ms = self.clock.now_ms();

        // Reports arriving mid-cooldown can still carry the pre-jump position
        if !self.navigator.is_cooling_down(now_ms) {
            self.update_active_chapter();
        }

        if self.mode != NavigationMode::Guided {
            return;
        }

        let action = self.navigator.evaluate(
            now_ms,
            self.controller.current_time(),
            &self.timeline,
            &self.filtered,
        );
        self.execute(action);
    }

    fn execute(&mut self, action: GuidedAction) {
        match action {
            GuidedAction::None => {}
            GuidedAction::Seek { from, to, target } => match self.controller.seek(target) {
                Ok(target) => {
                    self.emit(SessionEvent::GuidedJump {
                        from_chapter: from,
                        to_chapter: to,
                        target_secs: target,
                    });
                    self.update_active_chapter();
                }
                Err(e) => {
                    self.navigator.abort_jump();
                    self.report_error("guided jump", e);
                }
            },
            GuidedAction::Pause { chapter } => {
                if let Err(e) = self.controller.pause() {
                    self.report_error("guided pause", e);
                }
                self.emit(SessionEvent::GuidedSessionFinished { chapter });
                self.reconcile_play_state();
            }
        }
    }

    fn update_active_chapter(&mut self) {
        if let Some(change) = self
            .tracker
            .update(&self.timeline, self.controller.current_time())
        {
            self.emit(SessionEvent::ActiveChapterChanged {
                previous: change.previous,
                current: change.current,
            });
        }
    }

    // ===== Playback control =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        self.controller.play()?;
        self.reconcile_play_state();
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        self.controller.pause()?;
        self.reconcile_play_state();
        Ok(())
    }

    /// User seek to `position` seconds
    ///
    /// Takes precedence over any in-flight guided jump and over a startup
    /// seek that has not been applied yet.
    pub fn seek(&mut self, position: f64) -> Result<f64> {
        self.before_manual_seek();
        let position = self.controller.seek(position)?;
        self.update_active_chapter();
        Ok(position)
    }

    /// User seek relative to the current position
    pub fn seek_by(&mut self, delta: f64) -> Result<f64> {
        self.before_manual_seek();
        let position = self.controller.seek_by(delta)?;
        self.update_active_chapter();
        Ok(position)
    }

    /// User seek to a fraction of the duration
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<f64> {
        self.before_manual_seek();
        let position = self.controller.seek_to_percent(percent)?;
        self.update_active_chapter();
        Ok(position)
    }

    /// Jump to the start of chapter `index`
    pub fn seek_to_chapter(&mut self, index: usize) -> Result<f64> {
        let start = self
            .timeline
            .get(index)
            .map(|chapter| chapter.start)
            .ok_or(NavigatorError::UnknownChapter(index))?;
        self.seek(start)
    }

    /// Jump to the next visible chapter
    ///
    /// Returns the chapter index, or `None` when already at the last one.
    pub fn next_chapter(&mut self) -> Result<Option<usize>> {
        let position = self.controller.current_time();
        let next = self
            .visible_indices()
            .into_iter()
            .find(|&index| self.timeline.chapters()[index].start > position);

        match next {
            Some(index) => {
                self.seek_to_chapter(index)?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    /// Go back one visible chapter
    ///
    /// More than 3 seconds into the current chapter restarts it instead.
    pub fn previous_chapter(&mut self) -> Result<Option<usize>> {
        let position = self.controller.current_time();
        let visible = self.visible_indices();
        let chapters = self.timeline.chapters();

        let previous = match self.tracker.current().filter(|index| visible.contains(index)) {
            Some(current) if position - chapters[current].start > RESTART_THRESHOLD_SECS => {
                Some(current)
            }
            Some(current) => visible.iter().rev().copied().find(|&index| index < current),
            None => visible
                .iter()
                .rev()
                .copied()
                .find(|&index| chapters[index].start < position),
        };

        match previous {
            Some(index) => {
                self.seek_to_chapter(index)?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    fn before_manual_seek(&mut self) {
        self.navigator.on_manual_seek();
        if self.startup.pending().is_some() {
            debug!("manual seek overrides queued startup seek");
        }
        self.startup.cancel();
    }

    /// Set volume in `[0, 1]`
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.controller.set_volume(volume)
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.controller.set_muted(muted)
    }

    /// Toggle mute, returning the new state
    pub fn toggle_mute(&mut self) -> Result<bool> {
        self.controller.toggle_mute()
    }

    // ===== Topics & mode =====

    /// Add or remove a topic from the selection
    ///
    /// Returns true when the topic is selected afterwards.
    pub fn toggle_topic(&mut self, topic: &str) -> bool {
        let selected = self.filter.toggle(topic);
        self.refilter();
        self.sync_link();
        selected
    }

    /// Make `topic` the only selected topic
    pub fn select_only_topic(&mut self, topic: &str) {
        self.filter.select_only(topic);
        self.refilter();
        self.sync_link();
    }

    /// Clear the selection (show every chapter)
    pub fn clear_topics(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        self.filter.clear();
        self.refilter();
        self.sync_link();
    }

    fn refilter(&mut self) {
        self.filtered = self.filter.apply(self.timeline.chapters());
        debug!(
            selected = ?self.filter.selected(),
            filtered = self.filtered.len(),
            "topic filter changed"
        );
        self.emit(SessionEvent::FilterChanged {
            selected: self.filter.selected().iter().cloned().collect(),
            filtered: self.filtered.clone(),
        });
    }

    fn sync_link(&mut self) {
        if !self.config.sync_link_on_filter_change || self.shut_down {
            return;
        }
        let Some(context) = self.link_context.as_mut() else {
            return;
        };

        let topic = single_topic(self.filter.selected());
        let result = ShareLinkBuilder::new(&context.current_link()).and_then(|builder| {
            let link = builder.build(&DeepLink::new(topic, None));
            context.replace_link(&link)
        });
        if let Err(e) = result {
            self.report_error("link sync", e);
        }
    }

    /// Switch between full, guided and highlight presentation
    pub fn set_mode(&mut self, mode: NavigationMode) {
        if self.mode == mode {
            return;
        }

        debug!(from = self.mode.as_str(), to = mode.as_str(), "navigation mode changed");
        self.mode = mode;
        self.navigator.cancel();
        if mode == NavigationMode::Guided && self.controller.is_playing() {
            self.navigator.on_playing();
        }
        self.emit(SessionEvent::ModeChanged { mode });
    }

    // ===== Sharing =====

    /// Absolute share link for `kind`
    ///
    /// Requires a link context to supply the base link.
    pub fn share_link(&self, kind: &ShareKind) -> Result<String> {
        let base = self
            .link_context
            .as_ref()
            .map(|context| context.current_link())
            .ok_or_else(|| NavigatorError::InvalidLink("no link context attached".to_string()))?;

        let link = match kind {
            ShareKind::Moment => DeepLink::new(
                single_topic(self.filter.selected()),
                Some(self.controller.current_time()),
            ),
            ShareKind::Chapter(index) => {
                let chapter = self
                    .timeline
                    .get(*index)
                    .ok_or(NavigatorError::UnknownChapter(*index))?;
                DeepLink::new(None, Some(chapter.start))
            }
            ShareKind::Topic(topic) => DeepLink::new(Some(topic), None),
        };

        Ok(ShareLinkBuilder::new(&base)?.build(&link))
    }

    /// Build a share link and copy it
    ///
    /// Failures are reported as a retryable [`SessionEvent::ShareFailed`]
    /// and never affect playback.
    pub fn copy_share_link(
        &mut self,
        kind: &ShareKind,
        clipboard: &mut dyn Clipboard,
    ) -> Result<String> {
        let result = self
            .share_link(kind)
            .and_then(|link| clipboard.copy_text(&link).map(|()| link));

        match result {
            Ok(link) => {
                self.emit(SessionEvent::ShareLinkCopied { link: link.clone() });
                Ok(link)
            }
            Err(e) => {
                warn!(error = %e, "share link failed");
                self.emit(SessionEvent::ShareFailed {
                    message: e.to_string(),
                    retryable: true,
                });
                Err(e)
            }
        }
    }

    // ===== State Queries =====

    pub fn chapters(&self) -> &[Chapter] {
        self.timeline.chapters()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Whether guided jumps can currently happen
    pub fn is_guided_active(&self) -> bool {
        self.mode == NavigationMode::Guided
            && self.navigator.is_enabled()
            && !self.filtered.is_empty()
    }

    pub fn guided_phase(&self) -> GuidedPhase {
        self.navigator.phase()
    }

    pub fn selected_topics(&self) -> &BTreeSet<String> {
        self.filter.selected()
    }

    /// Every topic used by any chapter
    pub fn known_topics(&self) -> &BTreeSet<String> {
        &self.known_topics
    }

    /// Chapters per topic
    pub fn topic_counts(&self) -> BTreeMap<String, usize> {
        filter::topic_counts(self.timeline.chapters())
    }

    /// Indices of chapters passing the topic filter
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    /// Chapters passing the topic filter, in list order
    pub fn filtered_chapters(&self) -> Vec<&Chapter> {
        self.filtered
            .iter()
            .map(|&index| &self.timeline.chapters()[index])
            .collect()
    }

    /// Index of the chapter containing the playhead
    pub fn active_chapter(&self) -> Option<usize> {
        self.tracker.current()
    }

    /// Timeline rows for the current mode
    ///
    /// Guided mode lists only filtered chapters; full and highlight list all.
    pub fn timeline_view(&self) -> Vec<ChapterView> {
        let active = self.tracker.current();
        self.visible_indices()
            .into_iter()
            .map(|index| {
                let chapter = &self.timeline.chapters()[index];
                ChapterView {
                    index,
                    title: chapter.title.clone(),
                    start: chapter.start,
                    end: chapter.end,
                    topics: chapter.topics.iter().cloned().collect(),
                    matches_filter: self.filter.matches(chapter),
                    is_active: active == Some(index),
                }
            })
            .collect()
    }

    fn visible_indices(&self) -> Vec<usize> {
        match self.mode {
            NavigationMode::Guided => self.filtered.clone(),
            NavigationMode::Full | NavigationMode::Highlight => (0..self.timeline.len()).collect(),
        }
    }

    /// Playback snapshot
    pub fn state(&self) -> &TimelineState {
        self.controller.state()
    }

    pub fn current_time(&self) -> f64 {
        self.controller.current_time()
    }

    pub fn duration(&self) -> Option<f64> {
        self.controller.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    fn report_error(&mut self, context: &str, error: NavigatorError) {
        warn!(error = %error, "{} failed", context);
        self.emit(SessionEvent::Error {
            message: format!("{}: {}", context, error),
        });
    }

    // ===== Teardown =====

    /// Stop reacting to anything
    ///
    /// Cancels the guided cooldown and any queued startup seek; later events
    /// and ticks are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        debug!("chapter session shut down");
        self.shut_down = true;
        self.navigator.cancel();
        self.startup.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for ChapterSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn default_clock() -> Box<dyn Clock> {
    Box::new(crate::wasm::JsClock::new())
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn default_clock() -> Box<dyn Clock> {
    Box::new(SystemClock::new())
}

/// The selected topic when exactly one is selected
fn single_topic(selected: &BTreeSet<String>) -> Option<&str> {
    match selected.len() {
        1 => selected.iter().next().map(String::as_str),
        _ => None,
    }
}
