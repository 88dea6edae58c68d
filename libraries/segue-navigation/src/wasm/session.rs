//! WASM-compatible ChapterSession wrapper

use super::adapters::{JsClipboard, JsClock, JsLinkContext, JsMediaTransport};
use crate::{
    load_chapters_json, ChapterSession, NavigationMode, NavigatorError, SessionConfig,
    SessionEvent, ShareKind, TransportEvent,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;

/// WASM-compatible chapter session
///
/// Wraps [`ChapterSession`] with a JavaScript-friendly API. Events are
/// delivered to the `onEvent` callback after every call, or can be pulled
/// with `drainEvents` when no callback is registered.
#[wasm_bindgen]
pub struct WasmChapterSession {
    inner: ChapterSession,
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmChapterSession {
    /// Create a session
    ///
    /// - `chapters_json`: JSON array of `{title, start, end, topics}`
    /// - `media`: an `HTMLMediaElement` or anything with the same shape
    /// - `config_json`: optional session config overrides
    #[wasm_bindgen(constructor)]
    pub fn new(
        chapters_json: &str,
        media: JsValue,
        config_json: Option<String>,
    ) -> Result<WasmChapterSession, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let chapters = load_chapters_json(chapters_json).map_err(to_js)?;
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json).map_err(to_js)?,
            None => SessionConfig::default(),
        };

        let inner = ChapterSession::new(chapters, Box::new(JsMediaTransport::new(media)), config)
            .with_clock(Box::new(JsClock::new()));

        Ok(Self {
            inner,
            on_event: None,
        })
    }

    /// Attach address-bar callbacks: `read() -> string`, `replace(link)`
    #[wasm_bindgen(js_name = attachLinkContext)]
    pub fn attach_link_context(&mut self, read: Function, replace: Function) {
        self.inner
            .set_link_context(Box::new(JsLinkContext::new(read, replace)));
    }

    /// Apply deep-link state from the attached link context (once)
    #[wasm_bindgen(js_name = restoreFromLink)]
    pub fn restore_from_link(&mut self) -> JsValue {
        let restored = self.inner.restore_from_link_context();
        self.flush_events();
        serde_wasm_bindgen::to_value(&restored).unwrap_or(JsValue::NULL)
    }

    // ===== Transport feedback =====

    /// Forward `loadedmetadata`
    #[wasm_bindgen(js_name = onMetadataLoaded)]
    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.handle(TransportEvent::MetadataLoaded { duration });
    }

    /// Forward `timeupdate`
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&mut self, position: f64) {
        self.handle(TransportEvent::TimeUpdate { position });
    }

    /// Forward `playing`
    #[wasm_bindgen(js_name = onPlaying)]
    pub fn on_playing(&mut self) {
        self.handle(TransportEvent::Playing);
    }

    /// Forward `pause`
    #[wasm_bindgen(js_name = onPaused)]
    pub fn on_paused(&mut self) {
        self.handle(TransportEvent::Paused);
    }

    /// Forward `ended`
    #[wasm_bindgen(js_name = onEnded)]
    pub fn on_ended(&mut self) {
        self.handle(TransportEvent::Ended);
    }

    /// Forward `volumechange`
    #[wasm_bindgen(js_name = onVolumeChanged)]
    pub fn on_volume_changed(&mut self, volume: f64, muted: bool) {
        self.handle(TransportEvent::VolumeChanged { volume, muted });
    }

    /// Poll the media element; call every `tickIntervalMs`
    pub fn tick(&mut self) {
        self.inner.tick();
        self.flush_events();
    }

    #[wasm_bindgen(js_name = tickIntervalMs)]
    pub fn tick_interval_ms(&self) -> u32 {
        self.inner.tick_interval().as_millis() as u32
    }

    // ===== Playback Control =====

    pub fn play(&mut self) -> Result<(), JsValue> {
        let result = self.inner.play().map_err(to_js);
        self.flush_events();
        result
    }

    pub fn pause(&mut self) -> Result<(), JsValue> {
        let result = self.inner.pause().map_err(to_js);
        self.flush_events();
        result
    }

    /// Seek to position in seconds, returning the clamped position
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, position_secs: f64) -> Result<f64, JsValue> {
        let result = self.inner.seek(position_secs).map_err(to_js);
        self.flush_events();
        result
    }

    /// Seek relative to the current position
    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&mut self, delta_secs: f64) -> Result<f64, JsValue> {
        let result = self.inner.seek_by(delta_secs).map_err(to_js);
        self.flush_events();
        result
    }

    /// Seek to position by percentage (0.0 - 1.0)
    #[wasm_bindgen(js_name = seekToPercent)]
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<f64, JsValue> {
        let result = self.inner.seek_to_percent(percent).map_err(to_js);
        self.flush_events();
        result
    }

    #[wasm_bindgen(js_name = seekToChapter)]
    pub fn seek_to_chapter(&mut self, index: usize) -> Result<f64, JsValue> {
        let result = self.inner.seek_to_chapter(index).map_err(to_js);
        self.flush_events();
        result
    }

    #[wasm_bindgen(js_name = nextChapter)]
    pub fn next_chapter(&mut self) -> Result<Option<usize>, JsValue> {
        let result = self.inner.next_chapter().map_err(to_js);
        self.flush_events();
        result
    }

    #[wasm_bindgen(js_name = previousChapter)]
    pub fn previous_chapter(&mut self) -> Result<Option<usize>, JsValue> {
        let result = self.inner.previous_chapter().map_err(to_js);
        self.flush_events();
        result
    }

    // ===== Volume Control =====

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f64) -> Result<(), JsValue> {
        self.inner.set_volume(volume).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) -> Result<(), JsValue> {
        self.inner.set_muted(muted).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) -> Result<bool, JsValue> {
        self.inner.toggle_mute().map_err(to_js)
    }

    // ===== Topics & Mode =====

    #[wasm_bindgen(js_name = toggleTopic)]
    pub fn toggle_topic(&mut self, topic: &str) -> bool {
        let selected = self.inner.toggle_topic(topic);
        self.flush_events();
        selected
    }

    #[wasm_bindgen(js_name = selectOnlyTopic)]
    pub fn select_only_topic(&mut self, topic: &str) {
        self.inner.select_only_topic(topic);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = clearTopics)]
    pub fn clear_topics(&mut self) {
        self.inner.clear_topics();
        self.flush_events();
    }

    /// Set mode ("full", "guided" or "highlight")
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: NavigationMode = mode.parse().map_err(to_js)?;
        self.inner.set_mode(mode);
        self.flush_events();
        Ok(())
    }

    #[wasm_bindgen(js_name = getMode)]
    pub fn get_mode(&self) -> String {
        self.inner.mode().as_str().to_string()
    }

    // ===== Sharing =====

    /// Share link for the current moment
    #[wasm_bindgen(js_name = momentLink)]
    pub fn moment_link(&self) -> Result<String, JsValue> {
        self.inner.share_link(&ShareKind::Moment).map_err(to_js)
    }

    /// Share link for the start of a chapter
    #[wasm_bindgen(js_name = chapterLink)]
    pub fn chapter_link(&self, index: usize) -> Result<String, JsValue> {
        self.inner.share_link(&ShareKind::Chapter(index)).map_err(to_js)
    }

    /// Share link for a topic
    #[wasm_bindgen(js_name = topicLink)]
    pub fn topic_link(&self, topic: &str) -> Result<String, JsValue> {
        self.inner
            .share_link(&ShareKind::Topic(topic.to_string()))
            .map_err(to_js)
    }

    /// Copy the current-moment link via `write(text)`
    #[wasm_bindgen(js_name = copyMomentLink)]
    pub fn copy_moment_link(&mut self, write: Function) -> Result<String, JsValue> {
        let mut clipboard = JsClipboard::new(write);
        let result = self
            .inner
            .copy_share_link(&ShareKind::Moment, &mut clipboard)
            .map_err(to_js);
        self.flush_events();
        result
    }

    // ===== State Queries =====

    /// Timeline rows for the current mode
    #[wasm_bindgen(js_name = getTimeline)]
    pub fn get_timeline(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.timeline_view()).unwrap_or(JsValue::NULL)
    }

    /// Playback snapshot
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.state()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getActiveChapter)]
    pub fn get_active_chapter(&self) -> Option<usize> {
        self.inner.active_chapter()
    }

    #[wasm_bindgen(js_name = getSelectedTopics)]
    pub fn get_selected_topics(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.selected_topics()).unwrap_or(JsValue::NULL)
    }

    /// Topic -> chapter count
    #[wasm_bindgen(js_name = getTopicCounts)]
    pub fn get_topic_counts(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.topic_counts()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = isGuidedActive)]
    pub fn is_guided_active(&self) -> bool {
        self.inner.is_guided_active()
    }

    // ===== Events =====

    /// Register a callback receiving each event object
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    /// Take queued events (when no callback is registered)
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.drain_events()).unwrap_or(JsValue::NULL)
    }

    /// Stop reacting to media events and ticks
    pub fn shutdown(&mut self) {
        self.inner.shutdown();
    }

    // ===== Internal Helpers =====

    fn handle(&mut self, event: TransportEvent) {
        self.inner.handle_transport_event(event);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        let Some(callback) = &self.on_event else {
            return;
        };
        for event in self.inner.drain_events() {
            emit(callback, &event);
        }
    }
}

fn emit(callback: &Function, event: &SessionEvent) {
    let value = serde_wasm_bindgen::to_value(event).unwrap_or(JsValue::NULL);
    let _ = callback.call1(&JsValue::NULL, &value);
}

fn to_js(error: NavigatorError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
