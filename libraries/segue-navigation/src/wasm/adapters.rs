//! JavaScript-backed implementations of the host traits

use crate::{Clipboard, Clock, LinkContext, MediaTransport, NavigatorError, Result};
use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;

/// Media transport over any object shaped like `HTMLMediaElement`
///
/// Uses `play()`, `pause()` and the `currentTime`, `duration`, `paused`,
/// `volume` and `muted` properties, so a `<video>` element can be passed
/// directly, as can a wrapper around a third-party player.
pub struct JsMediaTransport {
    element: JsValue,
}

impl JsMediaTransport {
    pub fn new(element: JsValue) -> Self {
        Self { element }
    }

    fn call(&self, method: &str) -> Result<()> {
        let function: Function = Reflect::get(&self.element, &JsValue::from_str(method))
            .map_err(|e| js_error(method, &e))?
            .dyn_into()
            .map_err(|e| js_error(method, &e))?;
        // play() returns a promise; rejection (autoplay policy) is the host's concern
        function
            .call0(&self.element)
            .map(|_| ())
            .map_err(|e| js_error(method, &e))
    }

    fn set(&self, property: &str, value: JsValue) -> Result<()> {
        Reflect::set(&self.element, &JsValue::from_str(property), &value)
            .map(|_| ())
            .map_err(|e| js_error(property, &e))
    }

    fn get_f64(&self, property: &str) -> Option<f64> {
        Reflect::get(&self.element, &JsValue::from_str(property))
            .ok()
            .and_then(|value| value.as_f64())
    }
}

impl MediaTransport for JsMediaTransport {
    fn play(&mut self) -> Result<()> {
        self.call("play")
    }

    fn pause(&mut self) -> Result<()> {
        self.call("pause")
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.set("currentTime", JsValue::from_f64(position))
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.set("volume", JsValue::from_f64(volume))
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.set("muted", JsValue::from_bool(muted))
    }

    fn position(&self) -> f64 {
        self.get_f64("currentTime").unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        // NaN until metadata loads, Infinity for live streams
        self.get_f64("duration").filter(|duration| duration.is_finite())
    }

    fn is_playing(&self) -> bool {
        Reflect::get(&self.element, &JsValue::from_str("paused"))
            .ok()
            .and_then(|value| value.as_bool())
            .map(|paused| !paused)
            .unwrap_or(false)
    }
}

/// Link context backed by two callbacks: `() => string` and `(link) => void`
pub struct JsLinkContext {
    read: Function,
    replace: Function,
}

impl JsLinkContext {
    pub fn new(read: Function, replace: Function) -> Self {
        Self { read, replace }
    }
}

impl LinkContext for JsLinkContext {
    fn current_link(&self) -> String {
        self.read
            .call0(&JsValue::NULL)
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_default()
    }

    fn replace_link(&mut self, link: &str) -> Result<()> {
        self.replace
            .call1(&JsValue::NULL, &JsValue::from_str(link))
            .map(|_| ())
            .map_err(|e| js_error("replace link", &e))
    }
}

/// Clipboard backed by a `(text) => void` callback that throws on failure
pub struct JsClipboard {
    write: Function,
}

impl JsClipboard {
    pub fn new(write: Function) -> Self {
        Self { write }
    }
}

impl Clipboard for JsClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.write
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| NavigatorError::Clipboard(describe(&e)))
    }
}

/// Clock reading `performance.now()`
///
/// Falls back to `Date.now()` on globals without a `performance` object
/// (some worker and test environments).
#[derive(Debug, Clone)]
pub struct JsClock {
    performance: Option<(JsValue, Function)>,
}

impl JsClock {
    pub fn new() -> Self {
        let performance = Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))
            .ok()
            .filter(|performance| performance.is_object())
            .and_then(|performance| {
                let now = Reflect::get(&performance, &JsValue::from_str("now"))
                    .ok()?
                    .dyn_into::<Function>()
                    .ok()?;
                Some((performance, now))
            });
        Self { performance }
    }
}

impl Default for JsClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        let reading = self
            .performance
            .as_ref()
            .and_then(|(performance, now)| now.call0(performance).ok())
            .and_then(|value| value.as_f64())
            .unwrap_or_else(js_sys::Date::now);
        reading.max(0.0) as u64
    }
}

fn js_error(what: &str, error: &JsValue) -> NavigatorError {
    NavigatorError::Transport(format!("{}: {}", what, describe(error)))
}

fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .unwrap_or_else(|| format!("{:?}", error))
}
