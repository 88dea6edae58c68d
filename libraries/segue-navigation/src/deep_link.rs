//! Shareable deep links
//!
//! A deep link carries two independent optional query parameters:
//! - `topic` - a single topic to filter by (guided mode on restore)
//! - `t` - a whole-second timestamp to seek to once media is ready
//!
//! Patterns:
//! - `https://host/watch/42?topic=winds&t=125`
//! - `https://host/watch/42?t=125`
//! - `?topic=strings`

use crate::error::{NavigatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use url::{form_urlencoded, Url};

/// Query key for the topic filter
pub const TOPIC_PARAM: &str = "topic";

/// Query key for the timestamp
pub const TIME_PARAM: &str = "t";

/// Decoded deep-link state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLink {
    pub topic: Option<String>,
    pub timestamp: Option<u64>,
}

impl DeepLink {
    /// Build link state, flooring the timestamp
    ///
    /// Negative or non-finite timestamps are dropped.
    pub fn new(topic: Option<&str>, timestamp_secs: Option<f64>) -> Self {
        Self {
            topic: topic.filter(|topic| !topic.is_empty()).map(str::to_string),
            timestamp: timestamp_secs.and_then(whole_seconds),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.timestamp.is_none()
    }

    /// Canonical query string (no leading `?`)
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        self.append_to(&mut query);
        query.finish()
    }

    fn append_to<T: form_urlencoded::Target>(&self, query: &mut form_urlencoded::Serializer<'_, T>) {
        if let Some(topic) = &self.topic {
            query.append_pair(TOPIC_PARAM, topic);
        }
        if let Some(timestamp) = self.timestamp {
            query.append_pair(TIME_PARAM, &timestamp.to_string());
        }
    }
}

/// Encode `{topic?, timestamp?}` as a canonical query string
///
/// `topic=<topic>&t=<floor(timestamp)>`, each part present only when given.
pub fn encode(topic: Option<&str>, timestamp_secs: Option<f64>) -> String {
    DeepLink::new(topic, timestamp_secs).to_query()
}

/// Decode link state from an absolute link, `?query` or bare query
///
/// Topics missing from `known_topics` are dropped. Unparseable, negative or
/// non-finite timestamps are dropped. Other parameters are ignored.
pub fn decode(link: &str, known_topics: &BTreeSet<String>) -> DeepLink {
    let query = extract_query(link);

    let mut topic = None;
    let mut timestamp = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            TOPIC_PARAM if topic.is_none() => topic = Some(value.into_owned()),
            TIME_PARAM if timestamp.is_none() => timestamp = Some(value.into_owned()),
            _ => {}
        }
    }

    let topic = topic.filter(|topic| {
        let known = known_topics.contains(topic);
        if !known {
            debug!(topic = %topic, "dropping unknown topic from link");
        }
        known
    });

    DeepLink {
        topic,
        timestamp: timestamp.as_deref().and_then(parse_timestamp),
    }
}

fn extract_query(link: &str) -> String {
    if let Ok(url) = Url::parse(link) {
        return url.query().unwrap_or_default().to_string();
    }

    let without_fragment = link.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => query.to_string(),
        None if without_fragment.contains('=') => without_fragment.to_string(),
        None => String::new(),
    }
}

fn parse_timestamp(raw: &str) -> Option<u64> {
    raw.trim().parse::<f64>().ok().and_then(whole_seconds)
}

fn whole_seconds(secs: f64) -> Option<u64> {
    if secs.is_finite() && secs >= 0.0 {
        Some(secs.floor() as u64)
    } else {
        None
    }
}

/// What a share link points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ShareKind {
    /// Current playhead
    Moment,

    /// Start of a chapter (by index)
    Chapter(usize),

    /// A topic filter with no timestamp
    Topic(String),
}

/// Rewrites a base link with deep-link parameters
#[derive(Debug, Clone)]
pub struct ShareLinkBuilder {
    base: Url,
}

impl ShareLinkBuilder {
    /// Create a builder from the host's current absolute link
    pub fn new(base: &str) -> Result<Self> {
        let base =
            Url::parse(base).map_err(|e| NavigatorError::InvalidLink(format!("{}: {}", base, e)))?;
        Ok(Self { base })
    }

    /// Absolute link for `link`
    ///
    /// Existing `topic`/`t` parameters are replaced, every other parameter
    /// and the path are kept, the fragment is dropped.
    pub fn build(&self, link: &DeepLink) -> String {
        let mut url = self.base.clone();
        url.set_fragment(None);

        let preserved: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != TOPIC_PARAM && key != TIME_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        if !preserved.is_empty() || !link.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &preserved {
                pairs.append_pair(key, value);
            }
            if let Some(topic) = &link.topic {
                pairs.append_pair(TOPIC_PARAM, topic);
            }
            if let Some(timestamp) = link.timestamp {
                pairs.append_pair(TIME_PARAM, &timestamp.to_string());
            }
        }

        url.to_string()
    }
}

/// Holds the startup seek until the transport is ready
///
/// The seek is released at most once, on the first readiness observation.
/// Later readiness reports (e.g. the host firing `loadedmetadata` again
/// after a source refresh) find the gate consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadinessGate {
    pending: Option<f64>,
    consumed: bool,
}

impl ReadinessGate {
    pub fn new(pending: Option<f64>) -> Self {
        Self {
            pending,
            consumed: false,
        }
    }

    /// Seek position still waiting for readiness
    pub fn pending(&self) -> Option<f64> {
        if self.consumed {
            None
        } else {
            self.pending
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Release the queued seek if `ready` and not yet consumed
    pub fn flush(&mut self, ready: bool) -> Option<f64> {
        if self.consumed || !ready {
            return None;
        }
        self.consumed = true;
        self.pending.take()
    }

    /// Discard the queued seek (teardown, or a manual seek overtook it)
    pub fn cancel(&mut self) {
        self.pending = None;
        self.consumed = true;
    }
}
