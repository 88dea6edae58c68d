//! Platform-agnostic media transport
//!
//! Abstracts the host's media element (HTML video, native player, etc.)

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Host media transport
///
/// Implementors forward commands to the real player. Commands are
/// fire-and-forget: their effect is observed later through
/// [`TransportEvent`]s or the poll observers.
pub trait MediaTransport {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Move the playhead
    ///
    /// # Arguments
    /// * `position` - Target position in seconds, already clamped by the caller
    fn seek(&mut self, position: f64) -> Result<()>;

    /// Set volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    /// Set mute state
    fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Current playback position in seconds
    fn position(&self) -> f64;

    /// Media duration in seconds
    ///
    /// Returns `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;

    /// Check if the transport is playing
    fn is_playing(&self) -> bool;
}

/// Shared single-threaded transport
///
/// Lets the host keep a handle to its player while the session owns another.
impl<T: MediaTransport> MediaTransport for Rc<RefCell<T>> {
    fn play(&mut self) -> Result<()> {
        self.borrow_mut().play()
    }

    fn pause(&mut self) -> Result<()> {
        self.borrow_mut().pause()
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.borrow_mut().seek(position)
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.borrow_mut().set_volume(volume)
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.borrow_mut().set_muted(muted)
    }

    fn position(&self) -> f64 {
        self.borrow().position()
    }

    fn duration(&self) -> Option<f64> {
        self.borrow().duration()
    }

    fn is_playing(&self) -> bool {
        self.borrow().is_playing()
    }
}

/// Notifications pushed by the host's media element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransportEvent {
    /// Metadata loaded, duration is known
    MetadataLoaded { duration: f64 },

    /// Playhead moved (natural advance or completed seek)
    TimeUpdate { position: f64 },

    /// Playback started or resumed
    Playing,

    /// Playback paused
    Paused,

    /// Media reached its end
    Ended,

    /// Volume or mute changed outside the controller (e.g. native controls)
    VolumeChanged { volume: f64, muted: bool },
}

/// Dummy transport for testing
///
/// Records every command and applies it to its own position immediately
#[cfg(test)]
#[derive(Debug, Default)]
pub struct DummyTransport {
    pub position: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub volume: f64,
    pub muted: bool,
    pub seeks: Vec<f64>,
    pub pauses: usize,
    pub fail_seeks: bool,
}

#[cfg(test)]
impl DummyTransport {
    /// Create a transport whose metadata is already loaded
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            volume: 1.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl MediaTransport for DummyTransport {
    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playing = false;
        self.pauses += 1;
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        if self.fail_seeks {
            return Err(crate::error::NavigatorError::Transport(
                "seek rejected".to_string(),
            ));
        }
        self.seeks.push(position);
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.muted = muted;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
