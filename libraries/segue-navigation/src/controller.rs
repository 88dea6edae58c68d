//! Playback controller - the only writer of transport state
//!
//! Every position change (user seek, guided jump, deep-link restore) goes
//! through here, so there is one place that knows who moved the playhead.

use crate::{
    error::{NavigatorError, Result},
    transport::{MediaTransport, TransportEvent},
    types::TimelineState,
    volume::Volume,
};
use tracing::{debug, warn};

/// Facade over the host media transport
pub struct PlaybackController {
    transport: Box<dyn MediaTransport>,
    state: TimelineState,
    volume: Volume,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// Wrap a transport, pulling whatever it already knows
    pub fn new(transport: Box<dyn MediaTransport>, initial_volume: f64) -> Self {
        let mut controller = Self {
            transport,
            state: TimelineState::default(),
            volume: Volume::new(initial_volume),
        };
        controller.state.volume = controller.volume.level();
        controller.sync();
        controller
    }

    // ===== Commands =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        self.transport.play().map_err(|e| rejected("play", e))?;
        self.state.is_playing = true;
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        self.transport.pause().map_err(|e| rejected("pause", e))?;
        self.state.is_playing = false;
        Ok(())
    }

    /// Seek to `position` seconds
    ///
    /// Clamped to `[0, duration]`; before metadata loads only the lower
    /// bound applies. Non-finite positions are ignored. Returns the position
    /// actually requested from the transport.
    pub fn seek(&mut self, position: f64) -> Result<f64> {
        if !position.is_finite() {
            debug!(position, "ignoring non-finite seek");
            return Ok(self.state.current_time);
        }

        let target = self.clamp(position);
        self.transport
            .seek(target)
            .map_err(|e| rejected("seek", e))?;
        self.state.current_time = target;
        Ok(target)
    }

    /// Seek relative to the current position (skip buttons)
    pub fn seek_by(&mut self, delta: f64) -> Result<f64> {
        self.seek(self.state.current_time + delta)
    }

    /// Seek to a fraction of the duration (scrubber)
    ///
    /// Does nothing until the duration is known.
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<f64> {
        if !self.state.metadata_ready || percent.is_nan() {
            return Ok(self.state.current_time);
        }
        self.seek(self.state.duration * percent.clamp(0.0, 1.0))
    }

    /// Set volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        if !self.volume.set_level(volume) {
            debug!("ignoring NaN volume");
            return Ok(());
        }
        self.state.volume = self.volume.level();
        self.transport
            .set_volume(self.volume.level())
            .map_err(|e| rejected("set volume", e))
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.volume.set_muted(muted);
        self.state.muted = muted;
        self.transport
            .set_muted(muted)
            .map_err(|e| rejected("set muted", e))
    }

    /// Toggle mute, returning the new state
    pub fn toggle_mute(&mut self) -> Result<bool> {
        let muted = !self.volume.is_muted();
        self.set_muted(muted)?;
        Ok(muted)
    }

    // ===== Transport feedback =====

    /// Apply a pushed transport notification
    pub fn handle_event(&mut self, event: &TransportEvent) {
        match *event {
            TransportEvent::MetadataLoaded { duration } => self.set_duration(duration),
            TransportEvent::TimeUpdate { position } => {
                if position.is_finite() {
                    self.state.current_time = self.clamp(position);
                }
            }
            TransportEvent::Playing => self.state.is_playing = true,
            TransportEvent::Paused => self.state.is_playing = false,
            TransportEvent::Ended => {
                self.state.is_playing = false;
                if self.state.metadata_ready {
                    self.state.current_time = self.state.duration;
                }
            }
            TransportEvent::VolumeChanged { volume, muted } => {
                self.volume.set_level(volume);
                self.volume.set_muted(muted);
                self.state.volume = self.volume.level();
                self.state.muted = muted;
            }
        }
    }

    /// Pull the transport's poll observers into the snapshot
    pub fn sync(&mut self) {
        if let Some(duration) = self.transport.duration() {
            self.set_duration(duration);
        }
        let position = self.transport.position();
        if position.is_finite() {
            self.state.current_time = self.clamp(position);
        }
        self.state.is_playing = self.transport.is_playing();
    }

    fn set_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration >= 0.0 {
            self.state.duration = duration;
            self.state.metadata_ready = true;
        }
    }

    fn clamp(&self, position: f64) -> f64 {
        if self.state.metadata_ready {
            position.clamp(0.0, self.state.duration)
        } else {
            position.max(0.0)
        }
    }

    // ===== Observers =====

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    /// Media duration, once metadata has loaded
    pub fn duration(&self) -> Option<f64> {
        self.state.metadata_ready.then_some(self.state.duration)
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn is_ready(&self) -> bool {
        self.state.metadata_ready
    }

    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }
}

fn rejected(command: &str, error: NavigatorError) -> NavigatorError {
    warn!(command, error = %error, "transport rejected command");
    error
}
