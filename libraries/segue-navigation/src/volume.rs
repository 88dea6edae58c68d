//! Volume state for the playback controller
//!
//! Level is a linear fraction in `[0, 1]` as media elements expect it.
//! Mute is kept separately so unmuting restores the previous level.

/// Volume level with independent mute flag
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume state
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to `[0, 1]`
    pub fn new(level: f64) -> Self {
        Self {
            level: Self::clamp_level(level).unwrap_or(1.0),
            muted: false,
        }
    }

    /// Set volume level
    ///
    /// Out-of-range values are clamped. Returns false (and keeps the old level)
    /// when `level` is NaN.
    pub fn set_level(&mut self, level: f64) -> bool {
        match Self::clamp_level(level) {
            Some(level) => {
                self.level = level;
                true
            }
            None => false,
        }
    }

    /// Get current volume level
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Set mute state (preserves volume level)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level actually heard: 0.0 if muted
    pub fn effective(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    fn clamp_level(level: f64) -> Option<f64> {
        if level.is_nan() {
            None
        } else {
            Some(level.clamp(0.0, 1.0))
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
