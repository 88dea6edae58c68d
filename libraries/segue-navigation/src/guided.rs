//! Guided navigation - virtual supercut playback
//!
//! The media still decodes linearly, so hiding chapters in the UI does not
//! stop them from playing. In guided mode the navigator watches the playhead
//! and asks for a seek whenever it enters an excluded chapter or reaches the
//! end of an included one.
//!
//! State machine:
//!
//! ```text
//!            play                       jump issued
//!   Idle ───────────▶ Playing ─────────────────────▶ JumpPending
//!    ▲                 ▲   │                              │
//!    │      pause /    │   │ last filtered chapter ends   │ cooldown elapsed
//!    └──── teardown ───┼───┘ (pause)                      │ or manual seek
//!                      └──────────────────────────────────┘
//! ```
//!
//! Decisions are returned as [`GuidedAction`]s; the caller executes them
//! through the playback controller.

use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Navigator state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GuidedPhase {
    /// Not playing, or guided mode inactive
    Idle,

    /// Playing and evaluating every time advance
    Playing,

    /// A jump was issued at `issued_ms`; evaluation is suspended until `until_ms`
    JumpPending {
        target: f64,
        issued_ms: u64,
        until_ms: u64,
    },
}

/// What the navigator wants the controller to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidedAction {
    /// Nothing to do
    None,

    /// Seek to the start of chapter `to`
    Seek {
        from: usize,
        to: usize,
        target: f64,
    },

    /// Last filtered chapter finished; pause playback
    Pause { chapter: usize },
}

/// Guided-mode state machine
#[derive(Debug, Clone)]
pub struct GuidedNavigator {
    phase: GuidedPhase,
    boundary_epsilon: f64,
    cooldown_ms: u64,
    enabled: bool,
}

impl GuidedNavigator {
    /// Create a navigator
    ///
    /// # Arguments
    /// * `boundary_epsilon` - Seconds before a chapter end at which to jump
    /// * `cooldown_ms` - Suspension after each jump
    /// * `enabled` - False for malformed chapter lists; the navigator then never acts
    pub fn new(boundary_epsilon: f64, cooldown_ms: u64, enabled: bool) -> Self {
        Self {
            phase: GuidedPhase::Idle,
            boundary_epsilon,
            cooldown_ms,
            enabled,
        }
    }

    pub fn phase(&self) -> GuidedPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the post-jump cooldown is still running at `now_ms`
    ///
    /// A clock reading earlier than the jump itself ends the cooldown, so a
    /// clock stepping backwards cannot hold navigation suspended.
    pub fn is_cooling_down(&self, now_ms: u64) -> bool {
        matches!(
            self.phase,
            GuidedPhase::JumpPending { issued_ms, until_ms, .. }
                if issued_ms <= now_ms && now_ms < until_ms
        )
    }

    /// Transport started playing
    pub fn on_playing(&mut self) {
        if self.phase == GuidedPhase::Idle {
            self.phase = GuidedPhase::Playing;
        }
    }

    /// Transport paused or ended
    pub fn on_paused(&mut self) {
        self.phase = GuidedPhase::Idle;
    }

    /// User moved the playhead; any in-flight jump is abandoned
    pub fn on_manual_seek(&mut self) {
        if let GuidedPhase::JumpPending { target, .. } = self.phase {
            debug!(target, "manual seek cleared pending guided jump");
            self.phase = GuidedPhase::Playing;
        }
    }

    /// The transport refused the last jump; evaluate again on the next advance
    pub fn abort_jump(&mut self) {
        if let GuidedPhase::JumpPending { target, .. } = self.phase {
            debug!(target, "guided jump not applied, cooldown dropped");
            self.phase = GuidedPhase::Playing;
        }
    }

    /// Stop all activity (mode change, teardown)
    pub fn cancel(&mut self) {
        self.phase = GuidedPhase::Idle;
    }

    /// Evaluate one time-advance event
    ///
    /// Indices in `filtered` that are not in `timeline` are skipped.
    ///
    /// # Arguments
    /// * `now_ms` - Monotonic clock reading
    /// * `position` - Playhead in seconds
    /// * `timeline` - Session chapters
    /// * `filtered` - Indices of filtered chapters, ascending
    pub fn evaluate(
        &mut self,
        now_ms: u64,
        position: f64,
        timeline: &Timeline,
        filtered: &[usize],
    ) -> GuidedAction {
        if !self.enabled || filtered.is_empty() {
            return GuidedAction::None;
        }

        match self.phase {
            GuidedPhase::Idle => return GuidedAction::None,
            GuidedPhase::JumpPending { .. } if self.is_cooling_down(now_ms) => {
                return GuidedAction::None;
            }
            GuidedPhase::JumpPending { target, .. } => {
                debug!(target, "guided jump cooldown elapsed");
                self.phase = GuidedPhase::Playing;
            }
            GuidedPhase::Playing => {}
        }

        let Some((index, chapter)) = timeline
            .chapter_at(position)
            .and_then(|index| Some((index, timeline.get(index)?)))
        else {
            return GuidedAction::None;
        };
        let start_of = |candidate: usize| Some((candidate, timeline.get(candidate)?.start));

        if filtered.binary_search(&index).is_err() {
            // Inside an excluded chapter: skip ahead to the next included one.
            let next = filtered
                .iter()
                .filter_map(|&candidate| start_of(candidate))
                .find(|&(_, start)| start > position);

            return match next {
                Some((to, start)) => self.jump(now_ms, index, to, start),
                None => GuidedAction::None,
            };
        }

        if position < chapter.end - self.boundary_epsilon {
            return GuidedAction::None;
        }

        let next = filtered
            .iter()
            .filter(|&&candidate| candidate > index)
            .find_map(|&candidate| start_of(candidate));

        match next {
            // Overlapping chapters: the playhead is already inside the next
            // included chapter, so linear playback reaches it without a seek.
            Some((_, start)) if start <= position => GuidedAction::None,
            Some((to, start)) => self.jump(now_ms, index, to, start),
            None => {
                info!(chapter = index, position, "last filtered chapter finished, pausing");
                self.phase = GuidedPhase::Idle;
                GuidedAction::Pause { chapter: index }
            }
        }
    }

    fn jump(&mut self, now_ms: u64, from: usize, to: usize, target: f64) -> GuidedAction {
        info!(from, to, target, "guided jump");
        self.phase = GuidedPhase::JumpPending {
            target,
            issued_ms: now_ms,
            until_ms: now_ms.saturating_add(self.cooldown_ms),
        };
        GuidedAction::Seek { from, to, target }
    }
}
