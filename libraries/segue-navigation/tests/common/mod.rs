//! Shared test infrastructure for integration tests

#![allow(dead_code)]

use segue_navigation::{
    Chapter, ChapterSession, Clipboard, ManualClock, MediaTransport, NavigatorError, Result,
    SessionConfig, StaticLinkContext,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Install a test-writer subscriber once (`RUST_LOG=debug cargo test` to see logs)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted media element
///
/// Commands take effect immediately, the way a local `<video>` applies
/// `currentTime` writes.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub position: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub volume: f64,
    pub muted: bool,
    /// Every seek target, in order
    pub seeks: Vec<f64>,
    pub pause_calls: usize,
    pub fail_seeks: bool,
}

impl MockTransport {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            volume: 1.0,
            ..Self::default()
        }
    }
}

impl MediaTransport for MockTransport {
    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playing = false;
        self.pause_calls += 1;
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        if self.fail_seeks {
            return Err(NavigatorError::Transport("seek rejected".to_string()));
        }
        self.position = position;
        self.seeks.push(position);
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

/// Clipboard recording copies, optionally refusing them
#[derive(Debug, Default)]
pub struct MockClipboard {
    pub copied: Vec<String>,
    pub deny: bool,
}

impl Clipboard for MockClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        if self.deny {
            return Err(NavigatorError::Clipboard("permission denied".to_string()));
        }
        self.copied.push(text.to_string());
        Ok(())
    }
}

/// A(0,10,{strings}), B(10,20,{winds}), C(20,30,{strings})
pub fn orchestra() -> Vec<Chapter> {
    vec![
        Chapter::new("A", 0.0, 10.0, ["strings"]),
        Chapter::new("B", 10.0, 20.0, ["winds"]),
        Chapter::new("C", 20.0, 30.0, ["strings"]),
    ]
}

pub struct Harness {
    pub session: ChapterSession,
    pub transport: Rc<RefCell<MockTransport>>,
    pub clock: ManualClock,
    pub link: Rc<RefCell<StaticLinkContext>>,
}

pub fn harness(chapters: Vec<Chapter>, duration: Option<f64>, link: &str) -> Harness {
    init_tracing();
    let transport = Rc::new(RefCell::new(MockTransport::new(duration)));
    let clock = ManualClock::new(1_000);
    let link = Rc::new(RefCell::new(StaticLinkContext::new(link)));
    let session = ChapterSession::new(
        chapters,
        Box::new(transport.clone()),
        SessionConfig::default(),
    )
    .with_clock(Box::new(clock.clone()))
    .with_link_context(Box::new(link.clone()));

    Harness {
        session,
        transport,
        clock,
        link,
    }
}

impl Harness {
    /// Advance the clock and report a new playhead, like a `timeupdate`
    pub fn play_to(&mut self, position: f64, after_ms: u64) {
        self.clock.advance(after_ms);
        self.transport.borrow_mut().position = position;
        self.session
            .handle_transport_event(segue_navigation::TransportEvent::TimeUpdate { position });
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.transport.borrow().seeks.clone()
    }
}
