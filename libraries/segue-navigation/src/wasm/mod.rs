//! WASM bindings for segue-navigation
//!
//! This module provides WebAssembly bindings for the ChapterSession,
//! allowing a web page to drive chapter navigation from JavaScript.

pub mod adapters;
pub mod session;

pub use adapters::{JsClipboard, JsClock, JsLinkContext, JsMediaTransport};
pub use session::WasmChapterSession;
