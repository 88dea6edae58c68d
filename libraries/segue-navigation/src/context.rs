//! Host-supplied page capabilities
//!
//! The engine never touches a browser or window API directly. Hosts hand in
//! adapters for reading/writing the current link and for the clipboard.

use crate::error::Result;

/// Access to the page link the session is embedded in
pub trait LinkContext {
    /// The current absolute link (read once at startup, and when building share links)
    fn current_link(&self) -> String;

    /// Replace the current link without navigating (history replace)
    fn replace_link(&mut self, link: &str) -> Result<()>;
}

/// Destination for copied share links
pub trait Clipboard {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}

/// In-memory link context
///
/// Useful for hosts without an address bar (embedded players, server-side
/// previews) and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLinkContext {
    link: String,
    writes: usize,
}

impl StaticLinkContext {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            writes: 0,
        }
    }

    /// Number of times the link has been replaced
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LinkContext for StaticLinkContext {
    fn current_link(&self) -> String {
        self.link.clone()
    }

    fn replace_link(&mut self, link: &str) -> Result<()> {
        self.link = link.to_string();
        self.writes += 1;
        Ok(())
    }
}

impl<T: LinkContext> LinkContext for std::rc::Rc<std::cell::RefCell<T>> {
    fn current_link(&self) -> String {
        self.borrow().current_link()
    }

    fn replace_link(&mut self, link: &str) -> Result<()> {
        self.borrow_mut().replace_link(link)
    }
}
