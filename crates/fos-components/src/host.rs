//! Render Host
//!
//! The view-side collaborator that evaluates content callbacks.

use std::fmt;

use crate::error::Result;
use crate::tree::{ElementId, ElementTree};

/// Opaque content produced by a capture or render pass.
///
/// The engine only stores it and exposes it as the element's string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Captured(String);

impl Captured {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Captured {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Captured {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Content callback, evaluated once against the element being built
pub type Content<'a> = Box<dyn FnOnce(&mut ElementTree, ElementId) -> Result<Captured> + 'a>;

/// Box a closure as a [`Content`] callback
pub fn content<'a, F>(f: F) -> Content<'a>
where
    F: FnOnce(&mut ElementTree, ElementId) -> Result<Captured> + 'a,
{
    Box::new(f)
}

/// View context shared by every element of a tree
pub trait RenderHost {
    /// Evaluate `content` with the element as its argument
    fn capture(&self, tree: &mut ElementTree, id: ElementId, content: Content<'_>) -> Result<Captured>;
}

/// Host that calls content callbacks directly, with no output buffering
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectHost;

impl RenderHost for DirectHost {
    fn capture(&self, tree: &mut ElementTree, id: ElementId, content: Content<'_>) -> Result<Captured> {
        content(tree, id)
    }
}
