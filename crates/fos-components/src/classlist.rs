//! Class List
//!
//! Ordered, duplicate-free classname tokens with a pinned base class.

use std::fmt;

/// Classname token list.
///
/// Many components have a base class which acts as the root for derived
/// classnames (`nav__item` → `nav__item-wrapper`). When set, the base
/// class always occupies index 0; every other token is a modifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
    has_base: bool,
}

impl ClassList {
    /// Create empty class list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        list.add(s.split_whitespace());
        list
    }

    /// Get number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if there are no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append tokens that are not already present
    pub fn add<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let token = token.as_ref().trim();
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    /// Remove tokens. Removing the base class clears the base slot.
    pub fn remove<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let token = token.as_ref();
            if let Some(pos) = self.tokens.iter().position(|t| t == token) {
                if pos == 0 && self.has_base {
                    self.has_base = false;
                }
                self.tokens.remove(pos);
            }
        }
    }

    /// Set the base class. Blank tokens are ignored.
    pub fn set_base(&mut self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }

        if self.has_base {
            self.tokens[0] = token.to_string();
        } else {
            self.tokens.insert(0, token.to_string());
            self.has_base = true;
        }

        self.dedup();
    }

    /// Get the base class, if one was set
    pub fn base(&self) -> Option<&str> {
        if self.has_base {
            self.item(0)
        } else {
            None
        }
    }

    /// Tokens which are not the base class
    pub fn modifiers(&self) -> &[String] {
        if self.has_base {
            &self.tokens[1..]
        } else {
            &self.tokens
        }
    }

    /// Iterate over tokens, base first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    // First occurrence wins, so the base at index 0 always survives.
    fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.tokens.len());
        self.tokens.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(t.clone());
                true
            }
        });
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
