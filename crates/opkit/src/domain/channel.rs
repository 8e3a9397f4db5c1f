//! Upgrade channels.

use serde::Serialize;

/// A named upgrade track within a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    name: String,
    is_default: bool,
    head: String,
    versions: Vec<String>,
}

impl Channel {
    /// Create a channel pointing at `head`. Versions are empty until resolved.
    pub fn new(name: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            head: head.into(),
            versions: Vec::new(),
        }
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the package's default channel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// CSV name at the head of the channel (`currentCSV`).
    #[must_use]
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Resolved version list, head first.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub(crate) fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    pub(crate) fn set_head(&mut self, head: String) {
        self.head = head;
    }

    pub(crate) fn set_versions(&mut self, versions: Vec<String>) {
        self.versions = versions;
    }

    /// Test helper: build a channel with an explicit version list.
    #[cfg(test)]
    pub(crate) fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }
}
