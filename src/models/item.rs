use serde::{Deserialize, Serialize};
use std::fmt;

// NewType pattern for type safety: the identifier is the page URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedItem(pub String);

impl TrackedItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackedItem {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}
