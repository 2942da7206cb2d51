//! Board identity derived from the host page address

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref BOARD_PATH: Regex = Regex::new(r"/boards/(\d+)").unwrap();
}

/// Numeric board identifier, kept as the string it appears as in the URL
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the board id from a page address.
    ///
    /// Returns `None` ("no board") when the address has no `/boards/<digits>`
    /// segment.
    pub fn from_url(url: &str) -> Option<Self> {
        BOARD_PATH
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BoardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of observing a new address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTransition {
    pub from: Option<BoardId>,
    pub to: Option<BoardId>,
}
