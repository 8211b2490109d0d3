//! Pagination cursors
//!
//! A cursor marks the last item a query evaluated. It carries that item's
//! key attributes (table keys, plus index keys when an index was queried)
//! so the store can resume strictly after it.
//!
//! Callers treat the cursor as opaque: `to_token` / `from_token` give a
//! URL-safe string that survives a round trip through a client.

mod errors;

pub use errors::{CursorError, CursorResult};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Continuation token returned by a query page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    keys: BTreeMap<String, Value>,
}

impl Cursor {
    /// Create an empty cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key attribute
    pub fn with_key(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.keys.insert(attribute.into(), value);
        self
    }

    /// Returns the value recorded for a key attribute
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.keys.get(attribute)
    }

    /// Returns all recorded key attributes in name order
    pub fn keys(&self) -> &BTreeMap<String, Value> {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Encode as an opaque URL-safe token
    pub fn to_token(&self) -> String {
        // BTreeMap keeps the JSON key order stable, so equal cursors give equal tokens.
        let json = serde_json::to_vec(&self.keys).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by `to_token`
    pub fn from_token(token: &str) -> CursorResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| CursorError::InvalidToken(e.to_string()))?;
        let keys: BTreeMap<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|e| CursorError::InvalidToken(e.to_string()))?;
        if keys.is_empty() {
            return Err(CursorError::InvalidToken("cursor has no keys".into()));
        }
        Ok(Self { keys })
    }
}

impl FromIterator<(String, Value)> for Cursor {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}
