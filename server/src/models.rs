use std::{fmt, num::NonZeroU64, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sequential short identifier. Always positive; the first URL registered
/// receives `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(NonZeroU64);

impl ShortId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Id for the entry stored at `index` of a zero-based forward index.
    pub(crate) fn from_index(index: usize) -> Self {
        // `usize` never exceeds `u64` on supported targets, so `index + 1` is nonzero.
        Self(NonZeroU64::MIN.saturating_add(index as u64))
    }

    /// Zero-based position of this id in the forward index.
    pub(crate) fn index(self) -> Option<usize> {
        usize::try_from(self.get() - 1).ok()
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Parses a path segment. Anything other than a positive decimal integer
/// that fits in a `u64` is an unknown id.
impl FromStr for ShortId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or(AppError::InvalidId)
    }
}

/// A registered mapping. `url` is exactly what the caller submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortEntry {
    pub id: ShortId,
    pub url: String,
}

/// Hostname that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname(String);

impl Hostname {
    pub(crate) fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Wire types ─────────────────────────────────────────────────────────────

/// Body of `POST /api/shorturl`. A missing `url` field decodes to `""`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlSubmission {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlResponse {
    pub original_url: String,
    pub short_url: ShortId,
}

impl From<ShortEntry> for ShortUrlResponse {
    fn from(entry: ShortEntry) -> Self {
        Self {
            original_url: entry.url,
            short_url: entry.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        assert_eq!("1".parse::<ShortId>().unwrap().get(), 1);
        assert_eq!(" 42 ".parse::<ShortId>().unwrap().get(), 42);
        assert_eq!("+7".parse::<ShortId>().unwrap().get(), 7);
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["0", "-1", "1.5", "abc", "", "1e3", "18446744073709551616"] {
            assert_eq!(raw.parse::<ShortId>(), Err(AppError::InvalidId), "{raw:?}");
        }
    }

    #[test]
    fn index_and_id_line_up() {
        assert_eq!(ShortId::from_index(0).get(), 1);
        assert_eq!(ShortId::from_index(9).get(), 10);
        assert_eq!(ShortId::new(10).unwrap().index(), Some(9));
    }

    #[test]
    fn response_serializes_id_as_integer() {
        let body = serde_json::to_value(ShortUrlResponse {
            original_url: "https://www.example.com".into(),
            short_url: ShortId::new(1).unwrap(),
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "original_url": "https://www.example.com", "short_url": 1 })
        );
    }
}
