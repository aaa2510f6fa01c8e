use crate::{
    error::{ApiError, AppError},
    models::ShortId,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

/// GET /api/shorturl/:id
///
/// 1. Parse the path segment; anything that is not a positive integer is an
///    unknown id.
/// 2. Look the id up in the store.
/// 3. Return a 302 redirect to the original URL, or a 500 if the stored
///    string cannot be expressed as a `Location` header.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let policy = state.config.status_policy;

    // ── 1. Parse ───────────────────────────────────────────────────────────
    let id = raw_id.parse::<ShortId>().map_err(|e| {
        tracing::debug!(%raw_id, "unparseable short url id");
        e.with_policy(policy)
    })?;

    // ── 2. Resolve ─────────────────────────────────────────────────────────
    let Some(original_url) = state.store.resolve(id).await else {
        tracing::debug!(%id, "unknown short url id");
        return Err(AppError::InvalidId.with_policy(policy));
    };

    // ── 3. Redirect ────────────────────────────────────────────────────────
    let Some(location) = location_header(&original_url) else {
        tracing::error!(%id, %original_url, "stored url cannot be sent as a Location header");
        return Err(AppError::Internal.with_policy(policy));
    };

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Use the stored string verbatim when it is plain ASCII and a legal header
/// value, otherwise fall back to its percent-encoded serialization.
fn location_header(original_url: &str) -> Option<HeaderValue> {
    if original_url.is_ascii() {
        if let Ok(value) = HeaderValue::from_str(original_url) {
            return Some(value);
        }
    }

    let encoded = Url::parse(original_url).ok()?;
    HeaderValue::from_str(encoded.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_urls_are_used_verbatim() {
        let value = location_header("https://www.example.com/a b").unwrap();
        assert_eq!(value, "https://www.example.com/a b");
    }

    #[test]
    fn non_ascii_urls_are_percent_encoded() {
        let value = location_header("https://example.com/café").unwrap();
        assert_eq!(value, "https://example.com/caf%C3%A9");
    }

    #[test]
    fn control_characters_are_stripped() {
        let value = location_header("https://example.com/\npath").unwrap();
        assert_eq!(value, "https://example.com/path");
    }

    #[test]
    fn unparseable_non_ascii_has_no_header() {
        assert!(location_header("not a url é").is_none());
    }

    #[test]
    fn idn_hosts_are_punycoded() {
        let value = location_header("https://bücher.example/").unwrap();
        assert_eq!(value, "https://xn--bcher-kva.example/");
    }
}
