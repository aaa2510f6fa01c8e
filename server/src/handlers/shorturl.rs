use crate::{
    error::ApiError,
    models::{ShortUrlResponse, UrlSubmission},
    AppState,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue},
    Form, Json,
};
use std::{convert::Infallible, sync::Arc};

/// POST /api/shorturl
///
/// 1. Validate the submitted URL (hostname must resolve).
/// 2. Register it, or fetch the id it already has.
/// 3. Answer with `{ original_url, short_url }`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    UrlSubmission { url }: UrlSubmission,
) -> Result<Json<ShortUrlResponse>, ApiError> {
    // ── 1. Validate ────────────────────────────────────────────────────────
    let host = match state.validator.validate(&url).await {
        Ok(host) => host,
        Err(e) => {
            tracing::info!(%url, "rejected submission: {e}");
            return Err(e.with_policy(state.config.status_policy));
        }
    };

    // ── 2. Register ────────────────────────────────────────────────────────
    let entry = state.store.register_or_get(url).await;
    tracing::debug!(id = %entry.id, %host, "short url issued");

    // ── 3. Respond ─────────────────────────────────────────────────────────
    Ok(Json(entry.into()))
}

// ── Body decoding ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

/// Classify the request body by its media type. Media types compare
/// case-insensitively and parameters such as `charset` are ignored.
fn body_kind(req: &Request) -> BodyKind {
    let Some(essence) = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
    else {
        return BodyKind::Other;
    };

    let lower = essence.to_ascii_lowercase();
    if lower == "application/json" || (lower.starts_with("application/") && lower.ends_with("+json")) {
        BodyKind::Json
    } else if lower == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// Decodes a JSON or form-encoded body. Anything undecodable becomes an empty
/// submission so that the validator rejects it as an invalid url.
#[async_trait]
impl<S> FromRequest<S> for UrlSubmission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(&req);

        // axum's extractors match the media type case-sensitively, so hand
        // them the canonical spelling.
        let decoded = match kind {
            BodyKind::Json => {
                req.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Json::<UrlSubmission>::from_request(req, state)
                    .await
                    .map(|Json(submission)| submission)
                    .map_err(|rejection| rejection.body_text())
            }
            BodyKind::Form => {
                req.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                Form::<UrlSubmission>::from_request(req, state)
                    .await
                    .map(|Form(submission)| submission)
                    .map_err(|rejection| rejection.body_text())
            }
            BodyKind::Other => Err("unsupported content type".to_owned()),
        };

        Ok(decoded.unwrap_or_else(|reason| {
            tracing::debug!(%reason, ?kind, "undecodable submission body");
            UrlSubmission::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http};

    use super::*;

    fn with_content_type(content_type: &str) -> Request {
        http::Request::builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn media_type_is_case_insensitive() {
        for ct in ["application/json", "Application/JSON", "APPLICATION/JSON; charset=UTF-8"] {
            assert_eq!(body_kind(&with_content_type(ct)), BodyKind::Json, "{ct}");
        }
        for ct in [
            "application/x-www-form-urlencoded",
            "Application/X-WWW-Form-Urlencoded; charset=utf-8",
        ] {
            assert_eq!(body_kind(&with_content_type(ct)), BodyKind::Form, "{ct}");
        }
    }

    #[test]
    fn structured_json_suffix_is_json() {
        assert_eq!(
            body_kind(&with_content_type("application/vnd.api+json")),
            BodyKind::Json
        );
    }

    #[test]
    fn anything_else_is_other() {
        assert_eq!(body_kind(&with_content_type("text/plain")), BodyKind::Other);
        assert_eq!(body_kind(&with_content_type("application/jsonp")), BodyKind::Other);

        let bare = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(body_kind(&bare), BodyKind::Other);
    }
}
