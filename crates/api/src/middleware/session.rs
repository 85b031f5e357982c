//! Anonymous session cookie middleware.
//!
//! Every request gets an annotator identity: the `annotator_id` cookie
//! when present, otherwise a fresh uuid that is set on the response.
//! Handlers read the identity through the [`Annotator`] extractor.

use axum::extract::{FromRequestParts, Request};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::error::AppError;
use crate::session::SESSION_COOKIE;

/// Anonymous annotator identity for the current request.
///
/// Use this as an extractor parameter in any handler that touches
/// session state:
///
/// ```ignore
/// async fn my_handler(annotator: Annotator) -> AppResult<Json<()>> {
///     tracing::info!(identity = %annotator.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Annotator {
    /// Opaque session token; a lookup key only, never durable.
    pub id: String,
}

impl<S> FromRequestParts<S> for Annotator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Annotator>().cloned().ok_or_else(|| {
            AppError::InternalError("session middleware not installed".to_string())
        })
    }
}

/// Ensure the request carries an annotator identity, issuing a cookie
/// for new sessions.
pub async fn ensure_session(mut req: Request, next: Next) -> Response {
    let existing = req
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| cookie_value(header, SESSION_COOKIE));

    let (id, fresh) = match existing {
        Some(id) if !id.is_empty() => (id, false),
        _ => (Uuid::new_v4().simple().to_string(), true),
    };

    req.extensions_mut().insert(Annotator { id: id.clone() });
    let mut response = next.run(req).await;

    if fresh {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Extract one cookie value out of a `Cookie` header line.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_the_named_cookie() {
        let header = "theme=dark; annotator_id=abc123; lang=en";
        assert_eq!(cookie_value(header, "annotator_id").as_deref(), Some("abc123"));
    }

    #[test]
    fn cookie_value_missing_cookie_is_none() {
        assert_eq!(cookie_value("theme=dark", "annotator_id"), None);
    }

    #[test]
    fn cookie_value_handles_single_cookie_without_spaces() {
        assert_eq!(
            cookie_value("annotator_id=xyz", "annotator_id").as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn cookie_value_does_not_match_prefixes() {
        assert_eq!(cookie_value("annotator_id_old=xyz", "annotator_id"), None);
    }
}
