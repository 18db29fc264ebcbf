// Actor resolution middleware - resolves the bearer credential once per
// request and injects the acting identity into request extensions.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::Actor;

/// Pulls the bearer token out of the Authorization header. A missing header
/// is anonymous; a malformed one is rejected outright.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let value = match headers.get("authorization") {
        Some(value) => value,
        None => return Ok(None),
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Malformed authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(Some(token)),
        _ => Err(AppError::Unauthenticated(
            "Expected a bearer credential".to_string(),
        )),
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers())? {
        let actor = state.sessions.resolve(token).await?;
        request.extensions_mut().insert(Arc::new(actor));
    }

    Ok(next.run(request).await)
}

// Handlers that take an `Actor` argument are the protected ones; read paths
// simply omit it and serve anonymous traffic.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let actor = parts
            .extensions
            .get::<Arc<Actor>>()
            .map(|actor| (**actor).clone())
            .ok_or_else(|| AppError::Unauthenticated("Login required".to_string()));

        async move { actor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_present() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));

        assert_eq!(bearer_token(&headers).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));

        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn test_empty_bearer_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));

        assert!(bearer_token(&headers).is_err());
    }
}
