use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    crypto::csrf::verify_csrf_token,
    error::AppError,
    middleware_layer::auth::extract_session_token,
    state::AppState,
};

/// The header carrying the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// A middleware that verifies the CSRF token is bound to the current session.
pub async fn verify_csrf(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        tracing::debug!("✅ CSRF exemption: {} request", req.method());
        return Ok(next.run(req).await);
    }

    let session_token = extract_session_token(&cookies)
        .ok_or_else(|| AppError::Csrf("No session cookie".to_string()))?;

    let header = req
        .headers()
        .get(CSRF_HEADER)
        .ok_or_else(|| AppError::Csrf("Missing CSRF token header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Csrf("Invalid CSRF token format".to_string()))?;

    if !verify_csrf_token(state.csrf_secret(), &session_token, header) {
        return Err(AppError::Csrf("Token not bound to this session".to_string()));
    }

    tracing::debug!("✅ CSRF token valid");
    Ok(next.run(req).await)
}
