use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::session::AuthenticatedUser,
    state::AppState,
};

/// The cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Extracts the session token from the request cookies.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// A middleware that requires a valid session token cookie.
///
/// On success the caller's identity is inserted as an [`AuthenticatedUser`]
/// request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_session_token(&cookies).ok_or(AppError::Unauthorized)?;
    let username = state.tokens.verify(&token)?;

    // The token may outlive a change of the configured username.
    if username != state.credentials.username() {
        return Err(AppError::Authentication(
            "Session belongs to an unknown user".to_string(),
        ));
    }

    tracing::debug!("✅ User authenticated: {}", username);

    request
        .extensions_mut()
        .insert(AuthenticatedUser { username });

    Ok(next.run(request).await)
}
