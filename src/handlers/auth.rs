use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::cookie::{time::Duration, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::{
    crypto::csrf::generate_csrf_token,
    error::{AppError, Result},
    middleware_layer::auth::SESSION_COOKIE,
    models::session::AuthenticatedUser,
    state::AppState,
    validation::auth::{validate_login, LoginRequest},
};

/// The cookie carrying the session-bound CSRF token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

/// The response payload describing the current session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub username: String,
}

/// Creates a cookie with the flags the environment calls for.
///
/// The CSRF cookie stays readable by scripts so they can echo it in a header.
fn create_secure_cookie(
    state: &AppState,
    name: &'static str,
    value: String,
    max_age_secs: i64,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);

    if name != CSRF_COOKIE {
        cookie.set_http_only(true);
    }

    if state.config.is_production() {
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::Strict);
    } else {
        cookie.set_same_site(SameSite::Lax);
    }

    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");

    cookie
}

/// Handles login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt - Payload: {:?}", payload);
    validate_login(&payload)?;

    if !state
        .credentials
        .authenticate(&payload.username, &payload.password)
    {
        return Err(AppError::Authentication(
            "Invalid username or password".to_string(),
        ));
    }

    let session_token = state.tokens.issue(&payload.username)?;
    let csrf_token = generate_csrf_token(state.csrf_secret(), &session_token)?;
    let max_age = state.tokens.validity().num_seconds();

    cookies.add(create_secure_cookie(
        &state,
        SESSION_COOKIE,
        session_token,
        max_age,
    ));
    cookies.add(create_secure_cookie(
        &state,
        CSRF_COOKIE,
        csrf_token.clone(),
        max_age,
    ));

    tracing::info!("✅ User logged in: {}", payload.username);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        csrf_token: Some(csrf_token),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles logout.
///
/// Tokens are not revocable; logging out only clears the client's cookies.
pub async fn logout(
    Extension(user): Extension<AuthenticatedUser>,
    cookies: Cookies,
) -> Result<Response> {
    tracing::info!("👋 Logout for user: {}", user.username);

    for name in [SESSION_COOKIE, CSRF_COOKIE] {
        let mut cookie = Cookie::new(name, "");
        cookie.set_max_age(Duration::seconds(0));
        cookie.set_path("/");
        cookies.remove(cookie);
    }

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
        csrf_token: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the identity behind the current session.
pub async fn session(Extension(user): Extension<AuthenticatedUser>) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: user.username,
    })
}
