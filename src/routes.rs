use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::{
    error::{AppError, Result},
    handlers, middleware_layer,
    state::AppState,
};

/// Seconds between replenished login attempts per peer IP.
const LOGIN_REPLENISH_SECS: u64 = 4;
/// Login attempts a peer IP may burst before being throttled.
const LOGIN_BURST: u32 = 10;
/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Builds the application router.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the login rate
/// limiter can key on the peer address.
pub fn router(state: AppState) -> Result<Router> {
    let login_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(LOGIN_REPLENISH_SECS)
            .burst_size(LOGIN_BURST)
            .use_headers()
            .finish()
            .ok_or_else(|| AppError::Configuration("Invalid login rate limit".to_string()))?,
    );

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .with_state(state.clone());

    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(tower_governor::GovernorLayer::new(login_governor_conf))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/session", get(handlers::auth::session))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/fields/encrypt", post(handlers::fields::encrypt_fields))
        .route("/api/fields/decrypt", post(handlers::fields::decrypt_fields))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state);

    Ok(Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)))
}
