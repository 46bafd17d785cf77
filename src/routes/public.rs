use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Login and session lookups always
/// answer 200 with a `success` flag; only registration uses error statuses.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Self-registration; the role is derived from the access code.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Binds the principal to the session cookie on success.
        .route("/login", post(handlers::login))
        // GET /session
        // Who is logged in on this cookie, if anyone.
        .route("/session", get(handlers::get_session))
        // POST /logout
        .route("/logout", post(handlers::logout))
}
