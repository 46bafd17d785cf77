use crate::{
    AppState,
    guard::{RoleGate, restrict},
    handlers,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// Account administration. Every verb is gated to `admin`.
pub fn admin_routes() -> Router<AppState> {
    let gate = RoleGate::ADMIN;

    Router::new()
        // GET/POST /usuarios
        // The listing selects explicit columns and never returns password hashes.
        .route(
            "/usuarios",
            restrict(get(handlers::list_accounts), gate)
                .merge(restrict(post(handlers::create_account), gate)),
        )
        // PUT/DELETE /usuarios/{id}
        // Role edits apply to future logins; open sessions keep their role.
        .route(
            "/usuarios/{id}",
            restrict(put(handlers::update_account), gate)
                .merge(restrict(delete(handlers::delete_account), gate)),
        )
}
