use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{Level, Span};

// --- Module Structure ---

// Core services: identity, authorization, persistence.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing grouped by access level (public, admin, clinic staff).
pub mod routes;
use routes::{admin, clinic, public};

// --- Public Re-exports ---

pub use auth::{AuthService, Principal, Role, SessionAccessor, SessionUser};
pub use config::AppConfig;
pub use error::ApiError;
pub use guard::RoleGate;
pub use repository::{PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login, handlers::get_session, handlers::logout,
        handlers::list_accounts, handlers::create_account, handlers::update_account,
        handlers::delete_account, handlers::list_patients, handlers::create_patient,
        handlers::update_patient, handlers::delete_patient, handlers::list_exercises,
        handlers::create_exercise, handlers::update_exercise, handlers::delete_exercise,
        handlers::list_records, handlers::create_record, handlers::update_record,
        handlers::delete_record
    ),
    components(
        schemas(
            auth::SessionUser, models::RegisterRequest, models::LoginRequest,
            models::SessionResponse, models::MessageResponse, models::AccountSummary,
            models::CreateAccountRequest, models::UpdateAccountRequest, models::Patient,
            models::PatientPayload, models::Exercise, models::ExercisePayload,
            models::ExerciseRecord, models::CreateRecordRequest, models::UpdateRecordRequest,
        )
    ),
    tags(
        (name = "clinic-portal", description = "Rehabilitation clinic administration API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable application state cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (PostgreSQL in production, in-memory in tests).
    pub repo: RepositoryState,
    /// The loaded environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_layer
///
/// Cookie-backed sessions held in process memory. Sessions expire after the
/// configured idle period; the cookie is marked `Secure` outside local mode.
pub fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name("clinic.sid")
        .with_secure(config.env == config::Env::Production)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.session_idle_minutes,
        )))
}

/// create_router
///
/// Assembles the routing tree, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let sessions = session_layer(&state.config);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Guarded groups: each verb carries its own role-gate.
        .merge(admin::admin_routes())
        .merge(clinic::clinic_routes())
        .with_state(state)
        // Sessions wrap every route so the guard and the auth handlers can reach them.
        .layer(sessions);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the request id, so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
