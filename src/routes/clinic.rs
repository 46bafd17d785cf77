use crate::{
    AppState,
    guard::{RoleGate, restrict},
    handlers,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Clinic Router Module
///
/// Patients, exercises and exercise records. Gates differ per verb: anyone
/// with a clinic role may read the exercise catalogue, but only staff
/// (admin, therapist) may write it or touch patients and records.
pub fn clinic_routes() -> Router<AppState> {
    let staff = RoleGate::STAFF;

    Router::new()
        // --- Patients ---
        .route(
            "/pacientes",
            restrict(get(handlers::list_patients), staff)
                .merge(restrict(post(handlers::create_patient), staff)),
        )
        .route(
            "/pacientes/{id}",
            restrict(put(handlers::update_patient), staff)
                .merge(restrict(delete(handlers::delete_patient), staff)),
        )
        // --- Exercises ---
        // GET is the only route patients can reach.
        .route(
            "/ejercicios",
            restrict(get(handlers::list_exercises), RoleGate::CLINIC)
                .merge(restrict(post(handlers::create_exercise), staff)),
        )
        .route(
            "/ejercicios/{id}",
            restrict(put(handlers::update_exercise), staff)
                .merge(restrict(delete(handlers::delete_exercise), staff)),
        )
        // --- Exercise Records ---
        .route(
            "/registro",
            restrict(get(handlers::list_records), staff)
                .merge(restrict(post(handlers::create_record), staff)),
        )
        .route(
            "/registro/{id}",
            restrict(put(handlers::update_record), staff)
                .merge(restrict(delete(handlers::delete_record), staff)),
        )
}
