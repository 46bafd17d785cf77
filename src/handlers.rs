use crate::{
    AppState,
    auth::{AuthService, Principal, Role},
    error::{ApiError, INTERNAL_ERROR_MESSAGE},
    extract::{ApiJson, ApiPath},
    models::{
        AccountSummary, CreateAccountRequest, CreateRecordRequest, Exercise, ExercisePayload,
        ExerciseRecord, LoginRequest, MessageResponse, NewAccount, Patient, PatientPayload,
        RegisterRequest, SessionResponse, UpdateAccountRequest, UpdateRecordRequest,
    },
};
use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;

/// Builds the confirmation body for a mutation, noting when no row matched.
fn confirm(rows: u64, table: &'static str, id: Option<i32>, mensaje: &str) -> Json<MessageResponse> {
    if rows == 0 {
        tracing::debug!(table, id, "mutation matched no rows");
    }
    Json(MessageResponse::ok(mensaje))
}

// --- Auth Handlers ---

/// register_user
///
/// [Public Route] Self-registration. The role is looked up from the access
/// code; the caller is not logged in afterwards.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = MessageResponse),
        (status = 400, description = "Unknown access code"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn register_user(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.register(
        &payload.correo,
        &payload.usuario,
        &payload.password,
        &payload.codigo_acceso,
    )
    .await?;
    Ok(Json(MessageResponse::ok("Usuario registrado correctamente")))
}

/// login
///
/// [Public Route] Always answers 200. Bad credentials give `{success:false}`
/// with no hint whether the account exists; an undecodable body or an
/// internal failure adds a generic `error` message.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses((status = 200, description = "Login outcome", body = SessionResponse))
)]
pub async fn login(
    State(auth): State<AuthService>,
    session: Session,
    payload: Result<ApiJson<LoginRequest>, ApiError>,
) -> Json<SessionResponse> {
    let ApiJson(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            return Json(SessionResponse::failed(
                e.public_message().unwrap_or(INTERNAL_ERROR_MESSAGE),
            ));
        }
    };

    match auth.login(&session, &payload.usuario, &payload.password).await {
        Ok(user) => Json(SessionResponse::authenticated(user)),
        Err(ApiError::AuthFailed) => Json(SessionResponse::anonymous()),
        Err(e) => {
            tracing::error!(error = %e, "login failed unexpectedly");
            Json(SessionResponse::failed(INTERNAL_ERROR_MESSAGE))
        }
    }
}

/// get_session
///
/// [Public Route] Reports who is logged in on this session.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current principal", body = SessionResponse))
)]
pub async fn get_session(State(auth): State<AuthService>, session: Session) -> Json<SessionResponse> {
    match auth.current_session(&session).await {
        Ok(Principal::Authenticated(user)) => Json(SessionResponse::authenticated(user)),
        Ok(Principal::Anonymous) => Json(SessionResponse::anonymous()),
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            Json(SessionResponse::anonymous())
        }
    }
}

/// logout
///
/// [Public Route] Destroys the session. Succeeds whether or not anyone was
/// logged in.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Session closed", body = MessageResponse))
)]
pub async fn logout(
    State(auth): State<AuthService>,
    session: Session,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.logout(&session).await?;
    Ok(Json(MessageResponse::ok("Sesión cerrada correctamente")))
}

// --- Account Administration (admin) ---

#[utoipa::path(
    get,
    path = "/usuarios",
    responses(
        (status = 200, description = "All accounts, without password hashes", body = [AccountSummary]),
        (status = 401, description = "No session"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    Ok(Json(state.repo.list_accounts().await?))
}

/// create_account
///
/// [Admin Route] Creates an account with an explicitly chosen role. A supplied
/// password is hashed exactly as on self-registration.
#[utoipa::path(
    post,
    path = "/usuarios",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Created", body = MessageResponse),
        (status = 400, description = "Unknown role")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if payload.rol == Role::Unrecognized {
        return Err(ApiError::InvalidRole);
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(auth.hash(password).await?),
        None => None,
    };

    let id = state
        .repo
        .create_account(NewAccount {
            nombre: payload.nombre,
            correo: payload.correo,
            rol: payload.rol.as_str().to_string(),
            codigo_acceso: payload.codigo_acceso,
            password_hash,
        })
        .await?;

    tracing::info!(id_usuario = id, rol = %payload.rol, "account created by admin");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("Usuario agregado correctamente")),
    ))
}

#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    params(("id" = i32, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses((status = 200, description = "Updated", body = MessageResponse))
)]
pub async fn update_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateAccountRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.rol == Role::Unrecognized {
        return Err(ApiError::InvalidRole);
    }
    let rows = state.repo.update_account(id, payload).await?;
    Ok(confirm(rows, "usuarios", Some(id), "Usuario actualizado correctamente"))
}

#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    params(("id" = i32, Path, description = "Account ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.delete_account(id).await?;
    Ok(confirm(rows, "usuarios", Some(id), "Usuario eliminado correctamente"))
}

// --- Patients (admin, therapist) ---

#[utoipa::path(
    get,
    path = "/pacientes",
    responses((status = 200, description = "All patients", body = [Patient]))
)]
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.repo.list_patients().await?))
}

#[utoipa::path(
    post,
    path = "/pacientes",
    request_body = PatientPayload,
    responses((status = 201, description = "Created", body = MessageResponse))
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let rows = state.repo.create_patient(payload).await?;
    Ok((
        StatusCode::CREATED,
        confirm(rows, "pacientes", None, "Paciente agregado correctamente"),
    ))
}

#[utoipa::path(
    put,
    path = "/pacientes/{id}",
    params(("id" = i32, Path, description = "Patient ID")),
    request_body = PatientPayload,
    responses((status = 200, description = "Updated", body = MessageResponse))
)]
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.update_patient(id, payload).await?;
    Ok(confirm(rows, "pacientes", Some(id), "Paciente actualizado correctamente"))
}

#[utoipa::path(
    delete,
    path = "/pacientes/{id}",
    params(("id" = i32, Path, description = "Patient ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse))
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.delete_patient(id).await?;
    Ok(confirm(rows, "pacientes", Some(id), "Paciente eliminado correctamente"))
}

// --- Exercises (read: any role; write: admin, therapist) ---

#[utoipa::path(
    get,
    path = "/ejercicios",
    responses((status = 200, description = "Exercise catalogue", body = [Exercise]))
)]
pub async fn list_exercises(
    State(state): State<AppState>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    Ok(Json(state.repo.list_exercises().await?))
}

#[utoipa::path(
    post,
    path = "/ejercicios",
    request_body = ExercisePayload,
    responses((status = 200, description = "Created", body = MessageResponse))
)]
pub async fn create_exercise(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ExercisePayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.create_exercise(payload).await?;
    Ok(confirm(rows, "ejercicios", None, "Ejercicio agregado correctamente"))
}

#[utoipa::path(
    put,
    path = "/ejercicios/{id}",
    params(("id" = i32, Path, description = "Exercise ID")),
    request_body = ExercisePayload,
    responses((status = 200, description = "Updated", body = MessageResponse))
)]
pub async fn update_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<ExercisePayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.update_exercise(id, payload).await?;
    Ok(confirm(rows, "ejercicios", Some(id), "Ejercicio actualizado correctamente"))
}

#[utoipa::path(
    delete,
    path = "/ejercicios/{id}",
    params(("id" = i32, Path, description = "Exercise ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse))
)]
pub async fn delete_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.delete_exercise(id).await?;
    Ok(confirm(rows, "ejercicios", Some(id), "Ejercicio eliminado correctamente"))
}

// --- Exercise Records (admin, therapist) ---

#[utoipa::path(
    get,
    path = "/registro",
    responses((status = 200, description = "Exercise log, newest first", body = [ExerciseRecord]))
)]
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExerciseRecord>>, ApiError> {
    Ok(Json(state.repo.list_records().await?))
}

#[utoipa::path(
    post,
    path = "/registro",
    request_body = CreateRecordRequest,
    responses((status = 200, description = "Saved", body = MessageResponse))
)]
pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateRecordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.create_record(payload).await?;
    Ok(confirm(rows, "registro_ejercicios", None, "Registro guardado exitosamente"))
}

#[utoipa::path(
    put,
    path = "/registro/{id}",
    params(("id" = i32, Path, description = "Record ID")),
    request_body = UpdateRecordRequest,
    responses((status = 200, description = "Updated", body = MessageResponse))
)]
pub async fn update_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateRecordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.update_record(id, payload).await?;
    Ok(confirm(rows, "registro_ejercicios", Some(id), "Registro actualizado correctamente"))
}

#[utoipa::path(
    delete,
    path = "/registro/{id}",
    params(("id" = i32, Path, description = "Record ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse))
)]
pub async fn delete_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = state.repo.delete_record(id).await?;
    Ok(confirm(rows, "registro_ejercicios", Some(id), "Registro eliminado exitosamente"))
}
