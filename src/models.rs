use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::auth::{Role, SessionUser};

// --- Accounts ---

/// Account
///
/// A full row of the `usuarios` table, including the password hash. Only the
/// auth layer reads this type; it is never serialized.
#[derive(Clone, FromRow)]
pub struct Account {
    pub id_usuario: i32,
    pub nombre: String,
    pub correo: Option<String>,
    // Raw role string as stored; parsed into `Role` when a session is created.
    pub rol: String,
    pub codigo_acceso: Option<String>,
    // bcrypt hash. Accounts created by an admin without a password have none.
    pub password: Option<String>,
}

/// AccountSummary
///
/// The columns of `usuarios` that are safe to list (GET /usuarios).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct AccountSummary {
    pub id_usuario: i32,
    pub nombre: String,
    pub correo: Option<String>,
    pub rol: String,
    pub codigo_acceso: Option<String>,
}

/// NewAccount
///
/// Insert payload for `usuarios`. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub nombre: String,
    pub correo: Option<String>,
    pub rol: String,
    pub codigo_acceso: Option<String>,
    pub password_hash: Option<String>,
}

// --- Auth Payloads ---

/// RegisterRequest
///
/// Self-registration (POST /register). The role comes from `codigo_acceso`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub correo: String,
    pub usuario: String,
    pub password: String,
    #[schema(example = "FISIO2024")]
    pub codigo_acceso: String,
}

/// LoginRequest
///
/// `usuario` may be either the account name or its email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub usuario: String,
    pub password: String,
}

/// SessionResponse
///
/// Body of POST /login and GET /session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionResponse {
    pub fn authenticated(user: SessionUser) -> Self {
        Self {
            success: true,
            usuario: Some(user),
            error: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            success: false,
            usuario: None,
            error: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            usuario: None,
            error: Some(message.to_string()),
        }
    }
}

/// MessageResponse
///
/// Confirmation body for every successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MessageResponse {
    pub success: bool,
    pub mensaje: String,
}

impl MessageResponse {
    pub fn ok(mensaje: &str) -> Self {
        Self {
            success: true,
            mensaje: mensaje.to_string(),
        }
    }
}

// --- Admin Account Management ---

/// CreateAccountRequest
///
/// Admin-side account creation (POST /usuarios). Unlike self-registration the
/// admin names the role directly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateAccountRequest {
    pub nombre: String,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "therapist")]
    pub rol: Role,
    #[serde(default)]
    pub codigo_acceso: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// UpdateAccountRequest
///
/// Admin edit (PUT /usuarios/{id}). Changing `rol` does not affect sessions
/// that are already open for the account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateAccountRequest {
    pub nombre: String,
    #[serde(default)]
    pub correo: Option<String>,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "patient")]
    pub rol: Role,
}

// --- Patients ---

/// Patient
///
/// A row of `pacientes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct Patient {
    pub id_paciente: i32,
    pub nombre: String,
    pub edad: i32,
    pub lesion: String,
    pub estado_salud: String,
    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub fecha_registro: NaiveDate,
}

/// Body of POST /pacientes and PUT /pacientes/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PatientPayload {
    pub nombre: String,
    pub edad: i32,
    pub lesion: String,
    pub estado_salud: String,
    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub fecha_registro: NaiveDate,
}

// --- Exercises ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct Exercise {
    pub id_ejercicio: i32,
    pub nombre: String,
    // Body area the exercise targets (e.g. "rodilla").
    pub zona_cuerpo: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ExercisePayload {
    pub nombre: String,
    pub zona_cuerpo: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

// --- Exercise Records ---

/// ExerciseRecord
///
/// A row of `registro_ejercicios`: one exercise performed by one patient on a
/// given date. `paciente` and `ejercicio` hold the names entered by the
/// therapist.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct ExerciseRecord {
    pub id_registro: i32,
    pub paciente: String,
    pub ejercicio: String,
    pub observaciones: Option<String>,
    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub fecha: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateRecordRequest {
    pub paciente: String,
    pub ejercicio: String,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub fecha: NaiveDate,
}

/// Body of PUT /registro/{id}. The patient of a record cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRecordRequest {
    pub ejercicio: String,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub fecha: NaiveDate,
}
