use std::{fmt, sync::OnceLock};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    AppState,
    error::ApiError,
    models::NewAccount,
    repository::RepositoryState,
};

/// Session key under which the authenticated [`SessionUser`] is stored.
pub const PRINCIPAL_KEY: &str = "usuario";

/// Role
///
/// The clinic's fixed role enumeration. Stored role strings outside the set
/// parse to `Unrecognized`, which is a valid session state that no route gate
/// admits. The Spanish names used by the clinic's access-code table are
/// accepted as aliases; the canonical English name is what gets serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Therapist,
    Patient,
    Unrecognized,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Therapist => "therapist",
            Role::Patient => "patient",
            Role::Unrecognized => "unrecognized",
        }
    }

    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Role::Admin,
            "therapist" | "fisioterapeuta" => Role::Therapist,
            "patient" | "paciente" => Role::Patient,
            _ => Role::Unrecognized,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SessionUser
///
/// The identity bound to a session on successful login. Its role is a snapshot
/// taken at login time and is not re-read from the store while the session lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionUser {
    pub id_usuario: i32,
    pub nombre: String,
    /// Role string exactly as stored on the account.
    #[schema(example = "therapist")]
    pub rol: String,
}

impl SessionUser {
    /// The stored role parsed for authorization.
    pub fn role(&self) -> Role {
        Role::parse(&self.rol)
    }
}

/// Principal
///
/// What a request knows about its caller. Resolved from the session by the
/// `FromRequestParts` implementation below; never fails for a missing login,
/// only for a broken session store.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Anonymous,
    Authenticated(SessionUser),
}

impl Principal {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(user) => Some(user),
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, reason)| {
                tracing::error!(%status, reason, "session extractor rejected request");
                ApiError::SessionUnavailable
            })?;

        session.principal().await
    }
}

/// SessionAccessor
///
/// Session lifecycle as seen by the auth layer. The production implementation
/// is `tower_sessions::Session`; tests substitute an in-memory accessor.
#[async_trait]
pub trait SessionAccessor: Send + Sync {
    /// The principal currently bound to the session.
    async fn principal(&self) -> Result<Principal, ApiError>;
    /// Binds `user` to the session, replacing any previous principal.
    async fn bind(&self, user: &SessionUser) -> Result<(), ApiError>;
    /// Destroys the session.
    async fn clear(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl SessionAccessor for Session {
    async fn principal(&self) -> Result<Principal, ApiError> {
        let user = self.get::<SessionUser>(PRINCIPAL_KEY).await?;
        Ok(user.map_or(Principal::Anonymous, Principal::Authenticated))
    }

    async fn bind(&self, user: &SessionUser) -> Result<(), ApiError> {
        // A fresh id on privilege change keeps a pre-login cookie from being reused.
        self.cycle_id().await?;
        self.insert(PRINCIPAL_KEY, user).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.flush().await?;
        Ok(())
    }
}

/// Hashes `password` with bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Checks `password` against a stored bcrypt hash on the blocking pool.
///
/// A malformed stored hash counts as a mismatch so callers cannot tell it
/// apart from a wrong password.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let verdict = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    Ok(verdict.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stored password hash could not be parsed");
        false
    }))
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Burns one bcrypt verification when there is no account to check against.
async fn verify_against_dummy(password: String, cost: u32) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || {
        let hash = DUMMY_HASH
            .get_or_init(|| bcrypt::hash("placeholder-password", cost).unwrap_or_default());
        let _ = bcrypt::verify(password, hash);
    })
    .await?;
    Ok(())
}

/// AuthService
///
/// Registration, login and session queries. Depends on the repository for
/// credentials and access codes, and on a [`SessionAccessor`] passed per call
/// for session state; it holds no session state of its own.
#[derive(Clone)]
pub struct AuthService {
    repo: RepositoryState,
    bcrypt_cost: u32,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> AuthService {
        AuthService::new(state.repo.clone(), state.config.bcrypt_cost)
    }
}

impl AuthService {
    pub fn new(repo: RepositoryState, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// register
    ///
    /// Creates an account whose role is taken from the access-code registry.
    /// An unknown code fails before anything is hashed or written. Does not
    /// log the new account in.
    pub async fn register(
        &self,
        correo: &str,
        usuario: &str,
        password: &str,
        codigo_acceso: &str,
    ) -> Result<(), ApiError> {
        let Some(rol) = self.repo.find_access_code_role(codigo_acceso).await? else {
            tracing::info!(usuario, "registration rejected: unknown access code");
            return Err(ApiError::InvalidAccessCode);
        };

        let password_hash = hash_password(password.to_string(), self.bcrypt_cost).await?;

        let id = self
            .repo
            .create_account(NewAccount {
                nombre: usuario.to_string(),
                correo: Some(correo.to_string()),
                rol: rol.clone(),
                codigo_acceso: Some(codigo_acceso.to_string()),
                password_hash: Some(password_hash),
            })
            .await?;

        tracing::info!(id_usuario = id, usuario, rol, "account registered");
        Ok(())
    }

    /// login
    ///
    /// Matches `usuario` against either the account name or email. Every
    /// credential failure is the same `AuthFailed`. On success the principal
    /// is bound to `session` and returned.
    pub async fn login(
        &self,
        session: &dyn SessionAccessor,
        usuario: &str,
        password: &str,
    ) -> Result<SessionUser, ApiError> {
        let account = self.repo.find_account_by_login(usuario).await?;

        let stored = account
            .as_ref()
            .and_then(|account| account.password.clone());

        let matched = match stored {
            Some(hash) => verify_password(password.to_string(), hash).await?,
            None => {
                verify_against_dummy(password.to_string(), self.bcrypt_cost).await?;
                false
            }
        };

        let account = match account {
            Some(account) if matched => account,
            _ => {
                tracing::info!(usuario, "login rejected");
                return Err(ApiError::AuthFailed);
            }
        };

        let user = SessionUser {
            id_usuario: account.id_usuario,
            nombre: account.nombre,
            rol: account.rol,
        };
        session.bind(&user).await?;

        tracing::info!(id_usuario = user.id_usuario, rol = %user.rol, role = %user.role(), "login succeeded");
        Ok(user)
    }

    /// The principal bound to `session`, or `Anonymous`.
    pub async fn current_session(
        &self,
        session: &dyn SessionAccessor,
    ) -> Result<Principal, ApiError> {
        session.principal().await
    }

    pub async fn logout(&self, session: &dyn SessionAccessor) -> Result<(), ApiError> {
        if let Principal::Authenticated(user) = session.principal().await? {
            tracing::info!(id_usuario = user.id_usuario, "logout");
        }
        session.clear().await
    }

    /// Hashes a password with this service's work factor. Used by the admin
    /// account-creation route.
    pub async fn hash(&self, password: &str) -> Result<String, ApiError> {
        hash_password(password.to_string(), self.bcrypt_cost).await
    }
}
