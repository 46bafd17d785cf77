//! Route-level authorization.
//!
//! Every protected verb is wrapped with [`restrict`], which installs
//! [`require_roles`] as a route layer carrying that verb's [`RoleGate`]. The
//! check itself, [`RoleGate::authorize`], is a pure function of the principal
//! and the gate.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::{
    auth::{Principal, Role, SessionUser},
    error::ApiError,
};

/// RoleGate
///
/// The fixed set of roles allowed on one route and verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const ADMIN: RoleGate = RoleGate::new(&[Role::Admin]);
    pub const STAFF: RoleGate = RoleGate::new(&[Role::Admin, Role::Therapist]);
    pub const CLINIC: RoleGate = RoleGate::new(&[Role::Admin, Role::Therapist, Role::Patient]);

    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &'static [Role] {
        self.allowed
    }

    pub fn permits(&self, role: Role) -> bool {
        role != Role::Unrecognized && self.allowed.contains(&role)
    }

    /// Authentication first, then role membership.
    pub fn authorize<'p>(&self, principal: &'p Principal) -> Result<&'p SessionUser, ApiError> {
        match principal {
            Principal::Anonymous => Err(ApiError::Unauthorized),
            Principal::Authenticated(user) if self.permits(user.role()) => Ok(user),
            Principal::Authenticated(_) => Err(ApiError::Forbidden),
        }
    }
}

/// require_roles
///
/// Middleware half of the guard. Resolves the principal from the session and
/// lets the request through only if the gate admits it.
pub async fn require_roles(
    State(gate): State<RoleGate>,
    principal: Principal,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match gate.authorize(&principal) {
        Ok(user) => {
            tracing::debug!(id_usuario = user.id_usuario, rol = %user.role(), "access granted");
        }
        Err(denied) => {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                rol = principal.user().map(|u| u.rol.as_str()).unwrap_or("anonymous"),
                "access denied: {}",
                denied
            );
            return Err(denied);
        }
    }

    Ok(next.run(request).await)
}

/// Wraps a single-verb method router with the guard for `gate`.
pub fn restrict<S>(route: MethodRouter<S>, gate: RoleGate) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(gate, require_roles))
}
