/// Router Module Index
///
/// Routes are grouped by who may reach them. Public routes carry no guard;
/// every verb in the other groups is wrapped with `guard::restrict` and its
/// own role-gate, so two verbs on the same path can admit different roles.

/// Health check and the auth endpoints (register, login, session, logout).
pub mod public;

/// Account administration under `/usuarios`. Admin only.
pub mod admin;

/// Patients, exercises and exercise records. Staff, with read access to the
/// exercise catalogue for patients.
pub mod clinic;
