use crate::models::{
    Account, AccountSummary, CreateRecordRequest, Exercise, ExercisePayload, ExerciseRecord,
    NewAccount, Patient, PatientPayload, UpdateAccountRequest, UpdateRecordRequest,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Result of every persistence call. Errors are left as `sqlx::Error` and
/// mapped to a generic 500 at the route boundary.
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// The persistence contract the auth layer and resource handlers depend on.
/// Mutations return the number of affected rows.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` usable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store & Access Codes ---
    /// Role string granted by `codigo`, if the code exists.
    async fn find_access_code_role(&self, codigo: &str) -> RepoResult<Option<String>>;
    /// Account whose name OR email equals `login`.
    async fn find_account_by_login(&self, login: &str) -> RepoResult<Option<Account>>;
    /// Inserts an account and returns its id.
    async fn create_account(&self, account: NewAccount) -> RepoResult<i32>;

    // --- Account Administration ---
    async fn list_accounts(&self) -> RepoResult<Vec<AccountSummary>>;
    async fn update_account(&self, id: i32, req: UpdateAccountRequest) -> RepoResult<u64>;
    async fn delete_account(&self, id: i32) -> RepoResult<u64>;

    // --- Patients ---
    async fn list_patients(&self) -> RepoResult<Vec<Patient>>;
    async fn create_patient(&self, req: PatientPayload) -> RepoResult<u64>;
    async fn update_patient(&self, id: i32, req: PatientPayload) -> RepoResult<u64>;
    async fn delete_patient(&self, id: i32) -> RepoResult<u64>;

    // --- Exercises ---
    async fn list_exercises(&self) -> RepoResult<Vec<Exercise>>;
    async fn create_exercise(&self, req: ExercisePayload) -> RepoResult<u64>;
    async fn update_exercise(&self, id: i32, req: ExercisePayload) -> RepoResult<u64>;
    async fn delete_exercise(&self, id: i32) -> RepoResult<u64>;

    // --- Exercise Records ---
    async fn list_records(&self) -> RepoResult<Vec<ExerciseRecord>>;
    async fn create_record(&self, req: CreateRecordRequest) -> RepoResult<u64>;
    async fn update_record(&self, id: i32, req: UpdateRecordRequest) -> RepoResult<u64>;
    async fn delete_record(&self, id: i32) -> RepoResult<u64>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the clinic's PostgreSQL database. All statements are
/// bound at runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_access_code_role(&self, codigo: &str) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT tipo_usuario FROM codigos_acceso WHERE codigo = $1")
            .bind(codigo)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_account_by_login(&self, login: &str) -> RepoResult<Option<Account>> {
        // Name and email are both unique, but nothing stops one account's name from
        // equalling another's email; the lowest id wins so the match is stable.
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id_usuario, nombre, correo, rol, codigo_acceso, password
            FROM usuarios
            WHERE nombre = $1 OR correo = $1
            ORDER BY id_usuario
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_account(&self, account: NewAccount) -> RepoResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO usuarios (nombre, rol, codigo_acceso, correo, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_usuario
            "#,
        )
        .bind(account.nombre)
        .bind(account.rol)
        .bind(account.codigo_acceso)
        .bind(account.correo)
        .bind(account.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// Explicit column list: the password hash never leaves the database here.
    async fn list_accounts(&self) -> RepoResult<Vec<AccountSummary>> {
        sqlx::query_as::<_, AccountSummary>(
            "SELECT id_usuario, nombre, correo, rol, codigo_acceso FROM usuarios ORDER BY id_usuario",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn update_account(&self, id: i32, req: UpdateAccountRequest) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE usuarios SET nombre = $1, correo = $2, rol = $3 WHERE id_usuario = $4",
        )
        .bind(req.nombre)
        .bind(req.correo)
        .bind(req.rol.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_account(&self, id: i32) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        sqlx::query_as::<_, Patient>(
            r#"
            SELECT id_paciente, nombre, edad, lesion, estado_salud, fecha_registro
            FROM pacientes
            ORDER BY id_paciente
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_patient(&self, req: PatientPayload) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO pacientes (nombre, edad, lesion, estado_salud, fecha_registro)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(req.nombre)
        .bind(req.edad)
        .bind(req.lesion)
        .bind(req.estado_salud)
        .bind(req.fecha_registro)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_patient(&self, id: i32, req: PatientPayload) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE pacientes
            SET nombre = $1, edad = $2, lesion = $3, estado_salud = $4, fecha_registro = $5
            WHERE id_paciente = $6
            "#,
        )
        .bind(req.nombre)
        .bind(req.edad)
        .bind(req.lesion)
        .bind(req.estado_salud)
        .bind(req.fecha_registro)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_patient(&self, id: i32) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM pacientes WHERE id_paciente = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_exercises(&self) -> RepoResult<Vec<Exercise>> {
        sqlx::query_as::<_, Exercise>(
            "SELECT id_ejercicio, nombre, zona_cuerpo, descripcion FROM ejercicios ORDER BY id_ejercicio",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_exercise(&self, req: ExercisePayload) -> RepoResult<u64> {
        let result = sqlx::query(
            "INSERT INTO ejercicios (nombre, zona_cuerpo, descripcion) VALUES ($1, $2, $3)",
        )
        .bind(req.nombre)
        .bind(req.zona_cuerpo)
        .bind(req.descripcion)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_exercise(&self, id: i32, req: ExercisePayload) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE ejercicios SET nombre = $1, zona_cuerpo = $2, descripcion = $3 WHERE id_ejercicio = $4",
        )
        .bind(req.nombre)
        .bind(req.zona_cuerpo)
        .bind(req.descripcion)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_exercise(&self, id: i32) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM ejercicios WHERE id_ejercicio = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_records(&self) -> RepoResult<Vec<ExerciseRecord>> {
        sqlx::query_as::<_, ExerciseRecord>(
            r#"
            SELECT id_registro, paciente, ejercicio, observaciones, fecha
            FROM registro_ejercicios
            ORDER BY fecha DESC, id_registro DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_record(&self, req: CreateRecordRequest) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO registro_ejercicios (paciente, ejercicio, observaciones, fecha)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(req.paciente)
        .bind(req.ejercicio)
        .bind(req.observaciones)
        .bind(req.fecha)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_record(&self, id: i32, req: UpdateRecordRequest) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE registro_ejercicios
            SET ejercicio = $1, observaciones = $2, fecha = $3
            WHERE id_registro = $4
            "#,
        )
        .bind(req.ejercicio)
        .bind(req.observaciones)
        .bind(req.fecha)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_record(&self, id: i32) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM registro_ejercicios WHERE id_registro = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
