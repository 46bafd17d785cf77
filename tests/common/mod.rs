#![allow(dead_code)]

use async_trait::async_trait;
use clinic_portal::{
    AppConfig, AppState, SessionAccessor, SessionUser,
    auth::Principal,
    config::MIN_BCRYPT_COST,
    error::ApiError,
    models::{
        Account, AccountSummary, CreateRecordRequest, Exercise, ExercisePayload, ExerciseRecord,
        NewAccount, Patient, PatientPayload, UpdateAccountRequest, UpdateRecordRequest,
    },
    repository::{RepoResult, Repository},
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

// --- In-Memory Repository ---

#[derive(Default)]
struct Tables {
    codes: HashMap<String, String>,
    accounts: Vec<Account>,
    patients: Vec<Patient>,
    exercises: Vec<Exercise>,
    records: Vec<ExerciseRecord>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Repository double backed by plain vectors. Ids are shared across tables and
/// start at 1. `fail_storage` makes every call return a database error.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    fail_storage: AtomicBool,
}

fn storage_error() -> sqlx::Error {
    sqlx::Error::Protocol("connection reset by peer (simulated)".to_string())
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(self, codigo: &str, rol: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .codes
            .insert(codigo.to_string(), rol.to_string());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_storage.store(failing, Ordering::SeqCst);
    }

    /// Inserts an account with a real bcrypt hash of `password`.
    pub fn seed_account(&self, nombre: &str, correo: &str, password: &str, rol: &str) -> i32 {
        let hash = bcrypt::hash(password, MIN_BCRYPT_COST).unwrap();
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.accounts.push(Account {
            id_usuario: id,
            nombre: nombre.to_string(),
            correo: Some(correo.to_string()),
            rol: rol.to_string(),
            codigo_acceso: None,
            password: Some(hash),
        });
        id
    }

    pub fn account(&self, nombre: &str) -> Option<Account> {
        self.tables
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.nombre == nombre)
            .cloned()
    }

    pub fn account_count(&self) -> usize {
        self.tables.lock().unwrap().accounts.len()
    }

    pub fn set_role(&self, id: i32, rol: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id_usuario == id) {
            account.rol = rol.to_string();
        }
    }

    pub fn set_password(&self, id: i32, hash: Option<&str>) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id_usuario == id) {
            account.password = hash.map(str::to_string);
        }
    }

    pub fn patient_count(&self) -> usize {
        self.tables.lock().unwrap().patients.len()
    }

    fn check(&self) -> RepoResult<()> {
        if self.fail_storage.load(Ordering::SeqCst) {
            Err(storage_error())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_access_code_role(&self, codigo: &str) -> RepoResult<Option<String>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().codes.get(codigo).cloned())
    }

    async fn find_account_by_login(&self, login: &str) -> RepoResult<Option<Account>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.nombre == login || a.correo.as_deref() == Some(login))
            .cloned())
    }

    async fn create_account(&self, account: NewAccount) -> RepoResult<i32> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        // Mirrors the UNIQUE constraints on nombre and correo.
        let duplicate = tables.accounts.iter().any(|a| {
            a.nombre == account.nombre || (a.correo.is_some() && a.correo == account.correo)
        });
        if duplicate {
            return Err(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        let id = tables.next_id();
        tables.accounts.push(Account {
            id_usuario: id,
            nombre: account.nombre,
            correo: account.correo,
            rol: account.rol,
            codigo_acceso: account.codigo_acceso,
            password: account.password_hash,
        });
        Ok(id)
    }

    async fn list_accounts(&self) -> RepoResult<Vec<AccountSummary>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .accounts
            .iter()
            .map(|a| AccountSummary {
                id_usuario: a.id_usuario,
                nombre: a.nombre.clone(),
                correo: a.correo.clone(),
                rol: a.rol.clone(),
                codigo_acceso: a.codigo_acceso.clone(),
            })
            .collect())
    }

    async fn update_account(&self, id: i32, req: UpdateAccountRequest) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.accounts.iter_mut().find(|a| a.id_usuario == id) {
            Some(account) => {
                account.nombre = req.nombre;
                account.correo = req.correo;
                account.rol = req.rol.as_str().to_string();
                1
            }
            None => 0,
        })
    }

    async fn delete_account(&self, id: i32) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.accounts.len();
        tables.accounts.retain(|a| a.id_usuario != id);
        Ok((before - tables.accounts.len()) as u64)
    }

    async fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().patients.clone())
    }

    async fn create_patient(&self, req: PatientPayload) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.patients.push(Patient {
            id_paciente: id,
            nombre: req.nombre,
            edad: req.edad,
            lesion: req.lesion,
            estado_salud: req.estado_salud,
            fecha_registro: req.fecha_registro,
        });
        Ok(1)
    }

    async fn update_patient(&self, id: i32, req: PatientPayload) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.patients.iter_mut().find(|p| p.id_paciente == id) {
            Some(patient) => {
                *patient = Patient {
                    id_paciente: id,
                    nombre: req.nombre,
                    edad: req.edad,
                    lesion: req.lesion,
                    estado_salud: req.estado_salud,
                    fecha_registro: req.fecha_registro,
                };
                1
            }
            None => 0,
        })
    }

    async fn delete_patient(&self, id: i32) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.patients.len();
        tables.patients.retain(|p| p.id_paciente != id);
        Ok((before - tables.patients.len()) as u64)
    }

    async fn list_exercises(&self) -> RepoResult<Vec<Exercise>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().exercises.clone())
    }

    async fn create_exercise(&self, req: ExercisePayload) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.exercises.push(Exercise {
            id_ejercicio: id,
            nombre: req.nombre,
            zona_cuerpo: req.zona_cuerpo,
            descripcion: req.descripcion,
        });
        Ok(1)
    }

    async fn update_exercise(&self, id: i32, req: ExercisePayload) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.exercises.iter_mut().find(|e| e.id_ejercicio == id) {
            Some(exercise) => {
                exercise.nombre = req.nombre;
                exercise.zona_cuerpo = req.zona_cuerpo;
                exercise.descripcion = req.descripcion;
                1
            }
            None => 0,
        })
    }

    async fn delete_exercise(&self, id: i32) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.exercises.len();
        tables.exercises.retain(|e| e.id_ejercicio != id);
        Ok((before - tables.exercises.len()) as u64)
    }

    async fn list_records(&self) -> RepoResult<Vec<ExerciseRecord>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().records.clone())
    }

    async fn create_record(&self, req: CreateRecordRequest) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.records.push(ExerciseRecord {
            id_registro: id,
            paciente: req.paciente,
            ejercicio: req.ejercicio,
            observaciones: req.observaciones,
            fecha: req.fecha,
        });
        Ok(1)
    }

    async fn update_record(&self, id: i32, req: UpdateRecordRequest) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.records.iter_mut().find(|r| r.id_registro == id) {
            Some(record) => {
                record.ejercicio = req.ejercicio;
                record.observaciones = req.observaciones;
                record.fecha = req.fecha;
                1
            }
            None => 0,
        })
    }

    async fn delete_record(&self, id: i32) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.records.len();
        tables.records.retain(|r| r.id_registro != id);
        Ok((before - tables.records.len()) as u64)
    }
}

// --- Fake Session ---

/// Session accessor holding at most one principal in memory.
#[derive(Default)]
pub struct FakeSession {
    user: Mutex<Option<SessionUser>>,
    pub binds: Mutex<u32>,
}

#[async_trait]
impl SessionAccessor for FakeSession {
    async fn principal(&self) -> Result<Principal, ApiError> {
        Ok(self
            .user
            .lock()
            .unwrap()
            .clone()
            .map_or(Principal::Anonymous, Principal::Authenticated))
    }

    async fn bind(&self, user: &SessionUser) -> Result<(), ApiError> {
        *self.user.lock().unwrap() = Some(user.clone());
        *self.binds.lock().unwrap() += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}

// --- State Helpers ---

/// AppState over `repo` with the default (fast-hashing) test config.
pub fn test_state(repo: Arc<InMemoryRepository>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}
