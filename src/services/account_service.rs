use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::student::StudentRecord;
use crate::models::user::{Credential, Principal, Role, UserCreateInput, UserRecord};
use crate::utils::credentials::{
    derive_login_base, generate_password, generate_reset_password, login_candidate,
    STUDENT_PASSWORD_LENGTH,
};
use crate::utils::crypto::{hash_password, verify_password};

const STAFF_PASSWORD_LENGTH: usize = 8;

// The numeric suffix search is bounded; past this the caller gets a loud
// failure instead of a hung loop.
const MAX_LOGIN_ATTEMPTS: usize = 999;

#[derive(Clone)]
pub struct AccountService {
    db: DbPool,
}

impl AccountService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Creates a user and returns the issued credential. The plaintext
    /// password exists only in the returned value.
    pub fn create_user(&self, input: UserCreateInput) -> AppResult<(UserRecord, Credential)> {
        let full_name = normalize_name(&input.full_name)?;
        let role = input.role.unwrap_or(Role::Aluno);

        let login = self.allocate_login(&full_name)?;
        let password = match role {
            Role::Aluno => generate_password(STUDENT_PASSWORD_LENGTH),
            _ => generate_password(STAFF_PASSWORD_LENGTH),
        };
        let password_hash = hash_password(&password);

        let now = Utc::now().to_rfc3339();
        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            login: login.clone(),
            role,
            student_id: input.student_id,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db
            .with_connection(|conn| UserRepository::insert(conn, &record, &password_hash))?;
        info!(target: "app::accounts", user_id = %record.id, login = %record.login, "user created");

        Ok((record, Credential { login, password }))
    }

    /// Convenience for student onboarding: an `ALUNO` account linked to the
    /// student record.
    pub fn create_student_account(
        &self,
        student: &StudentRecord,
    ) -> AppResult<(UserRecord, Credential)> {
        self.create_user(UserCreateInput {
            full_name: student.full_name.clone(),
            role: Some(Role::Aluno),
            student_id: Some(student.id.clone()),
        })
    }

    /// Issues a fresh password from the unambiguous alphabet and stores only
    /// its hash.
    pub fn reset_password(&self, user_id: &str) -> AppResult<Credential> {
        let user = self.get_user(user_id)?;

        let password = generate_reset_password();
        let password_hash = hash_password(&password);
        let now = Utc::now().to_rfc3339();

        let changed = self.db.with_connection(|conn| {
            UserRepository::update_password(conn, user_id, &password_hash, &now)
        })?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        info!(target: "app::accounts", user_id = %user.id, "password reset");

        Ok(Credential {
            login: user.login,
            password,
        })
    }

    /// Password check for the authentication collaborator. `None` covers both
    /// unknown login and wrong password.
    pub fn verify_login(&self, login: &str, password: &str) -> AppResult<Option<Principal>> {
        let hash = self
            .db
            .with_connection(|conn| UserRepository::find_password_hash(conn, login))?;

        let Some(hash) = hash else {
            return Ok(None);
        };

        if !verify_password(password, &hash)? {
            debug!(target: "app::accounts", %login, "password mismatch");
            return Ok(None);
        }

        let user = self
            .db
            .with_connection(|conn| UserRepository::find_by_login(conn, login))?
            .ok_or_else(AppError::not_found)?
            .into_record()?;

        Ok(Some(Principal::new(user.id, user.role)))
    }

    pub fn get_user(&self, id: &str) -> AppResult<UserRecord> {
        let row = self
            .db
            .with_connection(|conn| UserRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        row.into_record()
    }

    pub fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let rows = self
            .db
            .with_connection(|conn| UserRepository::list_all(conn))?;
        rows.into_iter().map(|row| row.into_record()).collect()
    }

    pub fn delete_user(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .db
            .with_connection(|conn| UserRepository::delete(conn, id))?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        info!(target: "app::accounts", user_id = %id, "user deleted");
        Ok(())
    }

    /// Finds the first free `base`, `base2`, `base3`, ... identifier,
    /// re-checking existence for every candidate.
    fn allocate_login(&self, full_name: &str) -> AppResult<String> {
        let base = derive_login_base(full_name);

        for attempt in 1..=MAX_LOGIN_ATTEMPTS {
            let candidate = login_candidate(&base, attempt);
            let taken = self
                .db
                .with_connection(|conn| UserRepository::login_exists(conn, &candidate))?;
            if !taken {
                return Ok(candidate);
            }
        }

        Err(AppError::exhaustion(format!(
            "não foi possível alocar login para a base '{base}' após {MAX_LOGIN_ATTEMPTS} tentativas"
        )))
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("nome não pode ser vazio"));
    }
    if trimmed.chars().count() > 160 {
        return Err(AppError::validation("nome deve ter no máximo 160 caracteres"));
    }
    Ok(trimmed.to_string())
}
