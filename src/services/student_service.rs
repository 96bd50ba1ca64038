use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::student_repository::{StudentRepository, StudentRow};
use crate::db::repositories::turma_repository::TurmaRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::student::{StudentCreateInput, StudentRecord, StudentUpdateInput};
use crate::models::user::Credential;
use crate::services::account_service::AccountService;

#[derive(Clone)]
pub struct StudentService {
    db: DbPool,
    accounts: Arc<AccountService>,
}

impl StudentService {
    pub fn new(db: DbPool, accounts: Arc<AccountService>) -> Self {
        Self { db, accounts }
    }

    /// Enrolls a student and issues their login credential in the same step.
    pub fn create_student(
        &self,
        input: StudentCreateInput,
    ) -> AppResult<(StudentRecord, Credential)> {
        let full_name = normalize_name(&input.full_name)?;
        let birth_date = normalize_birth_date(input.birth_date)?;
        let turma_id = input.turma_id;

        if let Some(turma_id) = turma_id.as_deref() {
            self.ensure_turma_exists(turma_id)?;
        }

        let now = Utc::now().to_rfc3339();
        let mut record = StudentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            birth_date,
            turma_id,
            user_id: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = StudentRow::from_record(&record);
        self.db
            .with_connection(|conn| StudentRepository::insert(conn, &row))?;

        let (user, credential) = self.accounts.create_student_account(&record)?;
        self.db
            .with_connection(|conn| StudentRepository::attach_user(conn, &record.id, &user.id))?;
        record.user_id = Some(user.id);

        info!(target: "app::students", student_id = %record.id, login = %credential.login, "student enrolled");
        Ok((record, credential))
    }

    pub fn update_student(
        &self,
        id: &str,
        update: StudentUpdateInput,
    ) -> AppResult<StudentRecord> {
        let mut existing = self.get_student(id)?;
        self.apply_update(&mut existing, update)?;
        existing.updated_at = Utc::now().to_rfc3339();

        let row = StudentRow::from_record(&existing);
        self.db
            .with_connection(|conn| StudentRepository::update(conn, &row))?;
        info!(target: "app::students", student_id = %existing.id, "student updated");
        Ok(existing)
    }

    pub fn delete_student(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .db
            .with_connection(|conn| StudentRepository::delete(conn, id))?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        info!(target: "app::students", student_id = %id, "student deleted");
        Ok(())
    }

    pub fn get_student(&self, id: &str) -> AppResult<StudentRecord> {
        let row = self
            .db
            .with_connection(|conn| StudentRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        let record = row.into_record();
        debug!(target: "app::students", student_id = %record.id, "student fetched");
        Ok(record)
    }

    pub fn list_students(&self) -> AppResult<Vec<StudentRecord>> {
        let rows = self
            .db
            .with_connection(|conn| StudentRepository::list_all(conn))?;
        Ok(rows.into_iter().map(|row| row.into_record()).collect())
    }

    pub fn list_by_turma(&self, turma_id: &str) -> AppResult<Vec<StudentRecord>> {
        self.ensure_turma_exists(turma_id)?;
        let rows = self
            .db
            .with_connection(|conn| StudentRepository::list_by_turma(conn, turma_id))?;
        Ok(rows.into_iter().map(|row| row.into_record()).collect())
    }

    fn apply_update(
        &self,
        record: &mut StudentRecord,
        update: StudentUpdateInput,
    ) -> AppResult<()> {
        if let Some(full_name) = update.full_name {
            record.full_name = normalize_name(&full_name)?;
        }

        if let Some(birth_date) = update.birth_date {
            record.birth_date = normalize_birth_date(birth_date)?;
        }

        if let Some(turma_id) = update.turma_id {
            if let Some(turma_id) = turma_id.as_deref() {
                self.ensure_turma_exists(turma_id)?;
            }
            record.turma_id = turma_id;
        }

        Ok(())
    }

    fn ensure_turma_exists(&self, turma_id: &str) -> AppResult<()> {
        let found = self
            .db
            .with_connection(|conn| TurmaRepository::find_by_id(conn, turma_id))?;
        if found.is_none() {
            return Err(AppError::validation(format!(
                "turma inexistente: {turma_id}"
            )));
        }
        Ok(())
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("nome do aluno não pode ser vazio"));
    }
    if trimmed.chars().count() > 160 {
        return Err(AppError::validation(
            "nome do aluno deve ter no máximo 160 caracteres",
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_birth_date(value: Option<String>) -> AppResult<Option<String>> {
    if let Some(value) = value {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| AppError::validation("data de nascimento deve estar no formato AAAA-MM-DD"))?;
        Ok(Some(trimmed.to_string()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup_service() -> (StudentService, tempfile::TempDir) {
        let dir = tempdir().expect("temp dir");
        let db_path = dir.path().join("students.sqlite");
        let pool = DbPool::new(db_path).expect("db pool");
        let accounts = Arc::new(AccountService::new(pool.clone()));
        (StudentService::new(pool, accounts), dir)
    }

    #[test]
    fn enrolling_issues_linked_credential() {
        let (service, _dir) = setup_service();
        let (student, credential) = service
            .create_student(StudentCreateInput {
                full_name: "Ana Maria Silva".into(),
                ..Default::default()
            })
            .expect("create student");

        assert_eq!(credential.login, "ana@metis");
        assert!(student.user_id.is_some());

        let fetched = service.get_student(&student.id).expect("get student");
        assert_eq!(fetched.user_id, student.user_id);
    }

    #[test]
    fn patch_distinguishes_absent_from_cleared() {
        let (service, _dir) = setup_service();
        let (student, _) = service
            .create_student(StudentCreateInput {
                full_name: "João Pedro".into(),
                birth_date: Some("2015-04-02".into()),
                ..Default::default()
            })
            .expect("create student");

        // Field absent: birth date must survive.
        let untouched = service
            .update_student(
                &student.id,
                StudentUpdateInput {
                    full_name: Some("João Pedro Santos".into()),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(untouched.birth_date.as_deref(), Some("2015-04-02"));

        // Field present with null: birth date cleared.
        let cleared = service
            .update_student(
                &student.id,
                StudentUpdateInput {
                    birth_date: Some(None),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(cleared.birth_date, None);
    }

    #[test]
    fn create_rejects_unknown_turma() {
        let (service, _dir) = setup_service();
        let result = service.create_student(StudentCreateInput {
            full_name: "Maria".into(),
            turma_id: Some("nao-existe".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn create_rejects_malformed_birth_date() {
        let (service, _dir) = setup_service();
        let result = service.create_student(StudentCreateInput {
            full_name: "Maria".into(),
            birth_date: Some("02/04/2015".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
