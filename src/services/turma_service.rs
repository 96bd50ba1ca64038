use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::turma_repository::{TurmaRepository, TurmaRow};
use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::turma::{TurmaCreateInput, TurmaRecord, TurmaUpdateInput};
use crate::models::user::Role;

const MIN_SCHOOL_YEAR: i32 = 2000;
const MAX_SCHOOL_YEAR: i32 = 2100;

#[derive(Clone)]
pub struct TurmaService {
    db: DbPool,
}

impl TurmaService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_turma(&self, input: TurmaCreateInput) -> AppResult<TurmaRecord> {
        let name = normalize_name(&input.name)?;
        let school_year = normalize_school_year(input.school_year)?;

        if let Some(moderator_id) = input.moderator_id.as_deref() {
            self.ensure_moderator(moderator_id)?;
        }

        let now = Utc::now().to_rfc3339();
        let record = TurmaRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            school_year,
            moderator_id: input.moderator_id,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = TurmaRow::from_record(&record);
        self.db
            .with_connection(|conn| TurmaRepository::insert(conn, &row))?;
        info!(target: "app::turmas", turma_id = %record.id, "turma created");
        Ok(record)
    }

    pub fn update_turma(&self, id: &str, update: TurmaUpdateInput) -> AppResult<TurmaRecord> {
        let mut existing = self.get_turma(id)?;

        if let Some(name) = update.name {
            existing.name = normalize_name(&name)?;
        }

        if let Some(school_year) = update.school_year {
            existing.school_year = normalize_school_year(Some(school_year))?;
        }

        if let Some(moderator_id) = update.moderator_id {
            if let Some(moderator_id) = moderator_id.as_deref() {
                self.ensure_moderator(moderator_id)?;
            }
            existing.moderator_id = moderator_id;
        }

        existing.updated_at = Utc::now().to_rfc3339();

        let row = TurmaRow::from_record(&existing);
        self.db
            .with_connection(|conn| TurmaRepository::update(conn, &row))?;
        info!(target: "app::turmas", turma_id = %existing.id, "turma updated");
        Ok(existing)
    }

    pub fn delete_turma(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .db
            .with_connection(|conn| TurmaRepository::delete(conn, id))?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        info!(target: "app::turmas", turma_id = %id, "turma deleted");
        Ok(())
    }

    pub fn get_turma(&self, id: &str) -> AppResult<TurmaRecord> {
        let row = self
            .db
            .with_connection(|conn| TurmaRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        let record = row.into_record();
        debug!(target: "app::turmas", turma_id = %record.id, "turma fetched");
        Ok(record)
    }

    pub fn list_turmas(&self) -> AppResult<Vec<TurmaRecord>> {
        let rows = self
            .db
            .with_connection(|conn| TurmaRepository::list_all(conn))?;
        Ok(rows.into_iter().map(|row| row.into_record()).collect())
    }

    fn ensure_moderator(&self, user_id: &str) -> AppResult<()> {
        let user = self
            .db
            .with_connection(|conn| UserRepository::find_by_id(conn, user_id))?
            .ok_or_else(|| AppError::validation(format!("usuário inexistente: {user_id}")))?
            .into_record()?;

        if user.role != Role::Moderador {
            return Err(AppError::validation(
                "apenas usuários com perfil MODERADOR podem assumir uma turma",
            ));
        }
        Ok(())
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("nome da turma não pode ser vazio"));
    }
    if trimmed.chars().count() > 80 {
        return Err(AppError::validation(
            "nome da turma deve ter no máximo 80 caracteres",
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_school_year(value: Option<i32>) -> AppResult<i32> {
    let year = value.ok_or_else(|| AppError::validation("ano letivo é obrigatório"))?;
    if !(MIN_SCHOOL_YEAR..=MAX_SCHOOL_YEAR).contains(&year) {
        return Err(AppError::validation(format!(
            "ano letivo deve estar entre {MIN_SCHOOL_YEAR} e {MAX_SCHOOL_YEAR}"
        )));
    }
    Ok(year)
}
