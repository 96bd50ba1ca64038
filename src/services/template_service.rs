use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::template_repository::{TemplateRepository, TemplateRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::template::{
    TemplateCreateInput, TemplateItem, TemplateItemInput, TemplateRecord, TemplateUpdateInput,
};

const MAX_ITEMS: usize = 100;
const MAX_ITEM_SCORE: f64 = 10.0;

#[derive(Clone)]
pub struct TemplateService {
    db: DbPool,
}

impl TemplateService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_template(&self, input: TemplateCreateInput) -> AppResult<TemplateRecord> {
        let name = normalize_name(&input.name)?;
        let description = normalize_optional_string(input.description);
        let items = normalize_items(input.items)?;

        let now = Utc::now().to_rfc3339();
        let record = TemplateRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            items,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = TemplateRow::from_record(&record)?;
        self.db
            .with_connection(|conn| TemplateRepository::insert(conn, &row))?;
        info!(target: "app::templates", template_id = %record.id, "template created");
        Ok(record)
    }

    pub fn update_template(
        &self,
        id: &str,
        update: TemplateUpdateInput,
    ) -> AppResult<TemplateRecord> {
        let mut existing = self.get_template(id)?;

        if let Some(name) = update.name {
            existing.name = normalize_name(&name)?;
        }

        if let Some(description) = update.description {
            existing.description = normalize_optional_string(description);
        }

        if let Some(items) = update.items {
            existing.items = normalize_items(items)?;
        }

        existing.updated_at = Utc::now().to_rfc3339();

        let row = TemplateRow::from_record(&existing)?;
        self.db
            .with_connection(|conn| TemplateRepository::update(conn, &row))?;
        info!(target: "app::templates", template_id = %existing.id, "template updated");
        Ok(existing)
    }

    pub fn delete_template(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .db
            .with_connection(|conn| TemplateRepository::delete(conn, id))?;
        if deleted == 0 {
            return Err(AppError::not_found());
        }
        info!(target: "app::templates", template_id = %id, "template deleted");
        Ok(())
    }

    pub fn get_template(&self, id: &str) -> AppResult<TemplateRecord> {
        let row = self
            .db
            .with_connection(|conn| TemplateRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        let record = row.into_record()?;
        debug!(target: "app::templates", template_id = %record.id, "template fetched");
        Ok(record)
    }

    pub fn list_templates(&self) -> AppResult<Vec<TemplateRecord>> {
        let rows = self
            .db
            .with_connection(|conn| TemplateRepository::list_all(conn))?;
        rows.into_iter().map(|row| row.into_record()).collect()
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("nome do template não pode ser vazio"));
    }
    if trimmed.chars().count() > 120 {
        return Err(AppError::validation(
            "nome do template deve ter no máximo 120 caracteres",
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn normalize_items(items: Vec<TemplateItemInput>) -> AppResult<Vec<TemplateItem>> {
    if items.is_empty() {
        return Err(AppError::validation(
            "template precisa de pelo menos um item",
        ));
    }
    if items.len() > MAX_ITEMS {
        return Err(AppError::validation(format!(
            "template aceita no máximo {MAX_ITEMS} itens"
        )));
    }

    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let prompt = item.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(AppError::validation("enunciado do item não pode ser vazio"));
        }

        let domain = item
            .domain
            .ok_or_else(|| AppError::validation("item precisa de um domínio cognitivo"))?;

        let max_score = item.max_score.unwrap_or(MAX_ITEM_SCORE);
        if !max_score.is_finite() || max_score <= 0.0 || max_score > MAX_ITEM_SCORE {
            return Err(AppError::validation(format!(
                "pontuação máxima do item deve estar entre 0 e {MAX_ITEM_SCORE}"
            )));
        }

        result.push(TemplateItem {
            id: uuid::Uuid::new_v4().to_string(),
            prompt,
            domain,
            max_score,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::CognitiveDomain;
    use tempfile::tempdir;

    fn setup_service() -> (TemplateService, tempfile::TempDir) {
        let dir = tempdir().expect("temp dir");
        let db_path = dir.path().join("templates.sqlite");
        let pool = DbPool::new(db_path).expect("db pool");
        (TemplateService::new(pool), dir)
    }

    fn item(prompt: &str, domain: CognitiveDomain) -> TemplateItemInput {
        TemplateItemInput {
            prompt: prompt.to_string(),
            domain: Some(domain),
            max_score: None,
        }
    }

    #[test]
    fn create_assigns_item_ids_and_roundtrips() {
        let (service, _dir) = setup_service();
        let record = service
            .create_template(TemplateCreateInput {
                name: "Bateria Mensal".into(),
                description: Some("Aplicação padrão".into()),
                items: vec![
                    item("Leitura em voz alta", CognitiveDomain::Fluency),
                    item("Referências culturais", CognitiveDomain::Culture),
                ],
            })
            .expect("create template");

        assert_eq!(record.items.len(), 2);
        assert!(record.items.iter().all(|item| !item.id.is_empty()));
        assert_eq!(record.items[0].max_score, MAX_ITEM_SCORE);

        let fetched = service.get_template(&record.id).expect("get template");
        assert_eq!(fetched.items, record.items);
    }

    #[test]
    fn create_requires_items_with_domain() {
        let (service, _dir) = setup_service();

        let empty = service.create_template(TemplateCreateInput {
            name: "Sem Itens".into(),
            description: None,
            items: vec![],
        });
        assert!(matches!(empty, Err(AppError::Validation { .. })));

        let missing_domain = service.create_template(TemplateCreateInput {
            name: "Sem Domínio".into(),
            description: None,
            items: vec![TemplateItemInput {
                prompt: "Questão solta".into(),
                domain: None,
                max_score: None,
            }],
        });
        assert!(matches!(missing_domain, Err(AppError::Validation { .. })));
    }

    #[test]
    fn update_replaces_items_wholesale() {
        let (service, _dir) = setup_service();
        let record = service
            .create_template(TemplateCreateInput {
                name: "Bateria".into(),
                description: None,
                items: vec![item("Atenção sustentada", CognitiveDomain::Attention)],
            })
            .expect("create template");

        let updated = service
            .update_template(
                &record.id,
                TemplateUpdateInput {
                    items: Some(vec![
                        item("Autoavaliação", CognitiveDomain::SelfPerception),
                        item("Interpretação de texto", CognitiveDomain::Interpretation),
                    ]),
                    ..Default::default()
                },
            )
            .expect("update template");

        assert_eq!(updated.items.len(), 2);
        assert_ne!(updated.items[0].id, record.items[0].id);
    }

    #[test]
    fn item_score_bounds_are_enforced() {
        let (service, _dir) = setup_service();
        let result = service.create_template(TemplateCreateInput {
            name: "Pontuação Inválida".into(),
            description: None,
            items: vec![TemplateItemInput {
                prompt: "Questão".into(),
                domain: Some(CognitiveDomain::Fluency),
                max_score: Some(15.0),
            }],
        });
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
