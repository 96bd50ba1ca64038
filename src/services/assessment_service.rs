use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{debug, info};

use crate::db::repositories::assessment_repository::{AssessmentRepository, AssessmentRow};
use crate::db::repositories::student_repository::StudentRepository;
use crate::db::repositories::template_repository::TemplateRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::assessment::{
    AssessmentCreateInput, AssessmentRecord, AssessmentStatus, DomainScores, ItemAnswer,
};
use crate::models::report::PeriodKey;
use crate::models::template::TemplateRecord;
use crate::services::report_service::resolve_start_boundary;
use crate::services::settings_service::SettingsService;

const MIN_YEAR_REF: i32 = 2000;
const MAX_YEAR_REF: i32 = 2100;

#[derive(Clone)]
pub struct AssessmentService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl AssessmentService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Opens a draft for `(student, month, year)`. The pair is unique: a
    /// second draft for the same period is a conflict, never an overwrite.
    pub fn create_assessment(
        &self,
        input: AssessmentCreateInput,
    ) -> AppResult<AssessmentRecord> {
        let month_ref = normalize_month(input.month_ref)?;
        let year_ref = normalize_year(input.year_ref)?;

        let student = self
            .db
            .with_connection(|conn| StudentRepository::find_by_id(conn, &input.student_id))?;
        if student.is_none() {
            return Err(AppError::validation(format!(
                "aluno inexistente: {}",
                input.student_id
            )));
        }

        let template = self
            .db
            .with_connection(|conn| TemplateRepository::find_by_id(conn, &input.template_id))?;
        if template.is_none() {
            return Err(AppError::validation(format!(
                "template inexistente: {}",
                input.template_id
            )));
        }

        let existing = self.db.with_connection(|conn| {
            AssessmentRepository::find_by_student_period(
                conn,
                &input.student_id,
                month_ref,
                year_ref,
            )
        })?;
        if existing.is_some() {
            return Err(AppError::conflict(format!(
                "já existe avaliação para este aluno em {month_ref:02}/{year_ref}"
            )));
        }

        let now = Utc::now().to_rfc3339();
        let record = AssessmentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: input.student_id,
            template_id: input.template_id,
            month_ref,
            year_ref,
            status: AssessmentStatus::Draft,
            total_score: 0.0,
            scores: DomainScores::default(),
            answers: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let row = AssessmentRow::from_record(&record)?;
        self.db
            .with_connection(|conn| AssessmentRepository::insert(conn, &row))?;
        info!(
            target: "app::assessments",
            assessment_id = %record.id,
            student_id = %record.student_id,
            period = %format!("{:02}/{}", record.month_ref, record.year_ref),
            "assessment draft created"
        );
        Ok(record)
    }

    /// Stores the moderator's item answers and recomputes the per-domain and
    /// total scores. Completed assessments are immutable until reopened.
    pub fn record_answers(
        &self,
        id: &str,
        answers: Vec<ItemAnswer>,
    ) -> AppResult<AssessmentRecord> {
        let mut record = self.get_assessment(id)?;
        if record.status == AssessmentStatus::Completed {
            return Err(AppError::conflict(
                "avaliação concluída não pode ser editada; reabra antes de alterar",
            ));
        }

        let template = self
            .db
            .with_connection(|conn| TemplateRepository::find_by_id(conn, &record.template_id))?
            .ok_or_else(AppError::not_found)?
            .into_record()?;

        let config = self.settings.report_config()?;
        let (scores, total) = aggregate_scores(&template, &answers, config.domain_max_score)?;

        record.scores = scores;
        record.total_score = total;
        record.answers = answers;
        record.updated_at = Utc::now().to_rfc3339();

        let row = AssessmentRow::from_record(&record)?;
        self.db
            .with_connection(|conn| AssessmentRepository::update(conn, &row))?;
        info!(target: "app::assessments", assessment_id = %record.id, total = record.total_score, "answers recorded");
        Ok(record)
    }

    pub fn complete_assessment(&self, id: &str) -> AppResult<AssessmentRecord> {
        let mut record = self.get_assessment(id)?;
        if record.status == AssessmentStatus::Completed {
            return Err(AppError::conflict("avaliação já está concluída"));
        }

        record.status = AssessmentStatus::Completed;
        record.updated_at = Utc::now().to_rfc3339();

        let row = AssessmentRow::from_record(&record)?;
        self.db
            .with_connection(|conn| AssessmentRepository::update(conn, &row))?;
        info!(target: "app::assessments", assessment_id = %record.id, "assessment completed");
        Ok(record)
    }

    /// Explicit transition back to draft; from here the record drops out of
    /// every dashboard aggregate until completed again.
    pub fn reopen_assessment(&self, id: &str) -> AppResult<AssessmentRecord> {
        let mut record = self.get_assessment(id)?;
        if record.status == AssessmentStatus::Draft {
            return Err(AppError::conflict("avaliação ainda está em rascunho"));
        }

        record.status = AssessmentStatus::Draft;
        record.updated_at = Utc::now().to_rfc3339();

        let row = AssessmentRow::from_record(&record)?;
        self.db
            .with_connection(|conn| AssessmentRepository::update(conn, &row))?;
        info!(target: "app::assessments", assessment_id = %record.id, "assessment reopened");
        Ok(record)
    }

    pub fn delete_assessment(&self, id: &str) -> AppResult<()> {
        let record = self.get_assessment(id)?;
        if record.status == AssessmentStatus::Completed {
            return Err(AppError::conflict(
                "avaliação concluída não pode ser removida; reabra antes de remover",
            ));
        }

        self.db
            .with_connection(|conn| AssessmentRepository::delete(conn, id))?;
        info!(target: "app::assessments", assessment_id = %id, "assessment deleted");
        Ok(())
    }

    pub fn get_assessment(&self, id: &str) -> AppResult<AssessmentRecord> {
        let row = self
            .db
            .with_connection(|conn| AssessmentRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        let record = row.into_record()?;
        debug!(target: "app::assessments", assessment_id = %record.id, "assessment fetched");
        Ok(record)
    }

    pub fn list_by_student(
        &self,
        student_id: &str,
        period: PeriodKey,
    ) -> AppResult<Vec<AssessmentRecord>> {
        let today = Utc::now().date_naive();
        let boundary =
            resolve_start_boundary(period, today).map(|date| (date.year(), date.month()));

        let rows = self.db.with_connection(|conn| {
            AssessmentRepository::list_by_student(conn, student_id, boundary)
        })?;
        rows.into_iter().map(|row| row.into_record()).collect()
    }
}

fn normalize_month(value: Option<u32>) -> AppResult<u32> {
    let month = value.ok_or_else(|| AppError::validation("mês de referência é obrigatório"))?;
    if !(1..=12).contains(&month) {
        return Err(AppError::validation(
            "mês de referência deve estar entre 1 e 12",
        ));
    }
    Ok(month)
}

fn normalize_year(value: Option<i32>) -> AppResult<i32> {
    let year = value.ok_or_else(|| AppError::validation("ano de referência é obrigatório"))?;
    if !(MIN_YEAR_REF..=MAX_YEAR_REF).contains(&year) {
        return Err(AppError::validation(format!(
            "ano de referência deve estar entre {MIN_YEAR_REF} e {MAX_YEAR_REF}"
        )));
    }
    Ok(year)
}

/// Sums item scores into their tagged domains, clamping the item score to the
/// item maximum and the domain sum to `[0, domain_max]`. The total is the sum
/// of the five clamped domain scores.
fn aggregate_scores(
    template: &TemplateRecord,
    answers: &[ItemAnswer],
    domain_max: f64,
) -> AppResult<(DomainScores, f64)> {
    let items: HashMap<&str, _> = template
        .items
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut sums = DomainScores::default();

    for answer in answers {
        let item = items.get(answer.item_id.as_str()).ok_or_else(|| {
            AppError::validation(format!(
                "resposta referencia item desconhecido: {}",
                answer.item_id
            ))
        })?;

        if !seen.insert(answer.item_id.as_str()) {
            return Err(AppError::validation(format!(
                "resposta duplicada para o item: {}",
                answer.item_id
            )));
        }

        let item_score = clamp_score(answer.score, item.max_score);
        sums.set(item.domain, sums.get(item.domain) + item_score);
    }

    let mut total = 0.0;
    for domain in crate::models::template::CognitiveDomain::ALL {
        let clamped = clamp_score(sums.get(domain), domain_max);
        sums.set(domain, clamped);
        total += clamped;
    }

    Ok((sums, total))
}

fn clamp_score(value: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::StudentCreateInput;
    use crate::models::template::{CognitiveDomain, TemplateCreateInput, TemplateItemInput};
    use crate::services::account_service::AccountService;
    use crate::services::student_service::StudentService;
    use crate::services::template_service::TemplateService;
    use tempfile::tempdir;

    struct Fixture {
        assessments: AssessmentService,
        student_id: String,
        template: TemplateRecord,
        _dir: tempfile::TempDir,
    }

    fn setup() -> Fixture {
        let dir = tempdir().expect("temp dir");
        let db_path = dir.path().join("assessments.sqlite");
        let pool = DbPool::new(db_path).expect("db pool");

        let accounts = Arc::new(AccountService::new(pool.clone()));
        let students = StudentService::new(pool.clone(), accounts);
        let templates = TemplateService::new(pool.clone());
        let settings = Arc::new(SettingsService::new(pool.clone()));

        let (student, _) = students
            .create_student(StudentCreateInput {
                full_name: "Ana Maria Silva".into(),
                ..Default::default()
            })
            .expect("create student");

        let template = templates
            .create_template(TemplateCreateInput {
                name: "Bateria Mensal".into(),
                description: None,
                items: vec![
                    TemplateItemInput {
                        prompt: "Leitura em voz alta".into(),
                        domain: Some(CognitiveDomain::Fluency),
                        max_score: Some(5.0),
                    },
                    TemplateItemInput {
                        prompt: "Leitura silenciosa".into(),
                        domain: Some(CognitiveDomain::Fluency),
                        max_score: Some(5.0),
                    },
                    TemplateItemInput {
                        prompt: "Atenção sustentada".into(),
                        domain: Some(CognitiveDomain::Attention),
                        max_score: Some(10.0),
                    },
                ],
            })
            .expect("create template");

        Fixture {
            assessments: AssessmentService::new(pool, settings),
            student_id: student.id,
            template,
            _dir: dir,
        }
    }

    fn draft(fixture: &Fixture, month: u32, year: i32) -> AssessmentRecord {
        fixture
            .assessments
            .create_assessment(AssessmentCreateInput {
                student_id: fixture.student_id.clone(),
                template_id: fixture.template.id.clone(),
                month_ref: Some(month),
                year_ref: Some(year),
            })
            .expect("create assessment")
    }

    #[test]
    fn duplicate_period_is_a_conflict() {
        let fixture = setup();
        draft(&fixture, 3, 2026);

        let duplicate = fixture.assessments.create_assessment(AssessmentCreateInput {
            student_id: fixture.student_id.clone(),
            template_id: fixture.template.id.clone(),
            month_ref: Some(3),
            year_ref: Some(2026),
        });
        assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
    }

    #[test]
    fn month_bounds_are_validated() {
        let fixture = setup();
        let result = fixture.assessments.create_assessment(AssessmentCreateInput {
            student_id: fixture.student_id.clone(),
            template_id: fixture.template.id.clone(),
            month_ref: Some(13),
            year_ref: Some(2026),
        });
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn answers_aggregate_into_clamped_domain_scores() {
        let fixture = setup();
        let record = draft(&fixture, 3, 2026);

        let answers = vec![
            ItemAnswer {
                item_id: fixture.template.items[0].id.clone(),
                // Above the 5-point item maximum; clamps to 5.
                score: 9.0,
            },
            ItemAnswer {
                item_id: fixture.template.items[1].id.clone(),
                score: 4.0,
            },
            ItemAnswer {
                item_id: fixture.template.items[2].id.clone(),
                score: -2.0,
            },
        ];

        let updated = fixture
            .assessments
            .record_answers(&record.id, answers)
            .expect("record answers");

        assert_eq!(updated.scores.fluency, 9.0);
        assert_eq!(updated.scores.attention, 0.0);
        assert_eq!(updated.total_score, 9.0);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let fixture = setup();
        let record = draft(&fixture, 4, 2026);

        let result = fixture.assessments.record_answers(
            &record.id,
            vec![ItemAnswer {
                item_id: "item-fantasma".into(),
                score: 1.0,
            }],
        );
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn completed_assessment_is_immutable_until_reopened() {
        let fixture = setup();
        let record = draft(&fixture, 5, 2026);
        fixture
            .assessments
            .complete_assessment(&record.id)
            .expect("complete");

        let frozen = fixture.assessments.record_answers(
            &record.id,
            vec![ItemAnswer {
                item_id: fixture.template.items[0].id.clone(),
                score: 3.0,
            }],
        );
        assert!(matches!(frozen, Err(AppError::Conflict { .. })));

        let reopened = fixture
            .assessments
            .reopen_assessment(&record.id)
            .expect("reopen");
        assert_eq!(reopened.status, AssessmentStatus::Draft);

        fixture
            .assessments
            .record_answers(
                &record.id,
                vec![ItemAnswer {
                    item_id: fixture.template.items[0].id.clone(),
                    score: 3.0,
                }],
            )
            .expect("editable after reopen");
    }

    #[test]
    fn transitions_reject_wrong_direction() {
        let fixture = setup();
        let record = draft(&fixture, 6, 2026);

        let not_completed = fixture.assessments.reopen_assessment(&record.id);
        assert!(matches!(not_completed, Err(AppError::Conflict { .. })));

        fixture
            .assessments
            .complete_assessment(&record.id)
            .expect("complete");
        let twice = fixture.assessments.complete_assessment(&record.id);
        assert!(matches!(twice, Err(AppError::Conflict { .. })));
    }

    #[test]
    fn completed_assessment_cannot_be_deleted() {
        let fixture = setup();
        let record = draft(&fixture, 7, 2026);
        fixture
            .assessments
            .complete_assessment(&record.id)
            .expect("complete");

        let result = fixture.assessments.delete_assessment(&record.id);
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }
}
