use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::assessment::{
    AssessmentRecord, AssessmentStatus, DomainScores, ItemAnswer,
};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        student_id,
        template_id,
        month_ref,
        year_ref,
        status,
        total_score,
        fluency_score,
        culture_score,
        interpretation_score,
        attention_score,
        self_perception_score,
        answers,
        created_at,
        updated_at
    FROM assessments
"#;

#[derive(Debug, Clone)]
pub struct AssessmentRow {
    pub id: String,
    pub student_id: String,
    pub template_id: String,
    pub month_ref: u32,
    pub year_ref: i32,
    pub status: String,
    pub total_score: f64,
    pub fluency_score: f64,
    pub culture_score: f64,
    pub interpretation_score: f64,
    pub attention_score: f64,
    pub self_perception_score: f64,
    pub answers: String,
    pub created_at: String,
    pub updated_at: String,
}

impl AssessmentRow {
    pub fn from_record(record: &AssessmentRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            student_id: record.student_id.clone(),
            template_id: record.template_id.clone(),
            month_ref: record.month_ref,
            year_ref: record.year_ref,
            status: record.status.as_str().to_string(),
            total_score: record.total_score,
            fluency_score: record.scores.fluency,
            culture_score: record.scores.culture,
            interpretation_score: record.scores.interpretation,
            attention_score: record.scores.attention,
            self_perception_score: record.scores.self_perception,
            answers: serde_json::to_string(&record.answers)?,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<AssessmentRecord> {
        let status = AssessmentStatus::parse(&self.status).ok_or_else(|| {
            AppError::database(format!("status de avaliação inválido: {}", self.status))
        })?;
        let answers: Vec<ItemAnswer> = serde_json::from_str(&self.answers)?;

        Ok(AssessmentRecord {
            id: self.id,
            student_id: self.student_id,
            template_id: self.template_id,
            month_ref: self.month_ref,
            year_ref: self.year_ref,
            status,
            total_score: self.total_score,
            scores: DomainScores {
                fluency: self.fluency_score,
                culture: self.culture_score,
                interpretation: self.interpretation_score,
                attention: self.attention_score,
                self_perception: self.self_perception_score,
            },
            answers,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for AssessmentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            template_id: row.get("template_id")?,
            month_ref: row.get("month_ref")?,
            year_ref: row.get("year_ref")?,
            status: row.get("status")?,
            total_score: row.get("total_score")?,
            fluency_score: row.get("fluency_score")?,
            culture_score: row.get("culture_score")?,
            interpretation_score: row.get("interpretation_score")?,
            attention_score: row.get("attention_score")?,
            self_perception_score: row.get("self_perception_score")?,
            answers: row.get("answers")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct AssessmentRepository;

impl AssessmentRepository {
    pub fn insert(conn: &Connection, row: &AssessmentRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO assessments (
                    id,
                    student_id,
                    template_id,
                    month_ref,
                    year_ref,
                    status,
                    total_score,
                    fluency_score,
                    culture_score,
                    interpretation_score,
                    attention_score,
                    self_perception_score,
                    answers,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :student_id,
                    :template_id,
                    :month_ref,
                    :year_ref,
                    :status,
                    :total_score,
                    :fluency_score,
                    :culture_score,
                    :interpretation_score,
                    :attention_score,
                    :self_perception_score,
                    :answers,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":student_id": &row.student_id,
                ":template_id": &row.template_id,
                ":month_ref": &row.month_ref,
                ":year_ref": &row.year_ref,
                ":status": &row.status,
                ":total_score": &row.total_score,
                ":fluency_score": &row.fluency_score,
                ":culture_score": &row.culture_score,
                ":interpretation_score": &row.interpretation_score,
                ":attention_score": &row.attention_score,
                ":self_perception_score": &row.self_perception_score,
                ":answers": &row.answers,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, row: &AssessmentRow) -> AppResult<()> {
        conn.execute(
            r#"
                UPDATE assessments SET
                    status = :status,
                    total_score = :total_score,
                    fluency_score = :fluency_score,
                    culture_score = :culture_score,
                    interpretation_score = :interpretation_score,
                    attention_score = :attention_score,
                    self_perception_score = :self_perception_score,
                    answers = :answers,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":status": &row.status,
                ":total_score": &row.total_score,
                ":fluency_score": &row.fluency_score,
                ":culture_score": &row.culture_score,
                ":interpretation_score": &row.interpretation_score,
                ":attention_score": &row.attention_score,
                ":self_perception_score": &row.self_perception_score,
                ":answers": &row.answers,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let deleted = conn.execute("DELETE FROM assessments WHERE id = ?1", [id])?;
        Ok(deleted)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<AssessmentRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| AssessmentRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    /// Uniqueness probe for `(student, month, year)` before insertion.
    pub fn find_by_student_period(
        conn: &Connection,
        student_id: &str,
        month_ref: u32,
        year_ref: i32,
    ) -> AppResult<Option<AssessmentRow>> {
        let sql = format!(
            "{BASE_SELECT} WHERE student_id = :student_id AND month_ref = :month_ref AND year_ref = :year_ref"
        );
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row(
                named_params! {
                    ":student_id": student_id,
                    ":month_ref": month_ref,
                    ":year_ref": year_ref,
                },
                |row| AssessmentRow::try_from(row),
            )
            .optional()?;

        Ok(row)
    }

    /// History for one student, ascending by `(year_ref, month_ref)`. The
    /// optional boundary keeps calendar-ordering semantics over the discrete
    /// month/year pair: year strictly greater, or same year and month on or
    /// after the boundary month.
    pub fn list_by_student(
        conn: &Connection,
        student_id: &str,
        boundary: Option<(i32, u32)>,
    ) -> AppResult<Vec<AssessmentRow>> {
        match boundary {
            Some((year, month)) => {
                let sql = format!(
                    r#"{BASE_SELECT}
                        WHERE student_id = :student_id
                          AND (year_ref > :year OR (year_ref = :year AND month_ref >= :month))
                        ORDER BY year_ref ASC, month_ref ASC"#
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(
                        named_params! {
                            ":student_id": student_id,
                            ":year": year,
                            ":month": month,
                        },
                        |row| AssessmentRow::try_from(row),
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }
            None => {
                let sql = format!(
                    "{BASE_SELECT} WHERE student_id = :student_id ORDER BY year_ref ASC, month_ref ASC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(named_params! {":student_id": student_id}, |row| {
                        AssessmentRow::try_from(row)
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        }
    }

    /// All assessments of a turma's roster for one month/year.
    pub fn list_by_turma_period(
        conn: &Connection,
        turma_id: &str,
        month_ref: u32,
        year_ref: i32,
    ) -> AppResult<Vec<AssessmentRow>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT
                a.id,
                a.student_id,
                a.template_id,
                a.month_ref,
                a.year_ref,
                a.status,
                a.total_score,
                a.fluency_score,
                a.culture_score,
                a.interpretation_score,
                a.attention_score,
                a.self_perception_score,
                a.answers,
                a.created_at,
                a.updated_at
            FROM assessments a
            INNER JOIN students s ON s.id = a.student_id
            WHERE s.turma_id = :turma_id
              AND a.month_ref = :month_ref
              AND a.year_ref = :year_ref
            ORDER BY a.student_id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":turma_id": turma_id,
                    ":month_ref": month_ref,
                    ":year_ref": year_ref,
                },
                |row| AssessmentRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
