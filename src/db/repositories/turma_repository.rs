use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::turma::TurmaRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        school_year,
        moderator_id,
        created_at,
        updated_at
    FROM turmas
"#;

#[derive(Debug, Clone)]
pub struct TurmaRow {
    pub id: String,
    pub name: String,
    pub school_year: i32,
    pub moderator_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TurmaRow {
    pub fn from_record(record: &TurmaRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            school_year: record.school_year,
            moderator_id: record.moderator_id.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> TurmaRecord {
        TurmaRecord {
            id: self.id,
            name: self.name,
            school_year: self.school_year,
            moderator_id: self.moderator_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for TurmaRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            school_year: row.get("school_year")?,
            moderator_id: row.get("moderator_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct TurmaRepository;

impl TurmaRepository {
    pub fn insert(conn: &Connection, row: &TurmaRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO turmas (
                    id, name, school_year, moderator_id, created_at, updated_at
                ) VALUES (
                    :id, :name, :school_year, :moderator_id, :created_at, :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":school_year": &row.school_year,
                ":moderator_id": &row.moderator_id,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, row: &TurmaRow) -> AppResult<()> {
        conn.execute(
            r#"
                UPDATE turmas SET
                    name = :name,
                    school_year = :school_year,
                    moderator_id = :moderator_id,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":school_year": &row.school_year,
                ":moderator_id": &row.moderator_id,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let deleted = conn.execute("DELETE FROM turmas WHERE id = ?1", [id])?;
        Ok(deleted)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<TurmaRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| TurmaRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<TurmaRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY school_year DESC, name ASC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| TurmaRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
