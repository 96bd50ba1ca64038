use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::student::StudentRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        full_name,
        birth_date,
        turma_id,
        user_id,
        created_at,
        updated_at
    FROM students
"#;

#[derive(Debug, Clone)]
pub struct StudentRow {
    pub id: String,
    pub full_name: String,
    pub birth_date: Option<String>,
    pub turma_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StudentRow {
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            birth_date: record.birth_date.clone(),
            turma_id: record.turma_id.clone(),
            user_id: record.user_id.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> StudentRecord {
        StudentRecord {
            id: self.id,
            full_name: self.full_name,
            birth_date: self.birth_date,
            turma_id: self.turma_id,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for StudentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            full_name: row.get("full_name")?,
            birth_date: row.get("birth_date")?,
            turma_id: row.get("turma_id")?,
            user_id: row.get("user_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct StudentRepository;

impl StudentRepository {
    pub fn insert(conn: &Connection, row: &StudentRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO students (
                    id, full_name, birth_date, turma_id, user_id, created_at, updated_at
                ) VALUES (
                    :id, :full_name, :birth_date, :turma_id, :user_id, :created_at, :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":full_name": &row.full_name,
                ":birth_date": &row.birth_date,
                ":turma_id": &row.turma_id,
                ":user_id": &row.user_id,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, row: &StudentRow) -> AppResult<()> {
        conn.execute(
            r#"
                UPDATE students SET
                    full_name = :full_name,
                    birth_date = :birth_date,
                    turma_id = :turma_id,
                    user_id = :user_id,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":full_name": &row.full_name,
                ":birth_date": &row.birth_date,
                ":turma_id": &row.turma_id,
                ":user_id": &row.user_id,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let deleted = conn.execute("DELETE FROM students WHERE id = ?1", [id])?;
        Ok(deleted)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<StudentRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| StudentRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<StudentRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY full_name ASC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| StudentRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn list_by_turma(conn: &Connection, turma_id: &str) -> AppResult<Vec<StudentRow>> {
        let sql = format!("{BASE_SELECT} WHERE turma_id = ?1 ORDER BY full_name ASC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([turma_id], |row| StudentRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Roster size for class statistics.
    pub fn count_by_turma(conn: &Connection, turma_id: &str) -> AppResult<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM students WHERE turma_id = ?1",
            [turma_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn attach_user(conn: &Connection, student_id: &str, user_id: &str) -> AppResult<()> {
        conn.execute(
            "UPDATE students SET user_id = :user_id WHERE id = :id",
            named_params! {":user_id": user_id, ":id": student_id},
        )?;
        Ok(())
    }
}
