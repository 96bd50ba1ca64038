use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::user::{Role, UserRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        full_name,
        login,
        role,
        student_id,
        created_at,
        updated_at
    FROM users
"#;

/// The password hash never leaves this module inside a `UserRecord`; it is
/// read through `find_password_hash` only.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub login: String,
    pub role: String,
    pub student_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_record(self) -> AppResult<UserRecord> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| AppError::database(format!("perfil inválido: {}", self.role)))?;

        Ok(UserRecord {
            id: self.id,
            full_name: self.full_name,
            login: self.login,
            role,
            student_id: self.student_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for UserRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            full_name: row.get("full_name")?,
            login: row.get("login")?,
            role: row.get("role")?,
            student_id: row.get("student_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn insert(
        conn: &Connection,
        record: &UserRecord,
        password_hash: &str,
    ) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO users (
                    id, full_name, login, password_hash, role, student_id, created_at, updated_at
                ) VALUES (
                    :id, :full_name, :login, :password_hash, :role, :student_id, :created_at, :updated_at
                )
            "#,
            named_params! {
                ":id": &record.id,
                ":full_name": &record.full_name,
                ":login": &record.login,
                ":password_hash": password_hash,
                ":role": record.role.as_str(),
                ":student_id": &record.student_id,
                ":created_at": &record.created_at,
                ":updated_at": &record.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update_password(
        conn: &Connection,
        user_id: &str,
        password_hash: &str,
        updated_at: &str,
    ) -> AppResult<usize> {
        let changed = conn.execute(
            r#"
                UPDATE users SET
                    password_hash = :password_hash,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": user_id,
                ":password_hash": password_hash,
                ":updated_at": updated_at,
            },
        )?;

        Ok(changed)
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(deleted)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<UserRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| UserRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn find_by_login(conn: &Connection, login: &str) -> AppResult<Option<UserRow>> {
        let sql = format!("{BASE_SELECT} WHERE login = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([login], |row| UserRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn login_exists(conn: &Connection, login: &str) -> AppResult<bool> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login = ?1)",
            [login],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    pub fn find_password_hash(conn: &Connection, login: &str) -> AppResult<Option<String>> {
        let hash = conn
            .query_row(
                "SELECT password_hash FROM users WHERE login = ?1",
                [login],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<UserRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY full_name ASC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| UserRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
