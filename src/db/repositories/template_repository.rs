use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::template::{TemplateItem, TemplateRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        description,
        items,
        created_at,
        updated_at
    FROM templates
"#;

#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub items: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TemplateRow {
    pub fn from_record(record: &TemplateRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            items: serde_json::to_string(&record.items)?,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<TemplateRecord> {
        let items: Vec<TemplateItem> = serde_json::from_str(&self.items)?;
        Ok(TemplateRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for TemplateRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            items: row.get("items")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct TemplateRepository;

impl TemplateRepository {
    pub fn insert(conn: &Connection, row: &TemplateRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO templates (
                    id, name, description, items, created_at, updated_at
                ) VALUES (
                    :id, :name, :description, :items, :created_at, :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":description": &row.description,
                ":items": &row.items,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, row: &TemplateRow) -> AppResult<()> {
        conn.execute(
            r#"
                UPDATE templates SET
                    name = :name,
                    description = :description,
                    items = :items,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":description": &row.description,
                ":items": &row.items,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let deleted = conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
        Ok(deleted)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<TemplateRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;

        let row = stmt
            .query_row([id], |row| TemplateRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<TemplateRow>> {
        let sql = format!("{BASE_SELECT} ORDER BY name ASC");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| TemplateRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
