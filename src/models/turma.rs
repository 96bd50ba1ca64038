use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurmaRecord {
    pub id: String,
    pub name: String,
    pub school_year: i32,
    pub moderator_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurmaCreateInput {
    pub name: String,
    pub school_year: Option<i32>,
    #[serde(default)]
    pub moderator_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurmaUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub school_year: Option<i32>,
    #[serde(default)]
    pub moderator_id: Option<Option<String>>,
}
