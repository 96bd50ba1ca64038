use serde::{Deserialize, Serialize};

/// The five cognitive domains every template item is tagged with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CognitiveDomain {
    Fluency,
    Culture,
    Interpretation,
    Attention,
    SelfPerception,
}

impl CognitiveDomain {
    pub const ALL: [CognitiveDomain; 5] = [
        CognitiveDomain::Fluency,
        CognitiveDomain::Culture,
        CognitiveDomain::Interpretation,
        CognitiveDomain::Attention,
        CognitiveDomain::SelfPerception,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveDomain::Fluency => "fluency",
            CognitiveDomain::Culture => "culture",
            CognitiveDomain::Interpretation => "interpretation",
            CognitiveDomain::Attention => "attention",
            CognitiveDomain::SelfPerception => "selfPerception",
        }
    }

    /// Display label used on dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            CognitiveDomain::Fluency => "Fluência",
            CognitiveDomain::Culture => "Cultura",
            CognitiveDomain::Interpretation => "Interpretação",
            CognitiveDomain::Attention => "Atenção",
            CognitiveDomain::SelfPerception => "Autopercepção",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateItem {
    pub id: String,
    pub prompt: String,
    pub domain: CognitiveDomain,
    pub max_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<TemplateItem>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateItemInput {
    pub prompt: String,
    pub domain: Option<CognitiveDomain>,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<TemplateItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub items: Option<Vec<TemplateItemInput>>,
}
