use serde::{Deserialize, Serialize};

use crate::models::template::CognitiveDomain;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentStatus {
    Draft,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "DRAFT",
            AssessmentStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<AssessmentStatus> {
        match value {
            "DRAFT" => Some(AssessmentStatus::Draft),
            "COMPLETED" => Some(AssessmentStatus::Completed),
            _ => None,
        }
    }
}

/// One score per cognitive domain, each clamped to `[0, domain_max_score]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainScores {
    pub fluency: f64,
    pub culture: f64,
    pub interpretation: f64,
    pub attention: f64,
    pub self_perception: f64,
}

impl DomainScores {
    pub fn get(&self, domain: CognitiveDomain) -> f64 {
        match domain {
            CognitiveDomain::Fluency => self.fluency,
            CognitiveDomain::Culture => self.culture,
            CognitiveDomain::Interpretation => self.interpretation,
            CognitiveDomain::Attention => self.attention,
            CognitiveDomain::SelfPerception => self.self_perception,
        }
    }

    pub fn set(&mut self, domain: CognitiveDomain, value: f64) {
        match domain {
            CognitiveDomain::Fluency => self.fluency = value,
            CognitiveDomain::Culture => self.culture = value,
            CognitiveDomain::Interpretation => self.interpretation = value,
            CognitiveDomain::Attention => self.attention = value,
            CognitiveDomain::SelfPerception => self.self_perception = value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemAnswer {
    pub item_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: String,
    pub student_id: String,
    pub template_id: String,
    pub month_ref: u32,
    pub year_ref: i32,
    pub status: AssessmentStatus,
    pub total_score: f64,
    pub scores: DomainScores,
    pub answers: Vec<ItemAnswer>,
    pub created_at: String,
    pub updated_at: String,
}

impl AssessmentRecord {
    /// Calendar ordering key for the discrete month/year pair.
    pub fn period_key(&self) -> (i32, u32) {
        (self.year_ref, self.month_ref)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCreateInput {
    pub student_id: String,
    pub template_id: String,
    pub month_ref: Option<u32>,
    pub year_ref: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAnswersInput {
    #[serde(default)]
    pub answers: Vec<ItemAnswer>,
}
