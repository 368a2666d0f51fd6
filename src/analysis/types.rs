use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured verdict for one uploaded remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ingredients: Ingredients,
    pub claim: String,
    pub reality_check: RealityCheck,
    pub verdict: Verdict,
    pub multilingual_summary: MultilingualSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredients {
    pub identified: Vec<String>,
    pub visual_evidence: String,
}

/// Traditional claim vs. clinical evidence, and where the viral content overreaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityCheck {
    pub traditional_perspective: String,
    pub modern_scientific_view: String,
    pub the_gap: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub safety_rating: SafetyRating,
    pub risk_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyRating {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "USE CAUTION", alias = "USE_CAUTION")]
    UseCaution,
    #[serde(rename = "DANGEROUS")]
    Dangerous,
}

impl SafetyRating {
    pub const ALL: [SafetyRating; 3] = [Self::Safe, Self::UseCaution, Self::Dangerous];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::UseCaution => "USE CAUTION",
            Self::Dangerous => "DANGEROUS",
        }
    }
}

impl fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilingualSummary {
    pub english: String,
    pub local: String,
}

/// A web citation returned by the model's search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}
