use crate::domain::error::ParseError;
use crate::domain::record::{record_impls, Fields, Record};
use crate::domain::timestamp::Timestamp;
use serde::Serialize;

/// A trader's daily self-assessment. Scores are nominally 1-10 but are not
/// range-checked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fomo_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for RiskAssessment {
    const KIND: &'static str = "RiskAssessment";

    fn from_fields(f: &Fields<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: f.string("id")?,
            date: f.timestamp("date")?,
            emotional_score: f.number("emotionalScore")?,
            fomo_score: f.number("fomoScore")?,
            bias_score: f.number("biasScore")?,
            overall_score: f.number("overallScore")?,
            notes: f.string("notes")?,
        })
    }
}

record_impls!(RiskAssessment);

impl RiskAssessment {
    pub fn draft() -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            date: Some(Timestamp::now()),
            ..Self::default()
        }
    }

    /// Copy with `overall_score` set to the mean of the three component
    /// scores truncated toward zero, or cleared when any component is missing.
    pub fn with_calculated_overall(&self) -> Self {
        let overall = match (self.emotional_score, self.fomo_score, self.bias_score) {
            (Some(e), Some(f), Some(b)) => Some(((e + f + b) / 3.0).trunc()),
            _ => None,
        };
        Self {
            overall_score: overall,
            ..self.clone()
        }
    }
}

/// Oldest first.
pub fn sort_by_date(assessments: &mut [RiskAssessment]) {
    assessments.sort_by_key(|a| a.date);
}
