use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TEXT_LEN, SCORE_MAX, SCORE_MIN};
use crate::error::CoreError;

/// Form field names of the satisfaction survey, in display order.
pub const SURVEY_FIELDS: [(&str, &str); 5] = [
    ("overall_satisfaction", "Overall Satisfaction (1-10)"),
    ("ease_of_use", "Ease of Use (1-10)"),
    ("reliability", "Reliability (1-10)"),
    ("support_satisfaction", "Support Satisfaction (1-10)"),
    ("suggestions", "Suggestions for Improvement"),
];

/// Validated survey answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub overall_satisfaction: u8,
    pub ease_of_use: u8,
    pub reliability: u8,
    pub support_satisfaction: u8,
    pub suggestions: String,
}

impl SurveyAnswers {
    /// Parse raw form values. Scores must be integers in `1..=10`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidInput` naming the first offending field.
    pub fn parse(
        overall_satisfaction: &str,
        ease_of_use: &str,
        reliability: &str,
        support_satisfaction: &str,
        suggestions: &str,
    ) -> Result<Self, CoreError> {
        let suggestions = suggestions.trim();
        if suggestions.chars().count() > MAX_TEXT_LEN {
            return Err(CoreError::InvalidInput(format!(
                "suggestions must be at most {MAX_TEXT_LEN} characters"
            )));
        }
        Ok(Self {
            overall_satisfaction: parse_score("overall satisfaction", overall_satisfaction)?,
            ease_of_use: parse_score("ease of use", ease_of_use)?,
            reliability: parse_score("reliability", reliability)?,
            support_satisfaction: parse_score("support satisfaction", support_satisfaction)?,
            suggestions: suggestions.to_owned(),
        })
    }
}

/// A stored survey submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionResponse {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub answers: SurveyAnswers,
    pub created_at: DateTime<Utc>,
}

fn parse_score(field: &str, raw: &str) -> Result<u8, CoreError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|score| (SCORE_MIN..=SCORE_MAX).contains(score))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "{field} must be a number between {SCORE_MIN} and {SCORE_MAX}"
            ))
        })
}
