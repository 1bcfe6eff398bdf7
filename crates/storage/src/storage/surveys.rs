use pathbot_core::{SatisfactionResponse, SurveyAnswers};
use rusqlite::{OptionalExtension, params};

use super::{Result, Storage, decode_ts, encode_ts, get_conn};

impl Storage {
    /// # Errors
    /// Returns error if database insert fails.
    pub fn save_satisfaction_response(&self, response: &SatisfactionResponse) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let answers = &response.answers;
        conn.execute(
            "INSERT INTO satisfaction_responses
               (id, user_id, overall_satisfaction, ease_of_use, reliability,
                support_satisfaction, suggestions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                response.id,
                response.user_id,
                answers.overall_satisfaction,
                answers.ease_of_use,
                answers.reliability,
                answers.support_satisfaction,
                answers.suggestions,
                encode_ts(response.created_at)
            ],
        )?;
        tracing::info!(response_id = %response.id, user_id = %response.user_id, "Survey response saved");
        Ok(())
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_satisfaction_response(&self, id: &str) -> Result<Option<SatisfactionResponse>> {
        let conn = get_conn(&self.pool)?;
        let response = conn
            .query_row(
                "SELECT id, user_id, overall_satisfaction, ease_of_use, reliability,
                        support_satisfaction, suggestions, created_at
                 FROM satisfaction_responses WHERE id = ?1",
                params![id],
                |row| {
                    Ok(SatisfactionResponse {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        answers: SurveyAnswers {
                            overall_satisfaction: row.get(2)?,
                            ease_of_use: row.get(3)?,
                            reliability: row.get(4)?,
                            support_satisfaction: row.get(5)?,
                            suggestions: row.get(6)?,
                        },
                        created_at: decode_ts(7, &row.get::<_, String>(7)?)?,
                    })
                },
            )
            .optional()?;
        Ok(response)
    }
}
