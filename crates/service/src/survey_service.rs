use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use pathbot_core::{Member, SURVEY_FIELDS, SatisfactionResponse, SurveyAnswers};
use pathbot_storage::Store;
use pathbot_storage::traits::SurveyStore;

use crate::ServiceError;

/// Satisfaction survey collection.
pub struct SurveyService {
    store: Arc<dyn Store>,
}

impl SurveyService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate a submitted survey form and store it under a fresh id.
    ///
    /// `fields` is keyed by the names in [`SURVEY_FIELDS`]; missing fields count as blank.
    pub async fn submit(
        &self,
        user_id: &str,
        fields: &HashMap<String, String>,
    ) -> Result<SatisfactionResponse, ServiceError> {
        let field = |index: usize| {
            SURVEY_FIELDS.get(index).and_then(|(name, _)| fields.get(*name)).map_or("", String::as_str)
        };
        let answers = SurveyAnswers::parse(field(0), field(1), field(2), field(3), field(4))?;
        let response = SatisfactionResponse {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            answers,
            created_at: Utc::now(),
        };
        self.store.save_satisfaction_response(&response).await?;
        tracing::info!(user_id, response_id = %response.id, "Satisfaction response saved");
        Ok(response)
    }

    pub async fn get(&self, id: &str) -> Result<SatisfactionResponse, ServiceError> {
        self.store
            .get_satisfaction_response(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Survey response {id} not found.")))
    }
}

/// Members who receive a survey request: everyone but bots.
#[must_use]
pub fn survey_recipients(members: &[Member]) -> Vec<&Member> {
    members.iter().filter(|m| !m.bot).collect()
}
