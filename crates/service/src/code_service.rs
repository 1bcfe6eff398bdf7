use std::sync::Arc;

use pathbot_core::constants::MAX_SOURCE_LEN;
use pathbot_runner::{CodeRunner, Language, RunOutcome};

use crate::ServiceError;

/// Relays submitted code to the execution sandbox when one is configured.
pub struct CodeService {
    runner: Option<Arc<CodeRunner>>,
}

impl CodeService {
    #[must_use]
    pub const fn new(runner: Option<Arc<CodeRunner>>) -> Self {
        Self { runner }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.runner.is_some()
    }

    /// Parse a language name chosen by the user.
    pub fn language(raw: &str) -> Result<Language, ServiceError> {
        Ok(raw.parse::<Language>()?)
    }

    pub async fn run(&self, language: Language, source: &str) -> Result<RunOutcome, ServiceError> {
        if source.trim().is_empty() {
            return Err(ServiceError::Validation("source code must not be empty".to_owned()));
        }
        if source.chars().count() > MAX_SOURCE_LEN {
            return Err(ServiceError::Validation(format!(
                "source code must be at most {MAX_SOURCE_LEN} characters"
            )));
        }
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured("code execution is not configured".to_owned()))?;
        let outcome = runner.run(language, source).await.inspect_err(|e| {
            tracing::warn!(language = %language, error = %e, "Code execution failed");
        })?;
        Ok(outcome)
    }
}
