use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::RunnerError;
use crate::language::Language;
use crate::types::{RunOutcome, SubmissionRequest, SubmissionResponse};

/// Default sandbox endpoint.
pub const DEFAULT_BASE_URL: &str = "https://judge0-ce.p.rapidapi.com";
/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the remote execution sandbox. One request per run, no retries.
pub struct CodeRunner {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_host: String,
}

impl std::fmt::Debug for CodeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeRunner")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("api_host", &self.api_host)
            .finish()
    }
}

impl CodeRunner {
    /// Creates a runner for `base_url`. The `x-rapidapi-host` header is the URL's host.
    ///
    /// # Errors
    /// Returns an error if the URL has no host or the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, RunnerError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let api_host = reqwest::Url::parse(&base_url)
            .ok()
            .and_then(|url| url.host_str().map(ToOwned::to_owned))
            .ok_or_else(|| RunnerError::ClientInit(format!("invalid base URL '{base_url}'")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RunnerError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url, api_host })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `source` and wait for the result.
    ///
    /// # Errors
    /// Returns `HttpRequest` when the sandbox is unreachable or times out,
    /// `HttpStatus` on a non-success answer, and `MalformedResponse` when the
    /// body is not the expected JSON or its fields are not valid base64.
    pub async fn run(&self, language: Language, source: &str) -> Result<RunOutcome, RunnerError> {
        let body = SubmissionRequest {
            language_id: language.runtime_id(),
            source_code: STANDARD.encode(normalize_source(source)),
            stdin: "",
        };

        tracing::debug!(language = %language, bytes = source.len(), "Submitting code");
        let response = self
            .client
            .post(format!("{}/submissions", self.base_url))
            .query(&[("base64_encoded", "true"), ("wait", "true")])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            tracing::warn!(code = status.as_u16(), "Execution service returned an error status");
            return Err(RunnerError::HttpStatus { code: status.as_u16(), body });
        }

        let text = response.text().await?;
        let parsed: SubmissionResponse = serde_json::from_str(&text)
            .map_err(|e| RunnerError::MalformedResponse(format!("invalid JSON: {e}")))?;
        if let Some(status) = &parsed.status {
            tracing::debug!(status = %status.description, "Submission finished");
        }
        interpret(&parsed)
    }
}

/// Strip trailing whitespace from every line and join with `\n`.
#[must_use]
pub fn normalize_source(source: &str) -> String {
    source.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

fn decode_field(name: &str, value: Option<&String>) -> Result<Option<String>, RunnerError> {
    let Some(encoded) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    // Judge0 wraps base64 output at 60 columns.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| RunnerError::MalformedResponse(format!("{name} is not base64: {e}")))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok((!text.is_empty()).then_some(text))
}

fn interpret(response: &SubmissionResponse) -> Result<RunOutcome, RunnerError> {
    if let Some(stdout) = decode_field("stdout", response.stdout.as_ref())? {
        return Ok(RunOutcome::Stdout(stdout));
    }
    if let Some(stderr) = decode_field("stderr", response.stderr.as_ref())? {
        return Ok(RunOutcome::Stderr(stderr));
    }
    if let Some(compile) = decode_field("compile_output", response.compile_output.as_ref())? {
        return Ok(RunOutcome::Stderr(compile));
    }
    Ok(RunOutcome::NoOutput)
}
