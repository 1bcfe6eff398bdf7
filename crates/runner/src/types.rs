use serde::{Deserialize, Serialize};

/// Submission body. `source_code` is base64.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionRequest<'a> {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: &'a str,
}

/// Fields of the sandbox answer we use. All text fields are base64 or absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmissionResponse {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionStatus {
    #[serde(default)]
    pub description: String,
}

/// What the program produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RunOutcome {
    Stdout(String),
    /// Runtime or compile error text from the sandbox.
    Stderr(String),
    NoOutput,
}
