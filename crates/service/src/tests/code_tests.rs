use std::sync::Arc;
use std::time::Duration;

use pathbot_runner::{CodeRunner, Language, RunOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{CodeService, ServiceError};

#[expect(clippy::unwrap_used, reason = "test code")]
fn service_for(server: &MockServer) -> CodeService {
    let runner = CodeRunner::new("key".to_owned(), &server.uri(), Duration::from_secs(5)).unwrap();
    CodeService::new(Some(Arc::new(runner)))
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn relays_stdout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "stdout": "aGkK",
            "stderr": null
        })))
        .mount(&server)
        .await;

    let outcome = service_for(&server).run(Language::Python, "print('hi')").await.unwrap();
    assert_eq!(outcome, RunOutcome::Stdout("hi\n".to_owned()));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn sandbox_failure_is_unavailable_not_stderr() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let err = service_for(&server).run(Language::C, "int main(){}").await.unwrap_err();
    assert!(matches!(err, ServiceError::ExecutionUnavailable(_)));
    assert_eq!(err.kind(), "unavailable");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unconfigured_relay_reports_not_configured() {
    let service = CodeService::new(None);
    assert!(!service.is_configured());
    let err = service.run(Language::Python, "print(1)").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotConfigured(_)));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn empty_or_oversized_source_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let service = service_for(&server);

    let err = service.run(Language::Python, "  \n ").await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    let huge = "x".repeat(pathbot_core::constants::MAX_SOURCE_LEN + 1);
    let err = service.run(Language::Python, &huge).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn unknown_language_is_validation() {
    let err = CodeService::language("cobol").err();
    assert!(matches!(err, Some(ServiceError::Validation(_))));
    assert!(matches!(CodeService::language("C++"), Ok(Language::Cpp)));
}
