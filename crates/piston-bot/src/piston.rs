//! HTTP client for the Piston execution backend

use piston_types::{ExecOutcome, ExecRequest, ExecWireResponse, Runtime};
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::error::{Error, Result};

/// Thin client over the backend's `/execute` and `/runtimes` endpoints.
#[derive(Debug, Clone)]
pub struct PistonClient {
    http: HttpClient,
    base_url: String,
}

impl PistonClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Run one job. The union-shaped body is resolved here, once; the
    /// body is parsed regardless of HTTP status because the backend
    /// reports throttling and validation errors as `{message}` bodies
    /// on non-2xx statuses too.
    pub async fn execute(&self, request: &ExecRequest) -> Result<ExecOutcome> {
        let url = format!("{}/execute", self.base_url);
        debug!(language = %request.language, "Submitting execution request");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ExecWireResponse>(&body) {
            Ok(wire) => Ok(ExecOutcome::from_wire(wire)),
            Err(_) => Err(Error::Backend(format!(
                "unparseable response (status {status}): {body}"
            ))),
        }
    }

    /// Fetch the advertised runtime list.
    pub async fn runtimes(&self) -> Result<Vec<Runtime>> {
        let url = format!("{}/runtimes", self.base_url);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piston_types::ExecOutcome;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ExecRequest {
        ExecRequest::new("rust", "fn main() {}", vec![], "")
    }

    #[tokio::test]
    async fn test_execute_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "language": "rust",
                "version": "1.68.2",
                "run": {"stdout": "hi\n", "stderr": "", "output": "hi\n", "code": 0, "signal": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PistonClient::new(HttpClient::new(), server.uri());
        match client.execute(&request()).await.unwrap() {
            ExecOutcome::Success(success) => assert_eq!(success.run.output, "hi\n"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_sends_expected_body() {
        let server = MockServer::start().await;
        let expected = serde_json::to_string(&request()).unwrap();
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_json_string(&expected))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "runtime is unknown"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = PistonClient::new(HttpClient::new(), server.uri());
        let outcome = client.execute(&request()).await.unwrap();
        assert_eq!(outcome, ExecOutcome::Error("runtime is unknown".to_string()));
    }

    #[tokio::test]
    async fn test_throttle_body_on_429_resolves_to_throttled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(429).set_body_json(
                serde_json::json!({"message": "Requests limited to 5 per second"}),
            ))
            .mount(&server)
            .await;

        let client = PistonClient::new(HttpClient::new(), server.uri());
        assert!(client.execute(&request()).await.unwrap().is_throttled());
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = PistonClient::new(HttpClient::new(), server.uri());
        assert!(client.execute(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_runtimes_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/runtimes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"language": "rust", "version": "1.68.2", "aliases": ["rs"]}
            ])))
            .mount(&server)
            .await;

        let client = PistonClient::new(HttpClient::new(), server.uri());
        let runtimes = client.runtimes().await.unwrap();
        assert_eq!(runtimes.len(), 1);
        assert_eq!(runtimes[0].language, "rust");
    }
}
