//! Discord webhook follow-up client
//!
//! After a deferred acknowledgement, results are pushed through the
//! webhook API addressed by `(application_id, interaction token)`:
//! PATCH `…/messages/@original` edits the acknowledgement, POST creates
//! an extra follow-up message. Bodies are JSON, or form data with a
//! `payload_json` part when files are attached.

use piston_types::{FileAttachment, ResponseData};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Method};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: HttpClient,
    api_base: String,
    application_id: String,
}

impl WebhookClient {
    pub fn new(http: HttpClient, api_base: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            application_id: application_id.into(),
        }
    }

    /// Edit the original deferred acknowledgement message.
    pub async fn edit_original(
        &self,
        token: &str,
        data: &ResponseData,
        files: &[FileAttachment],
    ) -> Result<()> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, self.application_id, token
        );
        self.send(Method::PATCH, url, data, files).await
    }

    /// Create an additional follow-up message.
    pub async fn create_followup(
        &self,
        token: &str,
        data: &ResponseData,
        files: &[FileAttachment],
    ) -> Result<()> {
        let url = format!("{}/webhooks/{}/{}", self.api_base, self.application_id, token);
        self.send(Method::POST, url, data, files).await
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        data: &ResponseData,
        files: &[FileAttachment],
    ) -> Result<()> {
        debug!(%method, files = files.len(), "Sending webhook call");
        let request = self.http.request(method, &url);

        let response = if files.is_empty() {
            request.json(data).send().await?
        } else {
            let mut form = Form::new().text("payload_json", serde_json::to_string(data)?);
            for file in files {
                let part = Part::bytes(file.data.clone().into_bytes())
                    .file_name(file.name.clone())
                    .mime_str("application/octet-stream")
                    .map_err(|e| Error::Config(format!("invalid mime type: {e}")))?;
                form = form.part(file.name.clone(), part);
            }
            request.multipart(form).send().await?
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DiscordApi {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WebhookClient {
        WebhookClient::new(HttpClient::new(), server.uri(), "9999")
    }

    fn message(content: &str) -> ResponseData {
        ResponseData {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_edit_original_patches_at_original_route() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/webhooks/9999/tok/messages/@original"))
            .and(body_string_contains("all done"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .edit_original("tok", &message("all done"), &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_followup_posts_to_webhook_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/9999/tok"))
            .and(body_string_contains("mobile part"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .create_followup("tok", &message("mobile part"), &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_files_switch_body_to_form_data() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/webhooks/9999/tok/messages/@original"))
            .and(body_string_contains("payload_json"))
            .and(body_string_contains("print(42)"))
            .and(body_string_contains("source.py"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let files = vec![FileAttachment::new("source.py", "print(42)")];
        client(&server)
            .edit_original("tok", &message("output is below"), &files)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/webhooks/9999/expired/messages/@original"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .mount(&server)
            .await;

        let err = client(&server)
            .edit_original("expired", &message("late"), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
