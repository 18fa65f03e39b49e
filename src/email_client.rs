use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ConfigError, EmailError};
use crate::validators::is_valid_email;

/// Delivers the activation link to a freshly registered address
#[async_trait]
pub trait ActivationNotifier: Send + Sync {
    async fn send_activation_mail(&self, recipient: &str, link: &str) -> Result<(), EmailError>;
}

#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: SenderEmail,
}

/// A validated From address
#[derive(Clone, Debug)]
pub struct SenderEmail(String);

impl SenderEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        let email = is_valid_email(&s).map_err(|e| e.to_string())?;
        Ok(Self(email))
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SenderEmail,
        timeout: std::time::Duration,
    ) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue(format!("email_client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            sender,
        })
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
    ) -> Result<(), EmailError> {
        let url = format!("{}/email", self.base_url.trim_end_matches('/'));
        let request = SendEmailRequest {
            from: self.sender.inner(),
            to: recipient,
            subject,
            html_body: html_content,
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    EmailError::ServiceUnavailable(e.to_string())
                } else {
                    EmailError::SendFailed(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ActivationNotifier for EmailClient {
    async fn send_activation_mail(&self, recipient: &str, link: &str) -> Result<(), EmailError> {
        let recipient = is_valid_email(recipient)
            .map_err(|e| EmailError::InvalidRecipient(e.to_string()))?;

        let html = format!(
            "<div><h1>Account activation</h1>\
             <p>Follow the link to activate your account:</p>\
             <a href=\"{link}\">{link}</a></div>",
            link = link
        );

        self.send_email(&recipient, "Activate your account", &html).await
    }
}
