//! Outbound email client for account confirmation
//!
//! Talks to a REST mail API. When `MAILER_BASE_URL` is unset the client logs
//! the confirmation link instead of sending, so local development needs no
//! mail provider.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("mailer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mailer rejected message: {0}")]
    Api(String),
}

#[derive(Clone)]
pub struct EmailClient {
    http: Client,
    base_url: Option<String>,
    token: String,
    sender: String,
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}

impl EmailClient {
    pub fn new(base_url: Option<String>, token: String, sender: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token,
            sender,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("MAILER_BASE_URL").ok();
        let token = std::env::var("MAILER_TOKEN").unwrap_or_default();
        let sender = std::env::var("MAILER_SENDER")
            .unwrap_or_else(|_| "admin@chirper.local".to_string());
        Self::new(base_url, token, sender)
    }

    /// Send the email-confirmation message carrying the verification link.
    pub async fn send_confirmation(&self, to: &str, link: &str) -> Result<(), EmailError> {
        let Some(base_url) = &self.base_url else {
            tracing::info!(to, link, "mailer not configured, logging confirmation link");
            return Ok(());
        };

        let body = confirmation_body(link);
        let resp = self
            .http
            .post(format!("{}/email", base_url))
            .header("X-Server-Token", &self.token)
            .json(&OutboundEmail {
                from: &self.sender,
                to,
                subject: "Confirm your Chirper account",
                html_body: &body,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(EmailError::Api(text));
        }

        Ok(())
    }
}

fn confirmation_body(link: &str) -> String {
    format!(r#"To confirm your email, follow <a href="{link}">this link</a>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_body_embeds_link() {
        let body = confirmation_body("http://localhost:8888/auth/verify?hash=abc");
        assert!(body.contains(r#"href="http://localhost:8888/auth/verify?hash=abc""#));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_is_a_noop() {
        let client = EmailClient::new(None, String::new(), "admin@chirper.local".into());
        client
            .send_confirmation("user@example.com", "http://localhost/verify")
            .await
            .unwrap();
    }
}
