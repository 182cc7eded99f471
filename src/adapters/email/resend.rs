use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    application::email_templates,
    use_cases::auth::Notifier,
};

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Sends the account e-mails through Resend.
#[derive(Clone)]
pub struct ResendNotifier {
    client: Client,
    api_key: SecretString,
    from: String,
    frontend_url: String,
    code_ttl_minutes: i64,
    reset_ttl_minutes: i64,
}

impl ResendNotifier {
    pub fn new(
        client: Client,
        api_key: SecretString,
        from: String,
        frontend_url: String,
        code_ttl_minutes: i64,
        reset_ttl_minutes: i64,
    ) -> Self {
        Self {
            client,
            api_key,
            from,
            frontend_url,
            code_ttl_minutes,
            reset_ttl_minutes,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let body = ResendReq {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        self.client
            .post(RESEND_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("Email API error: {e}")))?;

        tracing::debug!(subject, "Email sent");
        Ok(())
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send_verification_code(&self, email: &str, name: &str, code: &str) -> AppResult<()> {
        let (subject, html) = email_templates::verification_code_email(
            &self.frontend_url,
            name,
            code,
            self.code_ttl_minutes,
        );
        self.send(email, &subject, &html).await
    }

    async fn send_welcome_email(&self, email: &str, name: &str) -> AppResult<()> {
        let (subject, html) = email_templates::welcome_email(&self.frontend_url, name);
        self.send(email, &subject, &html).await
    }

    async fn send_reset_link(&self, email: &str, link: &str) -> AppResult<()> {
        let (subject, html) =
            email_templates::reset_password_email(&self.frontend_url, link, self.reset_ttl_minutes);
        self.send(email, &subject, &html).await
    }
}
