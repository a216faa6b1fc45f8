//! Email service for account verification and password reset mails

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// Subject and plain-text body of an outgoing mail
#[derive(Debug, Clone, PartialEq)]
pub struct MailContent {
    pub subject: String,
    pub body: String,
}

pub fn verification_mail(name: &str, code: &str, valid_hours: i64) -> MailContent {
    MailContent {
        subject: "Verify your Fon Library account".to_string(),
        body: format!(
            r#"
Hello {name},

Your verification code is: {code}

The code expires in {valid_hours} hours.
"#
        ),
    }
}

pub fn welcome_mail(name: &str) -> MailContent {
    MailContent {
        subject: "Welcome to Fon Library".to_string(),
        body: format!(
            r#"
Hello {name},

Your email address is verified. You can now sign in and borrow books.
"#
        ),
    }
}

/// Reset page link; token and email are percent-encoded as path segments
pub fn reset_link(client_url: &str, token: &str, email: &str) -> String {
    match reqwest::Url::parse(client_url) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(["reset-password", token, email]);
            }
            url.to_string()
        }
        _ => format!(
            "{}/reset-password/{}/{}",
            client_url.trim_end_matches('/'),
            token,
            email
        ),
    }
}

pub fn password_reset_mail(link: &str) -> MailContent {
    MailContent {
        subject: "Reset your Fon Library password".to_string(),
        body: format!(
            r#"
A password reset was requested for your account.

Follow this link to choose a new password: {link}

If you didn't request a reset, you can ignore this email.
"#
        ),
    }
}

pub fn reset_success_mail() -> MailContent {
    MailContent {
        subject: "Your Fon Library password was changed".to_string(),
        body: r#"
Your password has been reset successfully.

If you didn't do this, please contact the library immediately.
"#
        .to_string(),
    }
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a mail, or only log it when delivery is disabled
    pub async fn send(&self, to: &str, content: &MailContent) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!(to = %to, subject = %content.subject, "Email delivery disabled, not sending");
            tracing::debug!("{}", content.body);
            return Ok(());
        }

        self.send_email(to, &content.subject, &content.body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Fon Library");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><p>{}</p></body></html>"#,
                                body.trim().replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
