//! Contact-form mail delivery.
//!
//! The HTTP layer hands a [`ContactForm`] to a [`Mailer`]; delivery itself
//! is an external concern. The shipped [`LogMailer`] records the request
//! through `tracing` so operators see contact traffic without an SMTP
//! relay configured.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Payload of `POST /send-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    DeliveryFailed(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact(&self, form: ContactForm) -> Result<(), MailError>;
}

/// Logs contact requests instead of relaying them.
pub struct LogMailer {
    contact_address: String,
}

impl LogMailer {
    /// `contact_address` is the inbox the form would be relayed to, kept
    /// in the log line so the trail matches a real relay's.
    pub fn new(contact_address: String) -> Self {
        Self { contact_address }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_contact(&self, form: ContactForm) -> Result<(), MailError> {
        tracing::info!(
            to = %self.contact_address,
            from = %form.email,
            name = %form.name,
            subject = %format!("Contact Form: {}", form.subject),
            message = %form.message,
            "contact form received"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_any_form() {
        let mailer = LogMailer::new("owner@example.com".to_string());
        let form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Nice server.".to_string(),
        };

        assert!(mailer.send_contact(form).await.is_ok());
    }

    #[test]
    fn form_deserializes_from_the_wire_shape() {
        let form: ContactForm = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Hello"}"#,
        )
        .unwrap();

        assert_eq!(form.subject, "Hi");
    }
}
