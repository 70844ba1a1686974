use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::config::SmtpConfig;

/// Outbound mail transport. Swapped for a capturing fake in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("smtp transport")?
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        let from = config.from.parse().context("parse SMTP_FROM")?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("parse recipient")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build message")?;
        self.transport.send(message).await.context("smtp send")?;
        debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

/// Subject and plain-text body of the password-reset message.
pub fn reset_code_message(first_name: &str, code: &str) -> (String, String) {
    let subject = "Your password reset code".to_string();
    let body = format!(
        "Hello {first_name},\n\n\
         Your verification code for resetting your password is: {code}\n\n\
         The code is valid for 15 minutes.\n\n\
         If you did not request this, you can ignore this email.\n"
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_message_contains_name_and_code() {
        let (subject, body) = reset_code_message("Ada", "123456");
        assert!(subject.contains("reset"));
        assert!(body.contains("Ada"));
        assert!(body.contains("123456"));
        assert!(body.contains("15 minutes"));
    }
}
