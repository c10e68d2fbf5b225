use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use spdlog::{info, warn};

use crate::config::Mail;
use crate::error::{BlogError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// SMTP mailer. Without a transport it only logs what would have been sent.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: Option<&Mail>) -> Result<Self> {
        let Some(config) = config else {
            warn!("Mail is not configured; shared posts will only be logged");
            return Ok(Self::log_only());
        };

        let from = config.from
            .parse::<Mailbox>()
            .map_err(|e| BlogError::Mail(format!("Invalid sender address {}: {}", config.from, e)))?;

        if config.smtp_host.trim().is_empty() {
            warn!("SMTP host is empty; shared posts will only be logged");
            return Ok(SmtpMailer { transport: None, from: Some(from) });
        }

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
            .map_err(|e| BlogError::Mail(format!("Failed to configure SMTP transport: {}", e)))?
            .port(config.smtp_port);

        let builder = if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder.credentials(Credentials::new(username.to_string(), password.to_string()))
        } else {
            builder
        };

        Ok(SmtpMailer {
            transport: Some(builder.build()),
            from: Some(from),
        })
    }

    pub fn log_only() -> Self {
        SmtpMailer { transport: None, from: None }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            info!("Mail not sent (log-only mode). to={} subject={}", mail.to, mail.subject);
            return Ok(());
        };

        let to = mail.to
            .parse::<Mailbox>()
            .map_err(|e| BlogError::Mail(format!("Invalid recipient address {}: {}", mail.to, e)))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| BlogError::Mail(format!("Failed to build message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| BlogError::Mail(format!("Failed to send mail: {}", e)))?;
        info!("Mail sent to {}: {}", mail.to, mail.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(host: &str, from: &str) -> Mail {
        Mail {
            smtp_host: host.to_string(),
            smtp_port: 2525,
            username: None,
            password: None,
            from: from.to_string(),
            starttls: false,
        }
    }

    #[ntex::test]
    async fn test_log_only_send() {
        let mailer = SmtpMailer::new(None).unwrap();
        let res = mailer.send(OutgoingMail {
            to: "bob@example.com".to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        }).await;
        assert!(res.is_ok());
    }

    #[test]
    fn test_invalid_sender() {
        assert!(SmtpMailer::new(Some(&mail_config("", "not an address"))).is_err());
    }

    #[test]
    fn test_empty_host_is_log_only() {
        let mailer = SmtpMailer::new(Some(&mail_config(" ", "blog@example.com"))).unwrap();
        assert!(mailer.transport.is_none());
    }
}
