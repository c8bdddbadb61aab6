//! Outbound email: the `EmailSender` capability and its SMTP implementation,
//! plus the fire-and-forget dispatcher the auth flows hand messages to.
//!
//! Delivery is best-effort by contract: a flow that queues an email has
//! already committed its account mutation, and a failed send is logged, never
//! propagated back to the caller.

use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A message handed to the dispatch queue.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Capability interface the core consumes; the transport behind it is an
/// external concern.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()>;
}

pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Creates the SMTP transport from configuration.
    pub fn new(config: &EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::configuration(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let from = Mailbox::from_str(&format!("{} <{}>", config.from_name, config.from_email))
            .map_err(|e| ServiceError::configuration(format!("Invalid from email: {e}")))?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()> {
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| ServiceError::delivery(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| ServiceError::delivery(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::delivery(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Queue depth for outbound mail; messages past this are dropped and logged.
const DISPATCH_QUEUE_DEPTH: usize = 64;

/// Bounded work queue in front of an `EmailSender`.
#[derive(Clone)]
pub struct EmailDispatcher {
    tx: mpsc::Sender<OutboundEmail>,
}

impl EmailDispatcher {
    /// Spawns the worker task that drains the queue.
    pub fn spawn(sender: Arc<dyn EmailSender>) -> Self {
        let (tx, mut rx) = mpsc::channel::<OutboundEmail>(DISPATCH_QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                if let Err(e) = sender.send(&mail.to, &mail.subject, &mail.body).await {
                    tracing::warn!(to = %mail.to, subject = %mail.subject, "email delivery failed: {e}");
                }
            }
        });

        Self { tx }
    }

    /// Queues a message without waiting for delivery.
    pub fn dispatch(
        &self,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) {
        let mail = OutboundEmail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        };

        if let Err(e) = self.tx.try_send(mail) {
            tracing::warn!("email dispatch queue rejected message: {e}");
        }
    }
}
