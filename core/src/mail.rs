//! Outbound mail dispatch.
//!
//! Handlers enqueue a [`MailMessage`] through a [`MailSender`] and return
//! immediately; a single background worker drains the bounded queue into a
//! [`MailDelivery`] provider. Delivery is at-most-once: a full queue or a
//! failed send drops the message with a warning, nothing is retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Delivery failure.
#[derive(Debug, Error)]
pub enum MailError {
    /// The message itself could not be built (bad address, empty body).
    #[error("Invalid mail message: {0}")]
    InvalidMessage(String),

    /// The transport rejected or failed the send.
    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// One outbound notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub content: String,
    /// Name of the mail template the body was built from.
    pub template: String,
}

/// Mail delivery provider.
///
/// Implementations: [`ConsoleMailer`] for development, [`SmtpMailer`] for
/// production.
#[async_trait]
pub trait MailDelivery: Send + Sync {
    /// Deliver one message.
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Logs messages instead of sending them. Development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailDelivery for ConsoleMailer {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            template = %message.template,
            "mail (console delivery)"
        );
        Ok(())
    }
}

/// SMTP delivery via lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: lettre::AsyncSmtpTransport<lettre::Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a relay transport with credentials.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Transport`] if the relay address is invalid.
    pub fn new(
        server: &str,
        port: u16,
        username: String,
        password: String,
    ) -> Result<Self, MailError> {
        use lettre::transport::smtp::authentication::Credentials;

        let transport = lettre::AsyncSmtpTransport::<lettre::Tokio1Executor>::relay(server)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailDelivery for SmtpMailer {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailError> {
        use lettre::AsyncTransport;
        use lettre::message::header::ContentType;

        let email = lettre::Message::builder()
            .from(
                message
                    .from
                    .parse()
                    .map_err(|e| MailError::InvalidMessage(format!("from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| MailError::InvalidMessage(format!("to address: {e}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.content.clone())
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Fire-and-forget handle to the mail queue.
#[derive(Debug, Clone)]
pub struct MailSender {
    tx: mpsc::Sender<MailMessage>,
}

impl MailSender {
    /// Enqueue a message without waiting for delivery.
    ///
    /// A full queue or a stopped worker drops the message; that is the
    /// accepted at-most-once behavior, not a failure the caller sees.
    pub fn send(&self, message: MailMessage) {
        if let Err(err) = self.tx.try_send(message) {
            warn!(error = %err, "mail notification dropped");
        }
    }
}

/// Create the bounded mail queue.
#[must_use]
pub fn mail_channel(capacity: usize) -> (MailSender, mpsc::Receiver<MailMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (MailSender { tx }, rx)
}

/// Spawn the single background worker that drains the queue.
pub fn spawn_mail_worker<D>(mut rx: mpsc::Receiver<MailMessage>, delivery: D) -> JoinHandle<()>
where
    D: MailDelivery + 'static,
{
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(err) = delivery.deliver(&message).await {
                warn!(to = %message.to, error = %err, "mail delivery failed");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct RecordingMailer {
        delivered: Arc<Mutex<Vec<MailMessage>>>,
    }

    #[async_trait]
    impl MailDelivery for RecordingMailer {
        async fn deliver(&self, message: &MailMessage) -> Result<(), MailError> {
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn message(subject: &str) -> MailMessage {
        MailMessage {
            to: "user@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            subject: subject.to_string(),
            content: "<strong>hello</strong>".to_string(),
            template: "basic.html".to_string(),
        }
    }

    #[tokio::test]
    async fn worker_delivers_enqueued_messages() {
        let (sender, rx) = mail_channel(8);
        let mailer = RecordingMailer::default();
        let delivered = Arc::clone(&mailer.delivered);
        let worker = spawn_mail_worker(rx, mailer);

        sender.send(message("one"));
        sender.send(message("two"));
        drop(sender);
        worker.await.unwrap();

        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].subject, "one");
    }

    #[tokio::test]
    async fn full_queue_drops_silently() {
        let (sender, rx) = mail_channel(1);

        // Nothing draining the queue: second send overflows and is dropped.
        sender.send(message("kept"));
        sender.send(message("dropped"));

        let mut rx = rx;
        assert_eq!(rx.recv().await.unwrap().subject, "kept");
        assert!(rx.try_recv().is_err());
    }
}
