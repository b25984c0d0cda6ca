//! Delivery channels that only log.

use async_trait::async_trait;
use tracing::info;

use storyhub_core::result::AppResult;
use storyhub_core::traits::{EmailMessage, EmailSender, PushMessage, PushSender};

/// Email channel that records each message in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        info!(
            to = %message.to,
            from = %message.from,
            template = %message.template,
            subject = %message.subject,
            "Email delivered"
        );
        Ok(())
    }
}

/// Push channel that records each message in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPushSender;

#[async_trait]
impl PushSender for LoggingPushSender {
    async fn send(&self, message: PushMessage) -> AppResult<()> {
        info!(
            recipient = %message.recipient,
            template = %message.template,
            title = %message.title,
            "Push delivered"
        );
        Ok(())
    }
}
