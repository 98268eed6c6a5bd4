//! Delivery channels for formed notifications.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_entity::notification::Notification;

/// One delivery channel (email, push, real-time, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    async fn notify(&self, notification: &Notification) -> AppResult<()>;
}

/// Writes every notification to the log. Default channel for the server.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        info!(
            notification_id = %notification.id,
            kind = %notification.kind,
            recipient_id = %notification.recipient_id,
            title = %notification.title,
            "Notification delivered"
        );
        Ok(())
    }
}

/// Forwards notifications into an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        self.tx
            .send(notification.clone())
            .map_err(|_| AppError::internal("Notification receiver dropped"))
    }
}
