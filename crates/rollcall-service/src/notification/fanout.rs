//! Fire-and-forget delivery to every configured channel.

use std::sync::Arc;

use tracing::{debug, warn};

use rollcall_entity::notification::Notification;

use super::notifier::Notifier;

/// Hands notifications to every registered [`Notifier`] on a background task.
///
/// Delivery failures are logged and dropped; they never reach the caller.
#[derive(Clone, Default)]
pub struct NotificationFanOut {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl std::fmt::Debug for NotificationFanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.notifiers.iter().map(|n| n.name()).collect();
        f.debug_struct("NotificationFanOut")
            .field("notifiers", &names)
            .finish()
    }
}

impl NotificationFanOut {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Queue `notifications` for delivery and return immediately.
    pub fn dispatch(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() || self.notifiers.is_empty() {
            return;
        }

        let notifiers = self.notifiers.clone();
        tokio::spawn(async move {
            for notification in &notifications {
                for notifier in &notifiers {
                    if let Err(e) = notifier.notify(notification).await {
                        warn!(
                            channel = notifier.name(),
                            kind = %notification.kind,
                            recipient_id = %notification.recipient_id,
                            error = %e,
                            "Notification delivery failed"
                        );
                    }
                }
            }
            debug!(count = notifications.len(), "Notifications dispatched");
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use rollcall_core::error::AppError;
    use rollcall_core::result::AppResult;
    use rollcall_entity::notification::NotificationKind;
    use uuid::Uuid;

    use super::*;
    use crate::notification::notifier::ChannelNotifier;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn notify(&self, _: &Notification) -> AppResult<()> {
            Err(AppError::internal("smtp down"))
        }
    }

    fn sample(kind: NotificationKind) -> Notification {
        Notification::new(kind, Uuid::new_v4(), "t", "m", serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let (channel, mut rx) = ChannelNotifier::new();
        let fanout = NotificationFanOut::default()
            .with(Arc::new(FailingNotifier))
            .with(Arc::new(channel));

        fanout.dispatch(vec![
            sample(NotificationKind::CheckInConfirmed),
            sample(NotificationKind::AnomalyDetected),
        ]);

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.kind, NotificationKind::CheckInConfirmed);
        assert_eq!(second.kind, NotificationKind::AnomalyDetected);
    }

    #[tokio::test]
    async fn test_empty_fanout_is_noop() {
        let fanout = NotificationFanOut::default();
        assert!(fanout.is_empty());
        fanout.dispatch(vec![sample(NotificationKind::SessionStarted)]);
    }
}
