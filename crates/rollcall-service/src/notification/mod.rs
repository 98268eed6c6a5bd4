//! Notification fan-out: message builders and delivery channels.

pub mod fanout;
pub mod message;
pub mod notifier;

pub use fanout::NotificationFanOut;
pub use notifier::{ChannelNotifier, Notifier, TracingNotifier};
