//! Customer notifications
//!
//! Delivery is always best-effort: callers log failures and carry on.

pub mod ses;

use async_trait::async_trait;
use std::sync::Arc;

pub use ses::SesNotifier;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outbound message channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError>;
}

/// Development notifier that only writes the message to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError> {
        tracing::info!(to = to, subject = subject, body = body, "Notification (log only)");
        Ok(())
    }
}

/// Messages sent at order and payment milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    OrderCreated { order_id: i64 },
    PaymentSucceeded { order_id: i64 },
    PaymentFailed { order_id: i64 },
}

impl Notification {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "Order created",
            Self::PaymentSucceeded { .. } => "Payment received",
            Self::PaymentFailed { .. } => "Payment failed",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::OrderCreated { order_id } => {
                format!("Your order #{order_id} has been created and is pending.")
            }
            Self::PaymentSucceeded { order_id } => format!(
                "Payment for order #{order_id} was successful. Your order is now in production."
            ),
            Self::PaymentFailed { order_id } => format!(
                "Payment for order #{order_id} did not go through. You can retry from your order page."
            ),
        }
    }
}

/// Send and wait, logging any failure instead of returning it
pub async fn deliver(notifier: &dyn Notifier, to: &str, notification: Notification) {
    if let Err(e) = notifier
        .send(to, notification.subject(), &notification.body())
        .await
    {
        tracing::warn!(to = to, error = %e, ?notification, "Notification delivery failed");
    }
}

/// Fire-and-forget delivery on a spawned task
pub fn deliver_detached(notifier: Arc<dyn Notifier>, to: String, notification: Notification) {
    tokio::spawn(async move {
        deliver(notifier.as_ref(), &to, notification).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_message() {
        let n = Notification::OrderCreated { order_id: 42 };
        assert_eq!(n.subject(), "Order created");
        assert_eq!(n.body(), "Your order #42 has been created and is pending.");
    }

    #[test]
    fn test_payment_messages_name_order() {
        assert!(
            Notification::PaymentSucceeded { order_id: 7 }
                .body()
                .contains("#7")
        );
        assert!(Notification::PaymentFailed { order_id: 7 }.body().contains("#7"));
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), BoxError> {
            Err("smtp down".into())
        }
    }

    #[tokio::test]
    async fn test_deliver_swallows_errors() {
        deliver(&Failing, "a@b.c", Notification::OrderCreated { order_id: 1 }).await;
        deliver(&LogNotifier, "a@b.c", Notification::OrderCreated { order_id: 1 }).await;
    }
}
