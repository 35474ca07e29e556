// libs/notification-cell/src/services/dispatcher.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{BookingSummary, Channel, DispatchReport, EmailMessage, NotificationError};
use crate::services::messages::BookingMessages;
use crate::services::notifier::Notifier;

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    admin_email: Option<String>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, admin_email: Option<String>, timeout: Duration) -> Self {
        Self {
            notifier,
            admin_email: admin_email.filter(|email| !email.trim().is_empty()),
            timeout,
        }
    }

    /// Sends the admin alert and the client confirmation concurrently.
    pub async fn dispatch_booking_created(&self, summary: &BookingSummary) -> DispatchReport {
        let client_message = BookingMessages::client_confirmation(summary);
        let admin_message = self.admin_email
            .as_deref()
            .map(|email| BookingMessages::admin_alert(summary, email));

        let admin = async {
            match admin_message {
                Some(message) => Some(self.send_bounded(message).await),
                None => None,
            }
        };
        let client = self.send_bounded(client_message);

        let (admin, client) = futures::join!(admin, client);
        let report = DispatchReport { admin, client };

        for (channel, error) in report.failures() {
            warn!(
                "Booking {} notification failed on {} channel: {}",
                summary.appointment_id, channel.as_str(), error
            );
        }
        if report.failures().is_empty() {
            info!("Booking {} notifications delivered", summary.appointment_id);
        }

        report
    }

    /// Fire-and-forget variant used on the booking path.
    pub fn spawn_booking_created(&self, summary: BookingSummary) -> tokio::task::JoinHandle<DispatchReport> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch_booking_created(&summary).await })
    }

    fn send_bounded(&self, message: EmailMessage) -> impl Future<Output = Result<(), NotificationError>> + '_ {
        let secs = self.timeout.as_secs();
        async move {
            tokio::time::timeout(self.timeout, self.notifier.send(message))
                .await
                .unwrap_or(Err(NotificationError::Timeout(secs)))
        }
    }
}
