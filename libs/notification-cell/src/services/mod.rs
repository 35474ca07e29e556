pub mod dispatcher;
pub mod messages;
pub mod notifier;

pub use dispatcher::NotificationDispatcher;
pub use messages::BookingMessages;
pub use notifier::{notifier_from_config, HttpEmailNotifier, LogNotifier, Notifier};
