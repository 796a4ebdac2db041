//! Webhook notification sink.

pub mod notifier;

pub use notifier::WebhookNotifier;
