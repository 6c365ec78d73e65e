//! Webhook event sink adapters

mod logging_sink;

pub use logging_sink::LoggingEventSink;
