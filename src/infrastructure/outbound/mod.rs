//! Outbound dispatcher adapters

mod logging_dispatcher;

pub use logging_dispatcher::LoggingDispatcher;
