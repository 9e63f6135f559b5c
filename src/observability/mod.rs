//! Observability for the catalog server
//!
//! - Structured JSON logs, one typed event per line
//! - Atomic process counters exposed over HTTP
//!
//! Observability is read-only: nothing here feeds back into request handling.
//!
//! ```ignore
//! use dudaflix::observability::{Event, Logger};
//!
//! Logger::info(Event::MovieCreated, &[("id", "4f1c...")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Logs a lifecycle event at INFO, or FATAL for fatal events.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event, fields);
}
