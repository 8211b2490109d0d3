//! Observability for dynaquery
//!
//! - Structured logging (JSON lines)
//! - Per-table counters
//! - Begin/complete scopes around multi-call operations
//!
//! Observability is read-only: nothing here changes query results.
//!
//! ```ignore
//! use dynaquery::observability::{Logger, Event, log_event_with_fields};
//!
//! Logger::info("QUERYSET_EXECUTE", &[("table", "items")]);
//! log_event_with_fields(Event::ModelRegistered, &[("table", "items")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
