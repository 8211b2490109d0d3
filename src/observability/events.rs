//! Observable events
//!
//! Every lifecycle point the crate logs is named here. Events are explicit
//! and typed; their string form is the `event` key of the log line.

use std::fmt;

use super::logger::Severity;

/// Observable events in dynaquery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// Concrete model registered
    ModelRegistered,

    // QuerySet execution
    /// Range query sent to the store
    QuerysetExecute,
    /// Range query returned a page
    QuerysetExecuted,
    /// Native count sent to the store
    QuerysetCount,
    /// Execution short-circuited to the empty result
    QuerysetEmpty,
    /// Store call failed
    QuerysetStoreFailure,

    // Delete
    /// Batch delete begins (scope name)
    QuerysetDelete,
    /// A delete batch left items unprocessed
    QuerysetDeleteUnprocessed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ModelRegistered => "MODEL_REGISTERED",
            Event::QuerysetExecute => "QUERYSET_EXECUTE",
            Event::QuerysetExecuted => "QUERYSET_EXECUTED",
            Event::QuerysetCount => "QUERYSET_COUNT",
            Event::QuerysetEmpty => "QUERYSET_EMPTY",
            Event::QuerysetStoreFailure => "QUERYSET_STORE_FAILURE",
            Event::QuerysetDelete => "QUERYSET_DELETE",
            Event::QuerysetDeleteUnprocessed => "QUERYSET_DELETE_UNPROCESSED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::ModelRegistered | Event::QuerysetDelete => Severity::Info,
            Event::QuerysetExecute
            | Event::QuerysetExecuted
            | Event::QuerysetCount
            | Event::QuerysetEmpty => Severity::Trace,
            Event::QuerysetDeleteUnprocessed => Severity::Warn,
            Event::QuerysetStoreFailure => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::ModelRegistered,
            Event::QuerysetExecute,
            Event::QuerysetExecuted,
            Event::QuerysetCount,
            Event::QuerysetEmpty,
            Event::QuerysetStoreFailure,
            Event::QuerysetDelete,
            Event::QuerysetDeleteUnprocessed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_per_query_events_are_trace() {
        assert_eq!(Event::QuerysetExecute.severity(), Severity::Trace);
        assert_eq!(Event::QuerysetStoreFailure.severity(), Severity::Error);
    }
}
