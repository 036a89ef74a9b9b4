//! Observable scan-lifecycle events
//!
//! Events are explicit and typed; every log line names one of these.

use std::fmt;

use super::logger::Severity;

/// Observable events in keyspread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A merge scanner opened its per-bucket iterators
    ScanOpen,
    /// A merge scanner released all its iterators
    ScanClose,
    /// An underlying per-bucket iterator failed; the scan is being torn down
    IteratorFailure,
    /// A batch plan of per-bucket work units was produced
    PlanCreated,
}

impl Event {
    /// Returns the event name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ScanOpen => "SCAN_OPEN",
            Event::ScanClose => "SCAN_CLOSE",
            Event::IteratorFailure => "ITERATOR_FAILURE",
            Event::PlanCreated => "PLAN_CREATED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IteratorFailure => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
