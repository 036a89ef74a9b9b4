//! Observability subsystem for keyspread
//!
//! Structured JSON logging of scan-lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only: no side effects on scan execution
//! 2. No async or background threads
//! 3. Deterministic output (sorted fields, fixed key order)
//! 4. A logging failure never fails the operation being logged

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with no fields.
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::ScanOpen);
        log_event(Event::ScanClose);
    }

    #[test]
    fn test_log_event_with_fields_does_not_panic() {
        log_event_with_fields(Event::PlanCreated, &[("units", "8")]);
    }
}
