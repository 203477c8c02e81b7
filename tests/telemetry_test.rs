//! Integration tests for telemetry initialization and span helpers.

use keys_exist::telemetry::{TelemetryConfig, batch, init_telemetry};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process, so this may
    // return Err if another test got there first; that is acceptable.
    let guard = init_telemetry(TelemetryConfig {
        endpoint: None,
        service_name: "keys-exist-test".to_string(),
        log_level: "debug".to_string(),
    });
    if let Ok(guard) = guard {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn batch_span_creates_and_records_transitions() {
    let span = batch::start_batch_span(7, 3);
    batch::record_state_transition(&span, "created", "dispatching");
    batch::record_state_transition(&span, "dispatching", "collecting");
    batch::record_state_transition(&span, "collecting", "succeeded");
}
