//! End-to-end tests through the process-wide logger.
//!
//! A logger with an in-memory console is installed globally, then records
//! are emitted through contexts that never had a logger bound explicitly.

use scopelog_core::{
    context, Context, Environment, Logger, LoggerConfig, MemorySink, Route,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_all(console: &MemorySink) -> Vec<Value> {
    console
        .lines()
        .iter()
        .map(|line| serde_json::from_str(line).expect("record is not valid JSON"))
        .collect()
}

#[test]
fn test_local_scenario_writes_console_only() {
    let console = MemorySink::new();
    let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Local);
    let logger = Logger::builder(config)
        .console(console.clone())
        .build()
        .expect("Failed to build logger");
    assert_eq!(logger.destination().route(), Route::Console);
    assert!(scopelog_core::install(logger));

    let ctx = context::with_trace_id(&Context::background(), "T1");
    let ctx = context::with_function_name(&ctx, "F1");
    scopelog_core::info!(&ctx, "hello");

    let records = parse_all(&console);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["service_name"], "svc");
    assert_eq!(record["service_version"], "1.0.0");
    assert_eq!(record["trace_id"], "T1");
    assert_eq!(record["function"], "F1");
    assert_eq!(record["message"], "hello");
    assert_eq!(record["level"], "info");
    assert!(record["time"].is_string());

    // custom payload through the same context
    let payload: HashMap<String, Value> =
        HashMap::from([("test".to_string(), Value::from("hello"))]);
    scopelog_core::with_custom_payload(&ctx, "test message", payload);

    let records = parse_all(&console);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["level"], "info");
    assert_eq!(records[1]["message"], "test message");
    assert_eq!(records[1]["test"], "hello");

    // a later initialization is ignored and reported as such
    let again = LoggerConfig::new("other", "9.9.9").with_environment(Environment::Local);
    assert!(!scopelog_core::init(again).unwrap());
    assert_eq!(
        scopelog_core::global().unwrap().config().service_name,
        "svc"
    );
}
