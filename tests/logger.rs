use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsonl_logger::record::RESERVED_KEYS;
use jsonl_logger::{
    create_logger, Fields, Level, LogConfig, LogError, LogRecord, LogStream, LogTargetConfig,
    Logger, MemoryStream, SharedStream, TargetKind,
};
use serde_json::{json, Value};

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn stream_logger(level: Level) -> (Logger, Arc<MemoryStream>) {
    let stream = Arc::new(MemoryStream::new());
    let logger = create_logger(
        LogConfig::new().with_target(LogTargetConfig::stream(level, stream.clone())),
    );
    (logger, stream)
}

struct FailingStream;

impl LogStream for FailingStream {
    fn write(&self, _chunk: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn every_severity_packs_message_level_and_time() {
    let logger = Logger::default();
    for level in Level::ALL {
        let before = now();
        let record = logger.pack(level, "m");
        let after = now();
        assert_eq!(record.msg, "m");
        assert_eq!(record.level, level.code());
        assert!(before <= record.time && record.time <= after);
    }
}

#[test]
fn severity_methods_write_at_their_own_level() {
    let (logger, stream) = stream_logger(Level::Trace);
    logger.trace("t").unwrap();
    logger.debug("d").unwrap();
    logger.info("i").unwrap();
    logger.warn("w").unwrap();
    logger.error("e").unwrap();
    logger.fatal("f").unwrap();

    let levels: Vec<u8> = stream.records().iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![10, 20, 30, 40, 50, 60]);
}

#[test]
fn metadata_cannot_override_level_or_message() {
    let logger = create_logger(LogConfig::new().with_base(fields(json!({ "service": "auth" }))));
    let record = logger.pack(
        Level::Info,
        (json!({ "level": 99, "msg": "forged", "service": "billing" }), "real"),
    );
    assert_eq!(record.level, 30);
    assert_eq!(record.msg, "real");
    assert_eq!(record.fields, fields(json!({ "service": "billing" })));
    for key in RESERVED_KEYS {
        assert!(!record.fields.contains_key(key));
    }
}

#[test]
fn base_and_metadata_are_merged_into_the_line() {
    let (logger, stream) = stream_logger(Level::Info);
    let logger = logger.child(fields(json!({ "service": "auth" })));
    logger.info((json!({ "userId": 9 }), "login")).unwrap();

    let writes = stream.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].ends_with('\n'));
    let mut value: Value = serde_json::from_str(writes[0].trim_end()).unwrap();
    let time = value.as_object_mut().unwrap().remove("time").unwrap();
    assert!(time.is_i64());
    assert_eq!(value, json!({ "service": "auth", "userId": 9, "level": 30, "msg": "login" }));
}

#[test]
fn stream_target_filters_below_threshold() {
    let (logger, stream) = stream_logger(Level::Error);

    logger.warn("x").unwrap();
    assert!(stream.is_empty());

    logger.error("y").unwrap();
    let writes = stream.writes();
    assert_eq!(writes.len(), 1);
    let record = &stream.records()[0];
    assert_eq!(
        writes[0],
        format!("{{\"level\":50,\"msg\":\"y\",\"time\":{}}}\n", record.time)
    );
}

#[test]
fn warn_target_threshold_is_inclusive() {
    let (logger, stream) = stream_logger(Level::Warn);
    for level in Level::ALL {
        logger.log_at(level, level.as_str()).unwrap();
    }
    let msgs: Vec<String> = stream.records().into_iter().map(|r| r.msg).collect();
    assert_eq!(msgs, vec!["warn", "error", "fatal"]);
}

#[test]
fn log_accepts_hand_built_records() {
    let (logger, stream) = stream_logger(Level::Info);
    let mut record = LogRecord::new(Level::Info, "custom");
    record.level = 45;
    logger.log(&record).unwrap();
    record.level = 25;
    logger.log(&record).unwrap();
    assert_eq!(stream.len(), 1);
}

#[test]
fn children_accumulate_base_without_touching_parents() {
    let parent = create_logger(LogConfig::new().with_base(fields(json!({ "app": "api", "a": 0 }))));
    let first = parent.child(fields(json!({ "a": 1 })));
    let second = first.child(fields(json!({ "b": 2 })));

    assert_eq!(second.base(), &fields(json!({ "app": "api", "a": 1, "b": 2 })));
    assert_eq!(first.base(), &fields(json!({ "app": "api", "a": 1 })));
    assert_eq!(parent.base(), &fields(json!({ "app": "api", "a": 0 })));
}

#[test]
fn children_share_targets_with_their_parent() {
    let (parent, stream) = stream_logger(Level::Info);
    let child = parent.child(fields(json!({ "component": "db" })));
    parent.info("from parent").unwrap();
    child.info("from child").unwrap();

    let records = stream.records();
    assert_eq!(records.len(), 2);
    assert!(records[0].fields.is_empty());
    assert_eq!(records[1].fields.get("component"), Some(&json!("db")));
    assert_eq!(child.targets().len(), 1);
}

#[test]
fn targets_are_evaluated_in_order_and_independently() {
    let low = Arc::new(MemoryStream::new());
    let high = Arc::new(MemoryStream::new());
    let logger = create_logger(LogConfig::new().with_targets(vec![
        LogTargetConfig::stream(Level::Fatal, high.clone()),
        LogTargetConfig::stream(Level::Debug, low.clone()),
    ]));

    logger.info("only low").unwrap();
    logger.fatal("both").unwrap();

    assert_eq!(low.len(), 2);
    assert_eq!(high.len(), 1);
    assert_eq!(high.records()[0].msg, "both");
}

#[test]
fn write_failures_surface_after_all_targets_run() {
    let memory = Arc::new(MemoryStream::new());
    let failing: SharedStream = Arc::new(FailingStream);
    let logger = create_logger(LogConfig::new().with_targets(vec![
        LogTargetConfig::stream(Level::Info, failing),
        LogTargetConfig::stream(Level::Info, memory.clone()),
    ]));

    let err = logger.info("hello").unwrap_err();
    match err {
        LogError::Write(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(memory.len(), 1);

    // A filtered-out failing target is never called.
    assert!(logger.debug("quiet").is_ok());
}

#[test]
fn unknown_levels_and_types_never_write() {
    let stream = Arc::new(MemoryStream::new());
    let logger = create_logger(LogConfig::new().with_targets(vec![
        LogTargetConfig::stream(Level::Trace, stream.clone()).with_level_name("verbose"),
        LogTargetConfig {
            level: "trace".to_string(),
            kind: TargetKind::Other("syslog".to_string()),
        },
    ]));

    logger.fatal("dropped").unwrap();
    assert!(stream.is_empty());
}

#[test]
fn empty_target_list_is_silent() {
    let logger = create_logger(LogConfig::new().with_targets(Vec::new()));
    logger.fatal("nowhere").unwrap();
}

#[test]
fn default_logger_writes_to_console() {
    let logger = Logger::default();
    assert_eq!(logger.targets().len(), 1);
    assert!(matches!(logger.targets()[0].kind, TargetKind::Console));
    logger.debug("filtered out").unwrap();
    logger.info("printed on stdout").unwrap();
}

#[test]
fn provider_is_consulted_on_every_call() {
    let stream = Arc::new(MemoryStream::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let provider_stream = stream.clone();
    let provider_calls = calls.clone();
    let logger = create_logger(LogConfig::new().with_get_config(move || {
        // One more target each time the provider runs.
        let n = provider_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let target = LogTargetConfig::stream(Level::Info, provider_stream.clone());
        LogConfig::new()
            .with_base(fields(json!({ "generation": n })))
            .with_targets(vec![target; n])
    }));

    // pack -> generation 1, dispatch -> 2 targets.
    logger.info("first").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.records()[0].fields.get("generation"), Some(&json!(1)));

    // pack -> generation 3, dispatch -> 4 targets.
    stream.clear();
    logger.info("second").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(stream.len(), 4);
    assert_eq!(stream.records()[0].fields.get("generation"), Some(&json!(3)));
}

#[test]
fn children_keep_the_provider_but_merge_the_stored_base() {
    let stream = Arc::new(MemoryStream::new());
    let provider_stream = stream.clone();
    let parent = create_logger(
        LogConfig::new()
            .with_base(fields(json!({ "stored": true })))
            .with_get_config(move || {
                LogConfig::new()
                    .with_base(fields(json!({ "dynamic": true })))
                    .with_target(LogTargetConfig::stream(Level::Info, provider_stream.clone()))
            }),
    );

    let child = parent.child(fields(json!({ "child": 1 })));
    assert_eq!(child.base(), &fields(json!({ "stored": true, "child": 1 })));

    child.info("via provider").unwrap();
    let record = &stream.records()[0];
    assert_eq!(record.fields, fields(json!({ "dynamic": true })));
}

#[test]
fn provider_without_targets_falls_back_to_defaults() {
    let logger = create_logger(LogConfig::new().with_get_config(LogConfig::new));
    let record = logger.pack(Level::Warn, "defaults");
    assert!(record.fields.is_empty());
    logger.log(&record).unwrap();
}
