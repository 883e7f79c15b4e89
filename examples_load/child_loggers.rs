use std::sync::Arc;

use jsonl_logger::init::{init_tracing_with_config, LayerConfig};
use jsonl_logger::settings::LoggerSettings;
use jsonl_logger::{create_logger, Level, SharedStream, WriterStream};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let audit: SharedStream = Arc::new(WriterStream::new(std::io::stderr()));

    let settings = LoggerSettings::from_json_str(
        r#"{
            "base": { "service": "auth" },
            "targets": [
                { "type": "console", "level": "info" },
                { "type": "stream", "level": "error", "stream": "audit" }
            ]
        }"#,
    )?;
    let logger = create_logger(settings.into_config(|name| (name == "audit").then(|| audit.clone()))?);

    logger.info("service started")?;

    let request = logger.child(json!({ "requestId": 7 }).as_object().cloned().unwrap_or_default());
    let user = request.child(json!({ "userId": 9 }).as_object().cloned().unwrap_or_default());
    user.info((json!({ "method": "password" }), "login"))?;
    user.error((json!({ "reason": "invalid password" }), "authentication failed"))?;

    // Route `tracing` events through the same logger.
    init_tracing_with_config(
        logger.child(json!({ "source": "tracing" }).as_object().cloned().unwrap_or_default()),
        LayerConfig { min_level: Level::Warn, enable_stderr: false },
    )?;
    tracing::warn!(attempts = 3, "rate limit approaching");

    Ok(())
}
