use std::sync::Arc;
use std::time::Instant;

use jsonl_logger::{create_logger, Level, LogConfig, LogTargetConfig, MemoryStream};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stream = Arc::new(MemoryStream::new());
    let logger = create_logger(
        LogConfig::new()
            .with_base(json!({ "service": "load" }).as_object().cloned().unwrap_or_default())
            .with_target(LogTargetConfig::stream(Level::Info, stream.clone())),
    );

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.error((json!({ "iteration": i }), "default load test error"))?;
        // Filtered out by the target threshold.
        logger.debug("default load test debug")?;
    }

    let elapsed = start.elapsed();
    println!("default config: wrote {} of {} records in {:?} (~{:.0} rec/s)",
        stream.len(),
        n * 2,
        elapsed,
        (n * 2) as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
