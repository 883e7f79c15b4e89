use std::sync::Arc;
use std::time::Instant;

use jsonl_logger::channel::ChannelStream;
use jsonl_logger::{create_logger, Level, LogConfig, LogTargetConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (stream, mut rx) = ChannelStream::new();
    let logger = create_logger(
        LogConfig::new().with_target(LogTargetConfig::stream(Level::Trace, Arc::new(stream))),
    );

    // Drain lines on a separate task while the logger writes synchronously.
    let consumer = tokio::spawn(async move {
        let mut bytes = 0usize;
        let mut lines = 0u64;
        while let Some(line) = rx.recv().await {
            bytes += line.len();
            lines += 1;
        }
        (lines, bytes)
    });

    let n: u64 = 100_000;
    let start = Instant::now();
    let worker = logger.child(serde_json::Map::from_iter([("worker".to_string(), 1.into())]));
    for i in 0..n {
        worker.info(format!("channel load test {i}"))?;
    }
    let elapsed = start.elapsed();

    // Dropping every logger closes the channel and ends the consumer.
    drop(worker);
    drop(logger);
    let (lines, bytes) = consumer.await?;

    println!("channel: sent {} lines ({} bytes) in {:?} (~{:.0} lines/s)",
        lines,
        bytes,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
