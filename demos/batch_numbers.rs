//! Feeds a fixed sequence through the standard pipeline and prints each
//! batch as it leaves the buffer stage
//!
//! Usage: cargo run --example batch_numbers --release

use int_pipeline::{sink, source, BufferConfig, CancellationToken, Pipeline};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Batching Pipeline");
    println!("=================");
    println!("Keeping positive multiples of three from -30..=30, flushed every 100ms");
    println!();

    let start = Instant::now();
    let cancel = CancellationToken::new();
    let config = BufferConfig::new()
        .with_capacity(4)
        .with_flush_interval(Duration::from_millis(100));
    let pipeline = Pipeline::standard(cancel.clone(), config)?;

    let input = source::from_iter(pipeline.context(), -30..=30);
    let output = pipeline.run(input);

    let mut last_batch = Instant::now();
    let count = sink::consume(&cancel, &output, |value| {
        if last_batch.elapsed() > Duration::from_millis(50) {
            println!("--- batch at {:.3}s", start.elapsed().as_secs_f64());
        }
        last_batch = Instant::now();
        println!("{value}");
    });

    pipeline.join(Duration::from_secs(1))?;

    println!("\n=== Final Results ===");
    println!("Values emitted: {count}");
    println!("Execution time: {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
