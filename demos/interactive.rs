//! Interactive pipeline reading integers from stdin
//!
//! Pipeline:
//! 1. Source: one integer per line, `exit` (any case) or EOF to quit
//! 2. Filter: keep positive numbers
//! 3. Filter: keep non-zero multiples of three
//! 4. Buffer: hold up to 10 values, flush every 5 seconds
//!
//! Usage: RUST_LOG=info cargo run --example interactive

use int_pipeline::{sink, source, BufferConfig, CancellationToken, Pipeline};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cancel = CancellationToken::new();
    let pipeline = Pipeline::standard(cancel.clone(), BufferConfig::default())?;

    let input = source::from_lines(pipeline.context(), io::BufReader::new(io::stdin()));
    let output = pipeline.run(input);

    let processed = sink::consume(&cancel, &output, |value| {
        tracing::info!(value, "processed");
    });

    pipeline.join(Duration::from_secs(1))?;
    tracing::info!(processed, "pipeline finished");
    Ok(())
}
