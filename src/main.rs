use std::error::Error;

use floodjoin::demo::{demo_burst, MemorySink};
use floodjoin::{FloodjoinConfig, Pipeline};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut pipeline = Pipeline::new(&FloodjoinConfig::default())?;
    let sink = MemorySink::new();

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async {
        for raw in demo_burst() {
            let outcome = pipeline.process(raw, &sink).await?;
            println!("outcome: {outcome:?}");
        }
        Ok::<(), Box<dyn Error>>(())
    })?;

    for call in sink.calls() {
        println!("sink: {call:?}");
    }

    Ok(())
}
