use floodjoin::demo::{demo_burst, demo_event, MemorySink};
use floodjoin::{FloodjoinConfig, Outcome, Pipeline, PipelineError};

/// The core takes time exclusively from event timestamps, so replaying the
/// same sequence through a fresh pipeline must reproduce every decision and
/// every sink call.
#[tokio::test]
async fn replaying_a_stream_reproduces_all_decisions() -> Result<(), PipelineError> {
    let mut stream = demo_burst();
    // Interleave a second chatty sender and some one-off noise.
    for i in 0..5i64 {
        stream.push(demo_event(7, "Echo", "me too", 20 + i, 400 + i));
    }
    stream.push(demo_event(8, "Calm", "unrelated", 26, 500));

    let mut runs: Vec<(Vec<Outcome>, Vec<_>)> = Vec::new();
    for _ in 0..2 {
        let mut pipeline = Pipeline::new(&FloodjoinConfig::default()).expect("default config");
        let sink = MemorySink::new();
        let mut outcomes = Vec::new();
        for raw in stream.clone() {
            outcomes.push(pipeline.process(raw, &sink).await?);
        }
        runs.push((outcomes, sink.calls()));
    }

    let (first_outcomes, first_calls) = &runs[0];
    let (second_outcomes, second_calls) = &runs[1];
    assert_eq!(first_outcomes, second_outcomes);
    assert_eq!(first_calls, second_calls);
    assert!(
        first_outcomes
            .iter()
            .any(|o| matches!(o, Outcome::Suppressed { .. })),
        "the canned stream must actually exercise suppression"
    );

    Ok(())
}
