//! Self-test and mock sequence, for checking a sink without any provider

use super::result::StepResult;
use crate::interface::PresentationSink;
use std::time::Duration;
use tracing::info;

/// Emit a single confirmation step
pub fn run_self_test(sink: &mut dyn PresentationSink) {
    info!("Running self-test");
    sink.show_step(StepResult::new("Test", "✅ Pipeline and output working fine"));
}

/// Emit three canned steps with `delay` between them, inside a loading cycle
pub async fn run_mock_sequence(sink: &mut dyn PresentationSink, delay: Duration) {
    info!(?delay, "Running mock sequence");
    sink.set_loading(true);
    sink.clear();

    sink.show_step(StepResult::new("Mock 1", "Running a mock analysis..."));
    tokio::time::sleep(delay).await;
    sink.show_step(StepResult::new("Mock 2", "Simulating..."));
    tokio::time::sleep(delay).await;
    sink.show_step(StepResult::new("Mock ✅", "Complete!"));

    sink.set_loading(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{MemorySink, SinkEvent};
    use std::time::Instant;

    #[test]
    fn test_self_test() {
        let mut sink = MemorySink::new();
        run_self_test(&mut sink);
        assert_eq!(
            sink.events(),
            &[SinkEvent::Step(StepResult::new(
                "Test",
                "✅ Pipeline and output working fine"
            ))]
        );
    }

    #[tokio::test]
    async fn test_mock_sequence() {
        let mut sink = MemorySink::new();
        let started = Instant::now();
        run_mock_sequence(&mut sink, Duration::from_millis(20)).await;

        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(sink.titles(), vec!["Mock 1", "Mock 2", "Mock ✅"]);
        assert_eq!(sink.events().first(), Some(&SinkEvent::Loading(true)));
        assert_eq!(sink.events().last(), Some(&SinkEvent::Loading(false)));
    }
}
