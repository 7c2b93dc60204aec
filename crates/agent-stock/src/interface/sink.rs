//! Presentation sink: where step results end up
//!
//! The engine only talks to `PresentationSink`. A sink decides how results
//! are shown; it never influences the run.

use crate::engine::StepResult;
use std::io::Write;
use tracing::warn;

/// Receiver of ordered step results and the loading toggle
pub trait PresentationSink: Send {
    /// A run started (`true`) or finished (`false`)
    fn set_loading(&mut self, loading: bool);

    /// Drop whatever the previous run displayed
    fn clear(&mut self);

    fn show_step(&mut self, step: StepResult);
}

/// Everything a sink was told, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Loading(bool),
    Clear,
    Step(StepResult),
}

/// Sink that records events in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Vec<SinkEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Steps currently displayed, i.e. those emitted since the last clear
    pub fn steps(&self) -> Vec<&StepResult> {
        let start = self
            .events
            .iter()
            .rposition(|e| matches!(e, SinkEvent::Clear))
            .map_or(0, |i| i + 1);
        self.events[start..]
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Step(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.steps().into_iter().map(|s| s.title.as_str()).collect()
    }

    /// Number of `set_loading(value)` calls seen
    pub fn loading_toggles(&self, value: bool) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SinkEvent::Loading(value))
            .count()
    }
}

impl PresentationSink for MemorySink {
    fn set_loading(&mut self, loading: bool) {
        self.events.push(SinkEvent::Loading(loading));
    }

    fn clear(&mut self) {
        self.events.push(SinkEvent::Clear);
    }

    fn show_step(&mut self, step: StepResult) {
        self.events.push(SinkEvent::Step(step));
    }
}

/// Sink that prints each step to a writer, usually stdout
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!(error = %e, "Failed to write step output");
        }
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.write("⏳ Working...\n\n");
        }
    }

    fn clear(&mut self) {}

    fn show_step(&mut self, step: StepResult) {
        self.write(&format!("── {} ──\n{}\n\n", step.title, step.content));
    }
}
