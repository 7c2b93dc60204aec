//! Presentation of step results
//!
//! Platform-agnostic sinks plus the formatters that render quotes and news

pub mod formatter;
pub mod sink;

pub use formatter::{Formatter, FormatterFactory, HtmlFormatter, OutputFormat, TextFormatter};
pub use sink::{ConsoleSink, MemorySink, PresentationSink, SinkEvent};
