//! Stock Analysis Engine
//!
//! Step orchestration and the per-run conversation state

pub mod analysis_engine;
pub mod context;
pub mod diagnostics;
pub mod result;

pub use analysis_engine::StockAnalysisEngine;
pub use context::{AnalysisSession, ConversationState, StateTransition};
pub use diagnostics::{run_mock_sequence, run_self_test};
pub use result::{AnalysisState, RunOutcome, StepResult};
