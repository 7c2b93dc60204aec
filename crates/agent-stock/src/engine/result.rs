//! Step results and run outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// One titled block of output handed to a presentation sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub title: String,
    pub content: String,
}

impl StepResult {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Progress marker shown before a step starts, e.g. `Step 1: Price Data`
    pub fn progress(step: u8, name: &str, detail: &str) -> Self {
        Self::new(format!("Step {step}: {name}"), detail)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All five steps ran; the news step may still have reported an error
    Completed,
    /// The run stopped at step 1
    QuoteFailed(String),
    /// A model call failed
    Failed(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisState {
    #[default]
    Idle,
    Price,
    PriceAnalysis,
    News,
    DeepAnalysis,
    Recommendation,
    Error,
}

impl AnalysisState {
    /// Pipeline step number, if this state is a step
    pub fn step_number(&self) -> Option<u8> {
        match self {
            Self::Price => Some(1),
            Self::PriceAnalysis => Some(2),
            Self::News => Some(3),
            Self::DeepAnalysis => Some(4),
            Self::Recommendation => Some(5),
            Self::Idle | Self::Error => None,
        }
    }

    /// Title and detail of the progress marker for this step
    pub fn progress(&self) -> Option<StepResult> {
        let (name, detail) = match self {
            Self::Price => ("Price Data", "Fetching stock price..."),
            Self::PriceAnalysis => ("AI Analysis", "Analyzing price trends..."),
            Self::News => ("News", "Fetching recent stock news..."),
            Self::DeepAnalysis => ("Final AI Analysis", "Running deep analysis..."),
            Self::Recommendation => ("Trading Recommendation", "Generating actionable advice..."),
            Self::Idle | Self::Error => return None,
        };
        self.step_number()
            .map(|n| StepResult::progress(n, name, detail))
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Price => "price",
            Self::PriceAnalysis => "price-analysis",
            Self::News => "news",
            Self::DeepAnalysis => "deep-analysis",
            Self::Recommendation => "recommendation",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_titles() {
        let step = AnalysisState::Price.progress().unwrap();
        assert_eq!(step.title, "Step 1: Price Data");
        assert_eq!(step.content, "Fetching stock price...");

        let step = AnalysisState::Recommendation.progress().unwrap();
        assert_eq!(step.title, "Step 5: Trading Recommendation");

        assert!(AnalysisState::Idle.progress().is_none());
        assert!(AnalysisState::Error.progress().is_none());
    }

    #[test]
    fn test_step_numbers_are_sequential() {
        let steps = [
            AnalysisState::Price,
            AnalysisState::PriceAnalysis,
            AnalysisState::News,
            AnalysisState::DeepAnalysis,
            AnalysisState::Recommendation,
        ];
        let numbers: Vec<u8> = steps.iter().filter_map(AnalysisState::step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }
}
