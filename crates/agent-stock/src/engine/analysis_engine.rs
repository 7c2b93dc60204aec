//! Stock Analysis Engine - sequences quote, model and news calls into one run

use crate::api::{ExaClient, NewsSource, QuoteSource, YahooFinanceClient};
use crate::config::StockConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::interface::{Formatter, FormatterFactory, OutputFormat, PresentationSink};
use crate::prompts::{PromptLibrary, system_message, with_system_instruction};
use agent_llm::providers::GeminiProvider;
use agent_llm::{LLMProvider, Message};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::context::AnalysisSession;
use super::result::{AnalysisState, RunOutcome, StepResult};

/// Five-step analysis: Quote, Model, News, Model, Model
///
/// The engine holds only shared, read-only collaborators. Everything a run
/// mutates lives in the `AnalysisSession` passed to [`run`](Self::run).
pub struct StockAnalysisEngine {
    quotes: Arc<dyn QuoteSource>,
    news: Arc<dyn NewsSource>,
    llm: Arc<dyn LLMProvider>,
    formatter: Box<dyn Formatter>,
    prompts: PromptLibrary,
}

impl StockAnalysisEngine {
    /// Build an engine around the given sources, rendering plain text
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        news: Arc<dyn NewsSource>,
        llm: Arc<dyn LLMProvider>,
    ) -> Result<Self> {
        Ok(Self {
            quotes,
            news,
            llm,
            formatter: FormatterFactory::create(OutputFormat::Text)?,
            prompts: PromptLibrary::new()?,
        })
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Wire up the HTTP clients described by `config`
    ///
    /// The model and quote keys are bound here; the news key is read from
    /// each session.
    pub fn from_config(
        config: &StockConfig,
        credentials: &Credentials,
        format: OutputFormat,
    ) -> Result<Self> {
        let quotes = YahooFinanceClient::new(config, credentials.quote_key.clone())?;
        let news = ExaClient::new(config)?;
        let llm = GeminiProvider::with_config(config.gemini_config(credentials.model_key.clone()))?;

        Ok(
            Self::new(Arc::new(quotes), Arc::new(news), Arc::new(llm))?
                .with_formatter(FormatterFactory::create(format)?),
        )
    }

    /// Run the whole pipeline for `session.symbol`
    ///
    /// Never fails: every problem is reported to `sink` as exactly one step
    /// and reflected in the outcome. `sink.set_loading(false)` is called
    /// exactly once, and the session ends in `Idle`.
    #[instrument(skip_all, fields(run_id = %session.run_id, symbol = %session.symbol))]
    pub async fn run(
        &self,
        session: &mut AnalysisSession,
        sink: &mut dyn PresentationSink,
    ) -> RunOutcome {
        info!("=== ANALYSIS START ===");
        session.reset();
        sink.set_loading(true);
        sink.clear();

        let outcome = match self.run_steps(session, sink).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, state = %session.state(), "Analysis failed");
                session.transition(AnalysisState::Error);
                sink.show_step(StepResult::error(format!("Analysis failed: {err}")));
                RunOutcome::Failed(err.to_string())
            }
        };

        session.transition(AnalysisState::Idle);
        sink.set_loading(false);
        info!(completed = outcome.is_completed(), "=== ANALYSIS END ===");
        outcome
    }

    async fn run_steps(
        &self,
        session: &mut AnalysisSession,
        sink: &mut dyn PresentationSink,
    ) -> Result<RunOutcome> {
        // Step 1: price
        enter(session, sink, AnalysisState::Price);
        let fetched = self.quotes.fetch_quote(&session.symbol).await;
        let quote = match fetched {
            Ok(quote) => quote,
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "Quote step failed");
                session.transition(AnalysisState::Error);
                sink.show_step(StepResult::error(err.to_string()));
                return Ok(RunOutcome::QuoteFailed(err.to_string()));
            }
        };
        sink.show_step(StepResult::new("Stock Data", self.formatter.format_quote(&quote)));

        // Step 2: model on the quote alone
        enter(session, sink, AnalysisState::PriceAnalysis);
        let request = [system_message(), self.prompts.price_analysis_request(&quote)?];
        let price_analysis = self.llm.generate(&request).await?;
        sink.show_step(StepResult::new("Price Analysis", price_analysis.clone()));
        session
            .conversation_mut()
            .push(Message::assistant(price_analysis));

        // Step 3: news, failure is reported and the run goes on
        enter(session, sink, AnalysisState::News);
        let fetched = self
            .news
            .fetch_news(&session.symbol, session.credentials.news_key.as_deref())
            .await;
        match fetched {
            Ok(articles) => {
                info!(count = articles.len(), "Fetched news");
                sink.show_step(StepResult::new(
                    "Recent News",
                    self.formatter.format_news(&articles)?,
                ));
                let summary = self.prompts.news_summary(&articles)?;
                session.conversation_mut().push(summary);
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "News step failed");
                sink.show_step(StepResult::new("News Error", err.to_string()));
            }
        }

        // Step 4: model on the accumulated conversation
        enter(session, sink, AnalysisState::DeepAnalysis);
        let request = with_system_instruction(session.conversation().messages());
        let final_analysis = self.llm.generate(&request).await?;
        sink.show_step(StepResult::new("Final Analysis", final_analysis));

        // Step 5
        enter(session, sink, AnalysisState::Recommendation);
        let ask = self.prompts.recommendation_request(&quote.symbol)?;
        session.conversation_mut().push(ask);
        let request = with_system_instruction(session.conversation().messages());
        let recommendation = self.llm.generate(&request).await?;
        sink.show_step(StepResult::new("Recommendation", recommendation));

        Ok(RunOutcome::Completed)
    }
}

fn enter(session: &mut AnalysisSession, sink: &mut dyn PresentationSink, state: AnalysisState) {
    session.transition(state);
    if let Some(progress) = state.progress() {
        info!(step = %progress.title, "{}", progress.content);
        sink.show_step(progress);
    }
}
