//! Resume Analysis — turns extracted resume text into structured insights via the LLM.
//!
//! Flow per upload: build prompt → (call LLM → strip fences → parse → validate)
//! repeated up to `RetryPolicy::max_attempts` times with linear backoff.
//!
//! `ResumeAnalyzer::analyze` never fails. When the attempt budget is exhausted it
//! returns the terminal error record and the upload carries on without insights.

pub mod model;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::model::{AnalysisOutcome, AnalysisResult, ANALYSIS_SCHEMA_VERSION};
use crate::analysis::prompts::build_analysis_prompt;
use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};

/// Error text stored in `aiAnalysis.error` once every attempt has failed.
pub const ANALYSIS_FAILED_MESSAGE: &str = "AI analysis failed after multiple retries";

/// Attempt budget and linear backoff: the wait after failed attempt `n` is `backoff_base × n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_base
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(5),
        }
    }
}

/// Why a single attempt produced no usable result. Every variant is retryable.
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model response is not valid JSON: {0}")]
    MalformedJson(serde_json::Error),

    #[error("model response does not match the analysis schema: {0}")]
    SchemaViolation(serde_json::Error),
}

/// Parses raw model text (optionally fenced) into a validated `AnalysisResult`.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisFailure> {
    let value: serde_json::Value =
        serde_json::from_str(strip_json_fences(raw)).map_err(AnalysisFailure::MalformedJson)?;
    serde_json::from_value(value).map_err(AnalysisFailure::SchemaViolation)
}

#[derive(Clone)]
pub struct ResumeAnalyzer {
    llm: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    max_text_length: usize,
}

impl ResumeAnalyzer {
    pub fn new(llm: Arc<dyn TextGenerator>, policy: RetryPolicy, max_text_length: usize) -> Self {
        Self {
            llm,
            policy,
            max_text_length,
        }
    }

    /// Runs the analysis state machine to a terminal state.
    /// Attempts are strictly sequential; the backoff sleep suspends only this task.
    pub async fn analyze(&self, resume_text: &str) -> AnalysisOutcome {
        let prompt = build_analysis_prompt(resume_text, self.max_text_length);
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            match self.attempt(&prompt).await {
                Ok(result) => {
                    info!(
                        "AI analysis succeeded on attempt {attempt}/{max_attempts} \
                         (schema v{ANALYSIS_SCHEMA_VERSION}, quality score {})",
                        result.resume_quality_score
                    );
                    return AnalysisOutcome::Insights(result);
                }
                Err(e) => {
                    warn!("AI analysis attempt {attempt}/{max_attempts} failed: {e}");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!("AI analysis exhausted {max_attempts} attempts; storing error record");
        AnalysisOutcome::Degraded {
            error: ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<AnalysisResult, AnalysisFailure> {
        let raw = self.llm.generate(prompt).await?;
        parse_analysis(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{valid_analysis_json, ScriptedLlm};
    use tokio::time::Instant;

    fn analyzer(llm: Arc<ScriptedLlm>) -> ResumeAnalyzer {
        ResumeAnalyzer::new(llm, RetryPolicy::default(), 10_000)
    }

    #[test]
    fn test_delay_scales_linearly_with_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
    }

    #[test]
    fn test_huge_backoff_base_saturates() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_secs(u64::MAX / 2 + 1),
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(u64::MAX / 2 + 1));
        assert_eq!(policy.delay_after(2), Duration::MAX);
    }

    #[test]
    fn test_fenced_response_parses_like_unwrapped_json() {
        let raw = valid_analysis_json();
        let fenced = format!("```json\n{raw}\n```");
        assert_eq!(
            parse_analysis(&fenced).unwrap(),
            parse_analysis(&raw).unwrap()
        );
    }

    #[test]
    fn test_parse_distinguishes_malformed_from_schema_violation() {
        assert!(matches!(
            parse_analysis("Sure! Here is the analysis"),
            Err(AnalysisFailure::MalformedJson(_))
        ));
        assert!(matches!(
            parse_analysis(r#"{"summary": "missing everything else"}"#),
            Err(AnalysisFailure::SchemaViolation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_makes_one_call() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(valid_analysis_json())]));
        let start = Instant::now();

        let outcome = analyzer(llm.clone()).analyze("resume text").await;

        assert_eq!(llm.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(outcome.insights().unwrap().resume_quality_score, 8.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_failure_stops_at_budget_with_error_record() {
        let llm = Arc::new(ScriptedLlm::failing());
        let start = Instant::now();

        let outcome = analyzer(llm.clone()).analyze("resume text").await;

        assert_eq!(llm.calls(), 3);
        // 5s after attempt 1, 10s after attempt 2, none after the last
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(15), "waited {waited:?}");
        assert!(waited < Duration::from_secs(16), "waited {waited:?}");
        assert_eq!(
            outcome,
            AnalysisOutcome::Degraded {
                error: ANALYSIS_FAILED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_200_response_is_retried() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("I could not parse that resume.".to_string()),
            Ok(format!("```json\n{}\n```", valid_analysis_json())),
        ]));

        let outcome = analyzer(llm.clone()).analyze("resume text").await;

        assert_eq!(llm.calls(), 2);
        assert!(!outcome.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schema_violation_counts_against_budget() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(r#"{"summary": "only a summary"}"#.to_string()),
            Err(LlmError::EmptyContent),
            Ok(r#"{"skills": {}}"#.to_string()),
            Ok(valid_analysis_json()),
        ]));

        let outcome = analyzer(llm.clone()).analyze("resume text").await;

        assert_eq!(llm.calls(), 3, "must not retry beyond the budget");
        assert!(outcome.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_sent_to_model_is_bounded() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(valid_analysis_json())]));
        let analyzer = ResumeAnalyzer::new(llm.clone(), RetryPolicy::default(), 100);

        analyzer.analyze(&"y".repeat(5_000)).await;

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains(&"y".repeat(100)));
        assert!(!prompt.contains(&"y".repeat(101)));
    }
}
