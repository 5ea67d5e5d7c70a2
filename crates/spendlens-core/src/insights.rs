//! Narrative spending insights from a local LLM
//!
//! Insights are optional commentary on top of an [`AggregateResult`]. A failed
//! or unreachable backend never affects the computed metrics; callers get
//! `None` and a warning in the log.
//!
//! # Configuration
//!
//! Backends are built from [`InsightSettings`]; `OLLAMA_HOST` and
//! `OLLAMA_MODEL` are applied there when settings are loaded.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::InsightSettings;
use crate::error::{Error, Result};
use crate::models::{AggregateResult, Transaction};

/// Largest expenses included verbatim in the prompt
const PROMPT_SAMPLE: usize = 25;

/// Anything that can turn a transaction set into prose
#[async_trait]
pub trait InsightBackend: Send + Sync {
    async fn generate(
        &self,
        transactions: &[Transaction],
        result: &AggregateResult,
    ) -> Result<String>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;
}

/// Ask a backend for insights, swallowing failures
pub async fn request_insights(
    backend: &dyn InsightBackend,
    transactions: &[Transaction],
    result: &AggregateResult,
) -> Option<String> {
    if transactions.is_empty() {
        return None;
    }

    match backend.generate(transactions, result).await {
        Ok(text) if text.trim().is_empty() => {
            warn!("Insight backend returned an empty response");
            None
        }
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            warn!("Insights unavailable: {}", e);
            None
        }
    }
}

/// Build the prompt sent to the model
pub fn build_prompt(transactions: &[Transaction], result: &AggregateResult) -> String {
    let mut prompt = String::from(
        "You are a personal finance assistant. Review this spending summary and \
         give three short, concrete observations. Negative amounts are spending.\n\n",
    );

    let _ = writeln!(prompt, "Transactions: {}", result.transaction_count);
    let _ = writeln!(prompt, "Total spent: ${:.2}", result.total_spent);
    let _ = writeln!(prompt, "Total income: ${:.2}", result.total_income);
    let _ = writeln!(prompt, "Average monthly spend: ${:.2}", result.avg_monthly_spend);
    let _ = writeln!(
        prompt,
        "Month-over-month change: {:.1}%",
        result.month_over_month_change
    );
    if let Some(range) = &result.date_range {
        let _ = writeln!(prompt, "Period: {} to {}", range.earliest, range.latest);
    }

    if !result.category_breakdown.is_empty() {
        prompt.push_str("\nTop categories:\n");
        for slice in &result.category_breakdown {
            let _ = writeln!(prompt, "- {}: ${:.2}", slice.name, slice.value);
        }
    }

    if !result.recurring_payments.is_empty() {
        prompt.push_str("\nRecurring charges:\n");
        for payment in &result.recurring_payments {
            let _ = writeln!(
                prompt,
                "- {} ${:.2} ({})",
                payment.description, payment.amount, payment.months_charged
            );
        }
    }

    let mut largest: Vec<&Transaction> = transactions.iter().filter(|t| t.is_spending()).collect();
    largest.sort_by(|a, b| a.amount.total_cmp(&b.amount));
    largest.truncate(PROMPT_SAMPLE);

    if !largest.is_empty() {
        prompt.push_str("\nLargest expenses:\n");
        for tx in largest {
            let _ = writeln!(
                prompt,
                "- {} {} ${:.2}",
                tx.date,
                tx.description,
                tx.abs_amount()
            );
        }
    }

    prompt
}

/// Ollama-backed insight generator
#[derive(Clone)]
pub struct OllamaInsights {
    http_client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaInsights {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    /// Create from loaded settings; `None` when no host is configured
    pub fn from_settings(settings: &InsightSettings) -> Option<Self> {
        let host = settings.host.as_deref()?;
        Some(Self::new(host, &settings.model, settings.timeout))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Extract the generated text from a non-streaming `/api/generate` body
fn parse_generate_response(body: &str) -> Result<String> {
    let parsed: OllamaResponse = serde_json::from_str(body)?;
    Ok(parsed.response)
}

#[async_trait]
impl InsightBackend for OllamaInsights {
    async fn generate(
        &self,
        transactions: &[Transaction],
        result: &AggregateResult,
    ) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: build_prompt(transactions, result),
            stream: false,
        };

        debug!("Requesting insights from {} ({})", self.base_url, self.model);

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Insight(format!("Ollama error {}: {}", status, text)));
        }

        let body = response.text().await?;
        parse_generate_response(&body)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Mock backend for testing
#[derive(Clone, Default)]
pub struct MockInsights {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply; `None` makes `generate` fail
    pub reply: Option<String>,
}

impl MockInsights {
    /// Create a healthy mock that summarizes the totals
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: Some(String::new()),
        }
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            healthy: true,
            reply: Some(reply.to_string()),
        }
    }

    /// Create a failing mock backend
    pub fn failing() -> Self {
        Self {
            healthy: false,
            reply: None,
        }
    }
}

#[async_trait]
impl InsightBackend for MockInsights {
    async fn generate(
        &self,
        _transactions: &[Transaction],
        result: &AggregateResult,
    ) -> Result<String> {
        match &self.reply {
            Some(reply) if !reply.is_empty() => Ok(reply.clone()),
            Some(_) => Ok(format!(
                "You spent ${:.2} across {} transactions.",
                result.total_spent, result.spending_count
            )),
            None => Err(Error::Insight("mock backend unavailable".into())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}
