//! Oracle policies
//!
//! - [`GreedyOracle`]: deterministic, needs no model
//! - [`RandomOracle`]: uniform choices, flat grades (seedable)
//! - [`LlmOracle`]: renders prompts for any [`LlmClient`]
//! - [`AnthropicClient`]: Messages API transport (feature `anthropic`)
//! - [`OpenAiClient`]: chat-completions transport (feature `openai`)
//! - [`ScriptedClient`]: canned replies for tests and dry runs

use crate::oracle::{Candidate, Oracle};
use crate::prompts::{propose_prompt, value_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use boolproof_dsl::Expr;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Greedy
// ============================================================================

/// Picks the candidate with the fewest nodes (earliest on ties) and grades
/// smaller trees higher.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyOracle;

impl GreedyOracle {
    pub fn grade(expr: &Expr) -> u8 {
        let penalty = (expr.size() - 1) / 2;
        10usize.saturating_sub(penalty).clamp(1, 10) as u8
    }
}

#[async_trait]
impl Oracle for GreedyOracle {
    async fn choose(&self, _expr: &Expr, candidates: &[Candidate]) -> anyhow::Result<String> {
        let (index, candidate) = candidates
            .iter()
            .enumerate()
            .min_by_key(|(index, candidate)| (candidate.expr.size(), *index))
            .ok_or_else(|| anyhow::anyhow!("greedy oracle got no candidates"))?;
        Ok(format!(
            "LLM CHOICE: #{}. ({})",
            index + 1,
            candidate.law
        ))
    }

    async fn value(&self, expr: &Expr, _history: &[Expr]) -> anyhow::Result<String> {
        Ok(format!("LLM GRADE: {}", Self::grade(expr)))
    }
}

// ============================================================================
// Random
// ============================================================================

/// Grade every node alike so pruning keeps pool order.
pub const RANDOM_GRADE: u8 = 5;

/// Picks uniformly among the candidates. Grades carry no information.
pub struct RandomOracle {
    rng: Mutex<StdRng>,
}

impl RandomOracle {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Oracle for RandomOracle {
    async fn choose(&self, _expr: &Expr, candidates: &[Candidate]) -> anyhow::Result<String> {
        if candidates.is_empty() {
            anyhow::bail!("random oracle got no candidates");
        }
        let n = self.rng.lock().gen_range(1..=candidates.len());
        Ok(format!("LLM CHOICE: #{n}"))
    }

    async fn value(&self, _expr: &Expr, _history: &[Expr]) -> anyhow::Result<String> {
        Ok(format!("LLM GRADE: {RANDOM_GRADE}"))
    }
}

// ============================================================================
// Language models
// ============================================================================

/// A text-completion transport.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Arc<C> {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        (**self).complete(system, prompt).await
    }
}

/// An oracle that asks a language model. Reply parsing stays with the search.
pub struct LlmOracle<C> {
    client: C,
}

impl<C: LlmClient> LlmOracle<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: LlmClient> Oracle for LlmOracle<C> {
    async fn choose(&self, expr: &Expr, candidates: &[Candidate]) -> anyhow::Result<String> {
        self.client
            .complete(SYSTEM_PROMPT, &propose_prompt(expr, candidates))
            .await
    }

    async fn value(&self, expr: &Expr, history: &[Expr]) -> anyhow::Result<String> {
        self.client
            .complete(SYSTEM_PROMPT, &value_prompt(expr, history))
            .await
    }
}

/// Replays canned replies in order, cycling, and records every prompt.
pub struct ScriptedClient {
    pub responses: Vec<String>,
    response_idx: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            response_idx: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _system: &str, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let idx = self.response_idx.fetch_add(1, Ordering::SeqCst);
        if self.responses.is_empty() {
            anyhow::bail!("scripted client has no responses");
        }
        Ok(self.responses[idx % self.responses.len()].clone())
    }
}

// ============================================================================
// Anthropic
// ============================================================================

#[cfg(feature = "anthropic")]
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
#[cfg(feature = "anthropic")]
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
#[cfg(feature = "anthropic")]
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client.
#[cfg(feature = "anthropic")]
pub struct AnthropicClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    http: reqwest::Client,
}

#[cfg(feature = "anthropic")]
impl AnthropicClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// `ANTHROPIC_API_KEY` (required), `ANTHROPIC_BASE_URL`, and
    /// `ANTHROPIC_MODEL` unless `model` is given.
    pub fn from_env(model: Option<&str>) -> anyhow::Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY is not set"))?;
        let model = match model {
            Some(model) => model.to_string(),
            None => std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
        };
        let mut client = Self::new(&api_key, &model);
        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL") {
            if !base_url.trim().is_empty() {
                client = client.with_base_url(base_url.trim());
            }
        }
        Ok(client)
    }
}

/// Concatenate the `text` blocks of a Messages API response.
#[cfg(feature = "anthropic")]
fn anthropic_output_text(v: &serde_json::Value) -> Option<String> {
    let mut out = String::new();
    for block in v.get("content")?.as_array()? {
        if block.get("type").and_then(|t| t.as_str()) != Some("text") {
            continue;
        }
        if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(text);
        }
    }
    let trimmed = out.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(feature = "anthropic")]
#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": system,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("failed to reach Anthropic at {url}: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("anthropic http error {status}: {text}");
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("anthropic returned invalid JSON: {e}"))?;
        anthropic_output_text(&v)
            .ok_or_else(|| anyhow::anyhow!("anthropic: no text blocks in response"))
    }
}

// ============================================================================
// OpenAI
// ============================================================================

#[cfg(feature = "openai")]
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
#[cfg(feature = "openai")]
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI-compatible chat-completions client.
#[cfg(feature = "openai")]
pub struct OpenAiClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    http: reqwest::Client,
}

#[cfg(feature = "openai")]
impl OpenAiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`, and `OPENAI_MODEL`
    /// unless `model` is given.
    pub fn from_env(model: Option<&str>) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let model = match model {
            Some(model) => model.to_string(),
            None => std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        };
        let mut client = Self::new(&api_key, &model);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                client = client.with_base_url(base_url.trim());
            }
        }
        Ok(client)
    }
}

/// The first choice's message content.
#[cfg(feature = "openai")]
fn openai_output_text(v: &serde_json::Value) -> Option<String> {
    let text = v["choices"][0]["message"]["content"].as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(feature = "openai")]
#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ]
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("failed to reach OpenAI at {url}: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("openai http error {status}: {text}");
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("openai returned invalid JSON: {e}"))?;
        openai_output_text(&v).ok_or_else(|| anyhow::anyhow!("openai: empty completion"))
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Build an oracle by name: `greedy`, `random` (optional setting `seed`),
/// `scripted` (setting `response`), `anthropic` or `openai` (settings
/// `model`, `base_url`; key from the environment).
pub fn create_oracle(
    kind: &str,
    settings: &HashMap<String, String>,
) -> anyhow::Result<Arc<dyn Oracle>> {
    match kind {
        "greedy" => Ok(Arc::new(GreedyOracle)),
        "random" => match settings.get("seed") {
            Some(seed) => {
                let seed: u64 = seed
                    .parse()
                    .map_err(|_| anyhow::anyhow!("random oracle seed must be an integer: {seed}"))?;
                Ok(Arc::new(RandomOracle::seeded(seed)))
            }
            None => Ok(Arc::new(RandomOracle::new())),
        },
        "scripted" => {
            let response = settings
                .get("response")
                .ok_or_else(|| anyhow::anyhow!("scripted oracle requires a response"))?;
            Ok(Arc::new(LlmOracle::new(ScriptedClient::always(response))))
        }
        #[cfg(feature = "anthropic")]
        "anthropic" => {
            let mut client = AnthropicClient::from_env(settings.get("model").map(|s| s.as_str()))?;
            if let Some(base_url) = settings.get("base_url") {
                client = client.with_base_url(base_url);
            }
            Ok(Arc::new(LlmOracle::new(client)))
        }
        #[cfg(feature = "openai")]
        "openai" => {
            let mut client = OpenAiClient::from_env(settings.get("model").map(|s| s.as_str()))?;
            if let Some(base_url) = settings.get("base_url") {
                client = client.with_base_url(base_url);
            }
            Ok(Arc::new(LlmOracle::new(client)))
        }
        _ => Err(anyhow::anyhow!("Unknown oracle: {}", kind)),
    }
}
