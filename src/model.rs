use crate::settings::{ModelBackend, ModelSettings};
use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Why a completion is requested. Backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Drawing,
    ModeChoice,
    Chat,
    Dream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub purpose: Purpose,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

pub trait LanguageModel {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String>;

    fn health_check(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Client for a llama.cpp compatible `/completion` server.
pub struct LlamaCppClient {
    client: Client,
    endpoint: String,
}

impl LlamaCppClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("aurora-canvas")
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl LanguageModel for LlamaCppClient {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        let body = CompletionBody {
            prompt: &request.prompt,
            n_predict: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop: &request.stop,
            stream: false,
        };
        let url = format!("{}/completion", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("post {url}"))?
            .error_for_status()
            .context("completion request failed")?;
        let parsed: CompletionResponse = resp.json().context("decode completion response")?;
        Ok(parsed.content)
    }

    fn health_check(&mut self) -> Result<()> {
        let url = format!("{}/health", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("reach model server at {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("model server unhealthy: {}", resp.status()));
        }
        Ok(())
    }
}

/// Replays queued answers in order; used by tests and as a fallback script.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    answers: VecDeque<Result<String, String>>,
    pub requests: Vec<GenerationRequest>,
}

impl ScriptedModel {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Ok(a.into())).collect(),
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: impl Into<String>) {
        self.answers.push_back(Ok(answer.into()));
    }

    /// Queues a failed generation.
    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.answers.push_back(Err(message.into()));
    }
}

impl LanguageModel for ScriptedModel {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        self.requests.push(request.clone());
        match self.answers.pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(String::new()),
        }
    }
}

/// Offline stand-in that draws from the built-in example codes.
pub struct DemoModel {
    rng: StdRng,
}

const DEMO_CODES: &[&str] = &[
    "red53333orange53333yellow53333",
    "blue533311122200cyan533311122200",
    "533330000222211113333000022221111",
    "spray5333111",
    "larger_brush53333",
    "5!3!3!3!",
    "white50000black52222",
    "green5313!313@313#",
    "brush5333333pen511111",
    "magenta51313131313",
    "4222225purple51111",
    "navy5++!++@++#",
];

const DEMO_CHAT: &[&str] = &[
    "The canvas feels like a quiet field tonight. I keep returning to long horizontal strokes.",
    "I wonder what the dark corners would look like in orange.",
];

const DEMO_DREAMS: &[&str] = &[
    "A river of cyan squares folding into itself.",
    "Brushes that hum as they paint, every stroke a low note.",
    "Waking with the idea of layering spray over brush.",
];

impl DemoModel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }
}

impl LanguageModel for DemoModel {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        let answer = match request.purpose {
            Purpose::Drawing => self.pick(DEMO_CODES),
            Purpose::ModeChoice => self.pick(&["CHAT", "DREAM", "DRAW"]),
            Purpose::Chat => self.pick(DEMO_CHAT),
            Purpose::Dream => self.pick(DEMO_DREAMS),
        };
        Ok(answer)
    }
}

/// Builds the configured backend and verifies it is reachable.
pub fn connect(settings: &ModelSettings) -> Result<Box<dyn LanguageModel>> {
    let mut model: Box<dyn LanguageModel> = match settings.backend {
        ModelBackend::Http => Box::new(LlamaCppClient::new(
            &settings.endpoint,
            Duration::from_secs(settings.request_timeout_secs),
        )?),
        ModelBackend::Demo => Box::new(DemoModel::new(42)),
    };
    model
        .health_check()
        .with_context(|| format!("model backend {:?} is not available", settings.backend))?;
    tracing::info!(backend = ?settings.backend, endpoint = %settings.endpoint, "model connected");
    Ok(model)
}
