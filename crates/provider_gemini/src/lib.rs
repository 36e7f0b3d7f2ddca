use std::collections::VecDeque;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use core_types::{AssistantProvider, ChatMessage, ChatRequest, ChatRole, TextStream};
use futures::StreamExt;
use serde_json::{Value, json};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiAssistantProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiAssistantProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url.trim_end_matches('/'),
            model,
            self.api_key.trim()
        )
    }
}

#[async_trait]
impl AssistantProvider for GeminiAssistantProvider {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream> {
        let model = request.model.trim();
        if model.is_empty() {
            bail!("gemini model is required");
        }
        if self.api_key.trim().is_empty() {
            bail!("gemini api key is required");
        }

        let body = build_body(&request);
        let response = self
            .client
            .post(self.endpoint(model))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .context("gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("provider request failed: {status} {text}");
        }
        debug!(model, messages = request.history.len(), "gemini stream opened");

        let chunks = Box::pin(response.bytes_stream());
        let state = StreamState {
            chunks,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            finished: false,
        };
        let stream = futures::stream::unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, state));
                }
                if state.finished {
                    return None;
                }
                match state.chunks.next().await {
                    Some(Ok(chunk)) => {
                        let payloads = state.decoder.push(&chunk);
                        state.queue(payloads);
                    }
                    Some(Err(err)) => {
                        state
                            .pending
                            .push_back(Err(anyhow!(err).context("gemini stream interrupted")));
                        state.finished = true;
                    }
                    None => {
                        let payloads = state.decoder.finish();
                        state.queue(payloads);
                        state.finished = true;
                    }
                }
            }
        });
        Ok(Box::pin(stream))
    }
}

struct StreamState<S> {
    chunks: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl<S> StreamState<S> {
    fn queue(&mut self, payloads: Vec<Result<Value>>) {
        for payload in payloads {
            match payload {
                Ok(payload) => {
                    let text = payload_text(&payload);
                    if !text.is_empty() {
                        self.pending.push_back(Ok(text));
                    }
                }
                Err(err) => self.pending.push_back(Err(err)),
            }
        }
    }
}

#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<Result<Value>> {
        self.buffer.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            out.extend(parse_sse_line(&String::from_utf8_lossy(&line)));
        }
        out
    }

    fn finish(&mut self) -> Vec<Result<Value>> {
        let rest = std::mem::take(&mut self.buffer);
        parse_sse_line(&String::from_utf8_lossy(&rest))
            .into_iter()
            .collect()
    }
}

fn parse_sse_line(line: &str) -> Option<Result<Value>> {
    let payload = line.trim().strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str(payload).context("invalid gemini sse payload"))
}

fn payload_text(payload: &Value) -> String {
    payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn build_body(request: &ChatRequest) -> Value {
    json!({
        "systemInstruction": {"parts": [{"text": request.system_instruction}]},
        "contents": to_gemini_contents(&request.history),
    })
}

fn to_gemini_contents(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            };
            json!({
                "role": role,
                "parts": [{"text": msg.text}]
            })
        })
        .collect()
}
