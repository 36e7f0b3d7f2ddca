use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type MessageId = Uuid;
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported value `{0}`")]
pub struct ParseEnumError(pub String);

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SiteIdentity {
    pub name: String,
    pub url: String,
}

impl SiteIdentity {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn canonical_url(&self, fragment: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), fragment)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UseCase {
    pub id: u32,
    pub title: String,
    pub industry: String,
    pub technology: String,
    pub mini_description: String,
    #[serde(default)]
    pub technical_level: u8,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub roi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_guide: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BreadcrumbLink {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl BreadcrumbLink {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub structured_data: Option<Value>,
    pub breadcrumbs: Vec<BreadcrumbLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request for `{path}` returned status {status}")]
    Status { path: String, status: u16 },
    #[error("request for `{path}` failed: {message}")]
    Transport { path: String, message: String },
    #[error("document `{path}` is not valid json: {message}")]
    Decode { path: String, message: String },
}

impl FetchError {
    pub fn not_found(path: impl Into<String>) -> Self {
        FetchError::Status {
            path: path.into(),
            status: 404,
        }
    }
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetches a JSON document addressed relative to the content root.
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError>;
}

/// The environment the core drives: location fragment, scrolling, focus and
/// document metadata.
pub trait Host: Send + Sync {
    fn fragment(&self) -> String;
    fn set_fragment(&self, fragment: &str);
    fn scroll_to_top(&self);
    fn set_body_scroll_locked(&self, locked: bool);
    fn active_element(&self) -> Option<ElementId>;
    fn focus(&self, element: &ElementId);
    fn focus_first_within(&self, container: &ElementId);
    fn apply_document(&self, document: &DocumentMeta);
}

#[derive(Debug, Default)]
struct MemoryHostState {
    fragment: String,
    history: Vec<String>,
    scroll_resets: usize,
    body_scroll_locked: bool,
    focused: Option<ElementId>,
    focusable: BTreeMap<ElementId, Vec<ElementId>>,
    document: DocumentMeta,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<MemoryHostState>,
}

impl MemoryHost {
    pub fn new(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            state: Mutex::new(MemoryHostState {
                history: vec![fragment.clone()],
                fragment,
                ..MemoryHostState::default()
            }),
        }
    }

    pub fn register_focusable(&self, container: ElementId, element: ElementId) {
        self.state
            .lock()
            .focusable
            .entry(container)
            .or_default()
            .push(element);
    }

    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }

    pub fn scroll_resets(&self) -> usize {
        self.state.lock().scroll_resets
    }

    pub fn body_scroll_locked(&self) -> bool {
        self.state.lock().body_scroll_locked
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.state.lock().focused.clone()
    }

    pub fn document(&self) -> DocumentMeta {
        self.state.lock().document.clone()
    }
}

impl Host for MemoryHost {
    fn fragment(&self) -> String {
        self.state.lock().fragment.clone()
    }

    fn set_fragment(&self, fragment: &str) {
        let mut state = self.state.lock();
        state.fragment = fragment.to_string();
        state.history.push(fragment.to_string());
    }

    fn scroll_to_top(&self) {
        self.state.lock().scroll_resets += 1;
    }

    fn set_body_scroll_locked(&self, locked: bool) {
        self.state.lock().body_scroll_locked = locked;
    }

    fn active_element(&self) -> Option<ElementId> {
        self.state.lock().focused.clone()
    }

    fn focus(&self, element: &ElementId) {
        self.state.lock().focused = Some(element.clone());
    }

    fn focus_first_within(&self, container: &ElementId) {
        let mut state = self.state.lock();
        let target = state
            .focusable
            .get(container)
            .and_then(|elements| elements.first().cloned())
            .unwrap_or_else(|| container.clone());
        state.focused = Some(target);
    }

    fn apply_document(&self, document: &DocumentMeta) {
        self.state.lock().document = document.clone();
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    PageView {
        path: String,
        title: String,
    },
    Custom {
        name: String,
        params: BTreeMap<String, Value>,
    },
}

impl AnalyticsEvent {
    pub fn page_view(path: impl Into<String>, title: impl Into<String>) -> Self {
        AnalyticsEvent::PageView {
            path: path.into(),
            title: title.into(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        AnalyticsEvent::Custom {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let AnalyticsEvent::Custom { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            AnalyticsEvent::PageView { .. } => "page_view",
            AnalyticsEvent::Custom { name, .. } => name,
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

#[derive(Debug, Clone)]
pub struct TracingAnalytics {
    measurement_id: Option<String>,
}

impl TracingAnalytics {
    pub fn new(measurement_id: Option<String>) -> Self {
        let measurement_id = measurement_id.filter(|id| !id.trim().is_empty());
        if measurement_id.is_none() {
            warn!("analytics measurement id is not configured, events will be dropped");
        }
        Self { measurement_id }
    }
}

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        let Some(measurement_id) = self.measurement_id.as_deref() else {
            debug!(event = event.name(), "analytics disabled");
            return;
        };
        let payload = serde_json::to_string(&event).unwrap_or_default();
        info!(target: "analytics", measurement_id, event = event.name(), %payload, "track");
    }
}

#[derive(Debug, Default)]
pub struct MemoryAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemoryAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        self.events.lock().push(event);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, text)
    }

    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
}

#[async_trait]
pub trait AssistantProvider: Send + Sync {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream>;
}
