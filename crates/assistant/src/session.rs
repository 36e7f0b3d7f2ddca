use std::sync::Arc;

use core_types::{
    AnalyticsEvent, AnalyticsSink, AssistantProvider, ChatMessage, ChatRequest, ChatRole, Host,
};
use futures::StreamExt;
use i18n::Translator;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::instruction::build_system_instruction;
use crate::tool::{ToolCall, parse_tool_call};

pub const ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";
pub const INITIAL_MESSAGE_KEY: &str = "geminiBot.initialMessage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Ignored,
    Replied,
    ToolDispatched(ToolCall),
    Failed,
}

pub struct AssistantSession {
    provider: Option<Arc<dyn AssistantProvider>>,
    analytics: Arc<dyn AnalyticsSink>,
    model: String,
    site_name: String,
    system_instruction: Option<String>,
    transcript: Vec<ChatMessage>,
    // Completed exchanges as the model produced them. Failed turns are
    // left out entirely.
    history: Vec<ChatMessage>,
    is_open: bool,
}

impl AssistantSession {
    pub fn new(
        provider: Option<Arc<dyn AssistantProvider>>,
        model: impl Into<String>,
        site_name: impl Into<String>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        if provider.is_none() {
            warn!("assistant credential is not configured, the assistant stays inert");
        }
        Self {
            provider,
            analytics,
            model: model.into(),
            site_name: site_name.into(),
            system_instruction: None,
            transcript: Vec::new(),
            history: Vec::new(),
            is_open: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn open(&mut self, translator: &Translator) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        self.analytics.track(AnalyticsEvent::custom("open_gemini_bot"));
        if self.system_instruction.is_none() {
            self.restart(translator);
        }
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn restart(&mut self, translator: &Translator) {
        if self.provider.is_none() {
            return;
        }
        self.system_instruction = Some(build_system_instruction(translator, &self.site_name));
        let greeting = translator
            .text(INITIAL_MESSAGE_KEY)
            .unwrap_or(INITIAL_MESSAGE_KEY);
        self.transcript = vec![ChatMessage::model(greeting)];
        self.history.clear();
        debug!(language = %translator.language(), "assistant conversation started");
    }

    pub async fn send(&mut self, input: &str, host: &dyn Host) -> SendOutcome {
        self.send_with(input, host, |_| {}).await
    }

    // A tool call is shown as its confirmation; the model history keeps the
    // raw reply.
    pub async fn send_with(
        &mut self,
        input: &str,
        host: &dyn Host,
        mut on_delta: impl FnMut(&str),
    ) -> SendOutcome {
        let input = input.trim();
        let (Some(provider), Some(system_instruction)) =
            (self.provider.clone(), self.system_instruction.clone())
        else {
            return SendOutcome::Ignored;
        };
        if input.is_empty() {
            return SendOutcome::Ignored;
        }

        let user_turn = ChatMessage::user(input);
        self.transcript.push(user_turn.clone());
        self.analytics.track(
            AnalyticsEvent::custom("send_gemini_bot_message")
                .with("message_length", input.chars().count()),
        );

        let mut history = self.history.clone();
        history.push(user_turn.clone());
        let request = ChatRequest {
            model: self.model.clone(),
            system_instruction,
            history,
        };
        self.transcript.push(ChatMessage::model(""));

        let mut stream = match provider.stream_chat(request).await {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "assistant request failed");
                self.replace_reply(ERROR_REPLY.to_string());
                return SendOutcome::Failed;
            }
        };

        let mut reply = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(delta) => {
                    reply.push_str(&delta);
                    on_delta(&delta);
                    self.replace_reply(reply.clone());
                }
                Err(err) => {
                    error!(error = %err, "assistant stream failed");
                    self.replace_reply(ERROR_REPLY.to_string());
                    return SendOutcome::Failed;
                }
            }
        }

        self.history.push(user_turn);
        self.history.push(ChatMessage::model(reply.clone()));

        match parse_tool_call(&reply) {
            Some(call) => {
                self.dispatch(&call, host);
                self.replace_reply(call.confirmation());
                SendOutcome::ToolDispatched(call)
            }
            None => SendOutcome::Replied,
        }
    }

    fn dispatch(&self, call: &ToolCall, host: &dyn Host) {
        let Some(fragment) = call.target_fragment() else {
            warn!(tool = call.name(), "assistant requested an unknown tool");
            return;
        };
        host.set_fragment(&fragment);

        let event = AnalyticsEvent::custom("gemini_bot_tool_use").with("tool_name", call.name());
        let event = match call {
            ToolCall::NavigateTo { path } => event.with("path", path.as_str()),
            ToolCall::FilterUseCases { filters } => {
                let filters: Map<String, Value> = filters
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
                    .collect();
                event.with("filters", Value::Object(filters).to_string())
            }
            ToolCall::Unknown { .. } => event,
        };
        self.analytics.track(event);
    }

    fn replace_reply(&mut self, text: String) {
        if let Some(last) = self
            .transcript
            .last_mut()
            .filter(|message| message.role == ChatRole::Model)
        {
            last.text = text;
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use core_types::{Language, MemoryAnalytics, MemoryHost, TextStream};
    use i18n::TranslationTree;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    struct ScriptedProvider {
        script: Mutex<Vec<Vec<Result<String, String>>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Vec<Result<String, String>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AssistantProvider for ScriptedProvider {
        async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream> {
            self.requests.lock().push(request);
            let mut script = self.script.lock();
            if script.is_empty() {
                return Err(anyhow!("script exhausted"));
            }
            let items: Vec<Result<String>> = script
                .remove(0)
                .into_iter()
                .map(|item| item.map_err(|message| anyhow!(message)))
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    fn translator() -> Translator {
        let tree = TranslationTree::from_value(json!({
            "geminiBot": {"initialMessage": "Hi! Ask me anything."}
        }))
        .expect("tree");
        Translator::new(Language::En, Arc::new(tree))
    }

    fn session(
        provider: Arc<ScriptedProvider>,
        analytics: Arc<MemoryAnalytics>,
    ) -> AssistantSession {
        let provider: Arc<dyn AssistantProvider> = provider;
        let mut session =
            AssistantSession::new(Some(provider), "gemini-2.5-flash", "Folio", analytics);
        session.open(&translator());
        session
    }

    fn chunks(parts: &[&str]) -> Vec<Result<String, String>> {
        parts.iter().map(|part| Ok(part.to_string())).collect()
    }

    #[tokio::test]
    async fn without_provider_sends_are_ignored() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut session = AssistantSession::new(None, "gemini-2.5-flash", "Folio", analytics);
        session.open(&translator());
        let host = MemoryHost::new("#/");

        assert_eq!(session.send("hello", &host).await, SendOutcome::Ignored);
        assert!(session.transcript().is_empty());
        assert!(!session.is_available());
    }

    #[tokio::test]
    async fn streams_text_into_the_transcript() {
        let provider = ScriptedProvider::new(vec![chunks(&["Elliot ", "works in ", "automation."])]);
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut session = session(provider.clone(), analytics.clone());
        let host = MemoryHost::new("#/");

        let mut deltas = Vec::new();
        let outcome = session
            .send_with("  who is this?  ", &host, |delta| deltas.push(delta.to_string()))
            .await;

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(deltas.len(), 3);
        let transcript = session.transcript();
        assert_eq!(transcript[0].text, "Hi! Ask me anything.");
        assert_eq!(transcript[1].text, "who is this?");
        assert_eq!(transcript[2].text, "Elliot works in automation.");
        assert_eq!(analytics.count("open_gemini_bot"), 1);
        assert_eq!(analytics.count("send_gemini_bot_message"), 1);

        let requests = provider.requests.lock();
        assert_eq!(requests[0].history.len(), 1);
        assert_eq!(requests[0].history[0].role, ChatRole::User);
        assert!(requests[0].system_instruction.contains("currently: English"));
    }

    #[tokio::test]
    async fn tool_calls_move_the_host() {
        let provider = ScriptedProvider::new(vec![chunks(&[
            r#"{"tool_name": "filterUseCases", "#,
            r#""filters": {"industry": "Insurance"}}"#,
        ])]);
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut session = session(provider, analytics.clone());
        let host = MemoryHost::new("#/");

        let outcome = session.send("insurance examples", &host).await;
        assert!(matches!(outcome, SendOutcome::ToolDispatched(ToolCall::FilterUseCases { .. })));
        assert_eq!(host.fragment(), "#/use-cases?industry=Insurance");
        assert_eq!(
            session.transcript().last().map(|m| m.text.as_str()),
            Some("Applying filters: industry=Insurance")
        );
        assert_eq!(analytics.count("gemini_bot_tool_use"), 1);
    }

    #[tokio::test]
    async fn unknown_tools_leave_the_fragment_alone() {
        let provider = ScriptedProvider::new(vec![chunks(&[r#"{"tool_name": "dance"}"#])]);
        let mut session = session(provider, Arc::new(MemoryAnalytics::default()));
        let host = MemoryHost::new("#/about");

        let outcome = session.send("dance", &host).await;
        assert!(matches!(outcome, SendOutcome::ToolDispatched(ToolCall::Unknown { .. })));
        assert_eq!(host.fragment(), "#/about");
        assert_eq!(
            session.transcript().last().map(|m| m.text.as_str()),
            Some(crate::tool::UNKNOWN_TOOL_REPLY)
        );
    }

    #[tokio::test]
    async fn stream_errors_replace_the_pending_reply() {
        let provider = ScriptedProvider::new(vec![vec![
            Ok("Partial".to_string()),
            Err("connection reset".to_string()),
        ]]);
        let mut session = session(provider, Arc::new(MemoryAnalytics::default()));
        let host = MemoryHost::new("#/");

        assert_eq!(session.send("hello", &host).await, SendOutcome::Failed);
        assert_eq!(
            session.transcript().last().map(|m| m.text.as_str()),
            Some(ERROR_REPLY)
        );

        assert_eq!(session.send("again", &host).await, SendOutcome::Failed);
        assert_eq!(session.transcript().len(), 5);
    }

    #[tokio::test]
    async fn failed_turns_stay_out_of_the_model_history() {
        let tool_reply = r##"{"tool_name": "navigateTo", "path": "#/about"}"##;
        let provider = ScriptedProvider::new(vec![
            vec![Err("quota exceeded".to_string())],
            chunks(&[tool_reply]),
            chunks(&["Anything else?"]),
        ]);
        let mut session = session(provider.clone(), Arc::new(MemoryAnalytics::default()));
        let host = MemoryHost::new("#/");

        assert_eq!(session.send("first", &host).await, SendOutcome::Failed);
        assert!(matches!(
            session.send("second", &host).await,
            SendOutcome::ToolDispatched(ToolCall::NavigateTo { .. })
        ));
        assert_eq!(session.send("third", &host).await, SendOutcome::Replied);

        let turns = |request: &ChatRequest| -> Vec<(ChatRole, String)> {
            request
                .history
                .iter()
                .map(|message| (message.role, message.text.clone()))
                .collect()
        };
        let requests = provider.requests.lock();
        assert_eq!(turns(&requests[1]), vec![(ChatRole::User, "second".to_string())]);
        assert_eq!(
            turns(&requests[2]),
            vec![
                (ChatRole::User, "second".to_string()),
                (ChatRole::Model, tool_reply.to_string()),
                (ChatRole::User, "third".to_string()),
            ]
        );
        assert!(session.transcript().iter().any(|m| m.text == ERROR_REPLY));
    }

    #[tokio::test]
    async fn restart_forgets_the_model_history() {
        let provider = ScriptedProvider::new(vec![chunks(&["One."]), chunks(&["Deux."])]);
        let mut session = session(provider.clone(), Arc::new(MemoryAnalytics::default()));
        let host = MemoryHost::new("#/");

        session.send("one", &host).await;
        session.restart(&translator());
        session.send("deux", &host).await;

        let requests = provider.requests.lock();
        assert_eq!(requests[1].history.len(), 1);
        assert_eq!(requests[1].history[0].text, "deux");
    }
}
