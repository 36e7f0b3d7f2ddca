use async_trait::async_trait;
use core_types::{AnalyticsEvent, AnalyticsSink};
use i18n::Translator;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map_or(Ok(()), |(field, _)| Err(ContactError::Invalid { field }))
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact field `{field}` is empty")]
    Invalid { field: &'static str },
    #[error("mail relay answered {status}")]
    Status { status: u16 },
    #[error("mail relay unreachable: {message}")]
    Transport { message: String },
}

/// Delivers one contact message. A single attempt, no retries.
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError>;
}

pub struct HttpMailRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailRelay for HttpMailRelay {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(message)
            .send()
            .await
            .map_err(|err| ContactError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContactError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContactStatus {
    #[default]
    Idle,
    Invalid,
    Sending,
    Sent,
    Failed,
}

impl ContactStatus {
    pub fn status_key(self) -> Option<&'static str> {
        match self {
            ContactStatus::Idle => None,
            ContactStatus::Invalid => Some("contact.status.error"),
            ContactStatus::Sending => Some("contact.status.sending"),
            ContactStatus::Sent => Some("contact.status.success"),
            ContactStatus::Failed => Some("contact.status.apiError"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ContactForm {
    pub message: ContactMessage,
    status: ContactStatus,
}

impl ContactForm {
    pub fn new(message: ContactMessage) -> Self {
        Self {
            message,
            status: ContactStatus::Idle,
        }
    }

    pub fn status(&self) -> ContactStatus {
        self.status
    }

    pub fn status_text(&self, translator: &Translator) -> Option<String> {
        let key = self.status.status_key()?;
        Some(translator.text(key).unwrap_or(key).to_string())
    }

    pub fn is_sending(&self) -> bool {
        self.status == ContactStatus::Sending
    }

    pub fn clear_status(&mut self) {
        if !self.is_sending() {
            self.status = ContactStatus::Idle;
        }
    }

    pub async fn submit(
        &mut self,
        relay: &dyn MailRelay,
        analytics: &dyn AnalyticsSink,
    ) -> Result<(), ContactError> {
        if let Err(err) = self.message.validate() {
            self.status = ContactStatus::Invalid;
            return Err(err);
        }

        self.status = ContactStatus::Sending;
        analytics.track(AnalyticsEvent::custom("contact_form_submit"));

        match relay.deliver(&self.message).await {
            Ok(()) => {
                info!("contact message delivered");
                self.status = ContactStatus::Sent;
                self.message = ContactMessage::default();
                analytics.track(AnalyticsEvent::custom("contact_form_success"));
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "contact message failed");
                self.status = ContactStatus::Failed;
                analytics.track(
                    AnalyticsEvent::custom("contact_form_error")
                        .with("error_message", err.to_string()),
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core_types::MemoryAnalytics;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingRelay {
        delivered: Mutex<Vec<ContactMessage>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl MailRelay for RecordingRelay {
        async fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError> {
            self.delivered.lock().push(message.clone());
            match self.fail_with {
                Some(status) => Err(ContactError::Status { status }),
                None => Ok(()),
            }
        }
    }

    fn filled() -> ContactForm {
        ContactForm::new(ContactMessage::new("Ada", "ada@example.com", "Hello"))
    }

    #[test]
    fn validation_reports_first_empty_field() {
        let message = ContactMessage::new("Ada", " ", "");
        assert!(matches!(
            message.validate(),
            Err(ContactError::Invalid { field: "email" })
        ));
    }

    #[tokio::test]
    async fn empty_fields_never_reach_the_relay() {
        let relay = RecordingRelay::default();
        let analytics = MemoryAnalytics::default();
        let mut form = ContactForm::new(ContactMessage::new("Ada", "", "Hi"));

        assert!(form.submit(&relay, &analytics).await.is_err());
        assert_eq!(form.status(), ContactStatus::Invalid);
        assert_eq!(form.status().status_key(), Some("contact.status.error"));
        assert!(relay.delivered.lock().is_empty());
        assert!(analytics.events().is_empty());
    }

    #[tokio::test]
    async fn success_clears_fields() {
        let relay = RecordingRelay::default();
        let analytics = MemoryAnalytics::default();
        let mut form = filled();

        form.submit(&relay, &analytics).await.expect("sent");
        assert_eq!(form.status(), ContactStatus::Sent);
        assert_eq!(form.message, ContactMessage::default());
        assert_eq!(relay.delivered.lock()[0].email, "ada@example.com");
        assert_eq!(analytics.count("contact_form_submit"), 1);
        assert_eq!(analytics.count("contact_form_success"), 1);
    }

    #[tokio::test]
    async fn failure_keeps_fields_and_reports_api_error() {
        let relay = RecordingRelay {
            fail_with: Some(502),
            ..RecordingRelay::default()
        };
        let analytics = MemoryAnalytics::default();
        let mut form = filled();

        let err = form.submit(&relay, &analytics).await.expect_err("fails");
        assert!(matches!(err, ContactError::Status { status: 502 }));
        assert_eq!(form.status().status_key(), Some("contact.status.apiError"));
        assert_eq!(form.message.name, "Ada");
        assert_eq!(analytics.count("contact_form_error"), 1);

        form.clear_status();
        assert_eq!(form.status(), ContactStatus::Idle);
    }
}
