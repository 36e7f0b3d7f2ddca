use std::sync::Arc;

use anyhow::Result;
use assistant::{AssistantSession, SendOutcome};
use catalogue::CatalogueState;
use config::{PreferenceStore, SiteConfig};
use contact::{ContactForm, MailRelay};
use core_types::{
    AnalyticsEvent, AnalyticsSink, AssistantProvider, ContentFetcher, Host, Language, MemoryHost,
    Theme,
};
use i18n::{ContentLoader, LanguageProvider, SwitchOutcome};
use router::{Navigation, ResolvedPage, RouteTable, Router};
use tracing::{debug, error, info};

use crate::command::{Command, HELP};
use crate::render::{View, render};

pub struct Services {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub assistant: Option<Arc<dyn AssistantProvider>>,
    pub relay: Arc<dyn MailRelay>,
    pub preferences: PreferenceStore,
}

pub struct Shell {
    host: MemoryHost,
    languages: LanguageProvider,
    router: Router,
    analytics: Arc<dyn AnalyticsSink>,
    catalogue: Option<CatalogueState>,
    assistant: AssistantSession,
    relay: Arc<dyn MailRelay>,
    contact: ContactForm,
    preferences: PreferenceStore,
    theme: Theme,
    navigation: Option<Navigation>,
}

impl Shell {
    pub fn new(config: &SiteConfig, services: Services, fragment: &str) -> Result<Self> {
        let table = RouteTable::with_default_routes()?;
        let router = Router::new(table, config.site.clone(), services.analytics.clone());
        let languages = LanguageProvider::new(
            ContentLoader::new(services.fetcher),
            config.default_language,
        );
        let assistant = AssistantSession::new(
            services.assistant,
            config.assistant.model.clone(),
            config.site.name.clone(),
            services.analytics.clone(),
        );
        let theme = services.preferences.load_theme();

        Ok(Self {
            host: MemoryHost::new(fragment),
            languages,
            router,
            analytics: services.analytics,
            catalogue: None,
            assistant,
            relay: services.relay,
            contact: ContactForm::default(),
            preferences: services.preferences,
            theme,
            navigation: None,
        })
    }

    pub async fn start(&mut self, language: Language) -> String {
        let notice = self.load_language(language).await;
        info!(%notice, "site started");
        self.navigate()
    }

    pub async fn handle(&mut self, command: Command) -> String {
        match command {
            Command::Navigate(fragment) => {
                self.host.set_fragment(&fragment);
                self.navigate()
            }
            Command::Language(language) => {
                let notice = self.switch_language(language).await;
                format!("{notice}\n{}", self.navigate())
            }
            Command::ToggleTheme => self.toggle_theme(),
            Command::Industry(label) => self.on_catalogue(|catalogue, _| {
                catalogue.select_industry(&label);
                Ok(())
            }),
            Command::Technology(label) => self.on_catalogue(|catalogue, _| {
                catalogue.select_technology(&label);
                Ok(())
            }),
            Command::Search(term) => self.on_catalogue(|catalogue, _| {
                catalogue.search(&term);
                Ok(())
            }),
            Command::Open(id) => {
                self.on_catalogue(|catalogue, host| catalogue.open_detail(id, host))
            }
            Command::Close => self.on_catalogue(|catalogue, host| {
                catalogue.close_detail(host);
                Ok(())
            }),
            Command::Share(id) => self.share(id),
            Command::Ask(text) => self.ask(&text).await,
            Command::Contact(message) => {
                self.contact.message = message;
                if let Err(err) = self
                    .contact
                    .submit(self.relay.as_ref(), self.analytics.as_ref())
                    .await
                {
                    debug!(error = %err, "contact form not sent");
                }
                self.contact
                    .status_text(&self.languages.translator())
                    .unwrap_or_default()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn navigate(&mut self) -> String {
        let translator = self.languages.translator();
        let navigation = self.router.handle_fragment_change(&self.host, &translator);
        self.router
            .publish_detail_meta(&self.host, &navigation, &translator);

        if navigation.page == ResolvedPage::UseCases {
            let analytics = &self.analytics;
            let catalogue = self
                .catalogue
                .get_or_insert_with(|| CatalogueState::from_tree(translator.tree(), analytics.clone()));
            catalogue.sync_from_fragment(&self.host);
        } else if let Some(catalogue) = self.catalogue.take() {
            if catalogue.selected().is_some() {
                self.host.set_body_scroll_locked(false);
            }
        }

        self.navigation = Some(navigation);
        self.render()
    }

    fn render(&self) -> String {
        let Some(navigation) = &self.navigation else {
            return String::new();
        };
        let translator = self.languages.translator();
        let document = self.host.document();
        render(&View {
            state: self.languages.state(),
            theme: self.theme,
            translator: &translator,
            navigation,
            document: &document,
            catalogue: self.catalogue.as_ref(),
            contact: &self.contact,
        })
    }

    async fn load_language(&self, language: Language) -> String {
        match self.languages.set_language(language).await {
            SwitchOutcome::Loaded(language) => format!("language: {language}"),
            SwitchOutcome::FellBack { requested, active } => {
                format!("`{requested}` is unavailable, showing `{active}`")
            }
            SwitchOutcome::Failed { requested } => format!("`{requested}` could not be loaded"),
            SwitchOutcome::Superseded { requested } => {
                format!("switch to `{requested}` was superseded")
            }
        }
    }

    async fn switch_language(&mut self, language: Language) -> String {
        self.analytics.track(
            AnalyticsEvent::custom("language_switch").with("language", language.code()),
        );
        let notice = self.load_language(language).await;

        let translator = self.languages.translator();
        if let Some(catalogue) = self.catalogue.as_mut() {
            let had_selection = catalogue.selected().is_some();
            catalogue.reload_from_tree(translator.tree());
            if had_selection && catalogue.selected().is_none() {
                self.host.set_body_scroll_locked(false);
            }
        }
        if self.assistant.is_open() {
            self.assistant.restart(&translator);
        }
        notice
    }

    fn toggle_theme(&mut self) -> String {
        self.theme = self.theme.toggled();
        if let Err(err) = self.preferences.save_theme(self.theme) {
            error!(error = %err, "failed to persist theme");
        }
        format!("theme: {}", self.theme.as_str())
    }

    fn on_catalogue(
        &mut self,
        action: impl FnOnce(&mut CatalogueState, &MemoryHost) -> Result<(), catalogue::CatalogueError>,
    ) -> String {
        let Some(catalogue) = self.catalogue.as_mut() else {
            return "open the use case catalogue first (#/use-cases)".to_string();
        };
        match action(catalogue, &self.host) {
            Ok(()) => self.render(),
            Err(err) => err.to_string(),
        }
    }

    fn share(&self, id: u32) -> String {
        let Some(catalogue) = self.catalogue.as_ref() else {
            return "open the use case catalogue first (#/use-cases)".to_string();
        };
        catalogue
            .share_link(id, &self.router.site().url)
            .unwrap_or_else(|err| err.to_string())
    }

    async fn ask(&mut self, text: &str) -> String {
        let translator = self.languages.translator();
        self.assistant.open(&translator);
        if !self.assistant.is_available() {
            return "the assistant is not configured".to_string();
        }

        let outcome = self.assistant.send(text, &self.host).await;
        let reply = self
            .assistant
            .transcript()
            .last()
            .map(|message| message.text.clone())
            .unwrap_or_default();
        match outcome {
            SendOutcome::ToolDispatched(call) if call.target_fragment().is_some() => {
                format!("{reply}\n{}", self.navigate())
            }
            _ => reply,
        }
    }
}
