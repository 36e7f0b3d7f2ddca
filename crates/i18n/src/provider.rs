use std::sync::Arc;

use core_types::Language;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::loader::ContentLoader;
use crate::tree::{TranslationTree, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading(Language),
    FallingBack {
        requested: Language,
        fallback: Language,
    },
    Loaded(Language),
    Failed(Language),
}

impl LoadState {
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            LoadState::Idle | LoadState::Loading(_) | LoadState::FallingBack { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Loaded(Language),
    FellBack {
        requested: Language,
        active: Language,
    },
    Failed {
        requested: Language,
    },
    /// A newer switch started before this one finished; its result was dropped.
    Superseded {
        requested: Language,
    },
}

struct Inner {
    generation: u64,
    state: LoadState,
    language: Language,
    tree: Arc<TranslationTree>,
}

/// Owns the active language and its tree. Trees are swapped whole, so a
/// reader holding a snapshot never observes a partially merged tree.
pub struct LanguageProvider {
    loader: ContentLoader,
    default_language: Language,
    inner: RwLock<Inner>,
}

impl LanguageProvider {
    pub fn new(loader: ContentLoader, default_language: Language) -> Self {
        Self {
            loader,
            default_language,
            inner: RwLock::new(Inner {
                generation: 0,
                state: LoadState::Idle,
                language: default_language,
                tree: Arc::new(TranslationTree::empty()),
            }),
        }
    }

    pub fn state(&self) -> LoadState {
        self.inner.read().state
    }

    pub fn language(&self) -> Language {
        self.inner.read().language
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn snapshot(&self) -> Arc<TranslationTree> {
        self.inner.read().tree.clone()
    }

    pub fn translator(&self) -> Translator {
        let inner = self.inner.read();
        Translator::new(inner.language, inner.tree.clone())
    }

    /// Loads `requested`, falling back to the default language once. A call
    /// made while this one is in flight supersedes it: the older result is
    /// dropped and neither the tree nor the state changes.
    pub async fn set_language(&self, requested: Language) -> SwitchOutcome {
        let generation = {
            let mut inner = self.inner.write();
            inner.generation += 1;
            inner.state = LoadState::Loading(requested);
            inner.generation
        };

        match self.loader.load_language(requested).await {
            Ok(tree) => {
                return if self.commit(generation, Some(requested), tree, LoadState::Loaded(requested)) {
                    SwitchOutcome::Loaded(requested)
                } else {
                    SwitchOutcome::Superseded { requested }
                };
            }
            Err(err) => warn!(language = requested.code(), error = %err, "language load failed"),
        }

        let fallback = self.default_language;
        if requested == fallback {
            return self.fail(generation, requested);
        }

        if !self.transition(generation, LoadState::FallingBack { requested, fallback }) {
            return SwitchOutcome::Superseded { requested };
        }
        info!(
            requested = requested.code(),
            fallback = fallback.code(),
            "falling back to default language"
        );

        match self.loader.load_language(fallback).await {
            Ok(tree) => {
                if self.commit(generation, Some(fallback), tree, LoadState::Loaded(fallback)) {
                    SwitchOutcome::FellBack {
                        requested,
                        active: fallback,
                    }
                } else {
                    SwitchOutcome::Superseded { requested }
                }
            }
            Err(err) => {
                warn!(language = fallback.code(), error = %err, "fallback language load failed");
                self.fail(generation, requested)
            }
        }
    }

    fn fail(&self, generation: u64, requested: Language) -> SwitchOutcome {
        if self.commit(
            generation,
            None,
            TranslationTree::empty(),
            LoadState::Failed(requested),
        ) {
            SwitchOutcome::Failed { requested }
        } else {
            SwitchOutcome::Superseded { requested }
        }
    }

    fn transition(&self, generation: u64, state: LoadState) -> bool {
        let mut inner = self.inner.write();
        if inner.generation != generation {
            return false;
        }
        inner.state = state;
        true
    }

    fn commit(
        &self,
        generation: u64,
        language: Option<Language>,
        tree: TranslationTree,
        state: LoadState,
    ) -> bool {
        let mut inner = self.inner.write();
        if inner.generation != generation {
            return false;
        }
        inner.tree = Arc::new(tree);
        inner.state = state;
        if let Some(language) = language {
            inner.language = language;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use core_types::{ContentFetcher, FetchError};
    use serde_json::Value;
    use tokio::sync::{Notify, Semaphore};

    use super::*;
    use crate::fetch::StaticContentFetcher;
    use crate::loader::fixtures::{add_content, content_set};
    use crate::loader::locale_path;

    fn provider_for(fetcher: StaticContentFetcher) -> (LanguageProvider, ContentLoader) {
        let loader = ContentLoader::new(Arc::new(fetcher));
        (LanguageProvider::new(loader.clone(), Language::En), loader)
    }

    fn bilingual() -> StaticContentFetcher {
        let mut fetcher = content_set(Language::En);
        add_content(&mut fetcher, Language::Fr);
        fetcher
    }

    #[tokio::test]
    async fn loads_requested_language() {
        let (provider, _) = provider_for(bilingual());
        assert_eq!(provider.state(), LoadState::Idle);
        assert_eq!(provider.set_language(Language::Fr).await, SwitchOutcome::Loaded(Language::Fr));
        assert_eq!(provider.language(), Language::Fr);
        assert_eq!(provider.translator().text("hero.title"), Some("Hello fr"));
    }

    #[tokio::test]
    async fn falls_back_to_default_when_ui_strings_are_missing() {
        let (provider, loader) = provider_for(content_set(Language::En));
        let outcome = provider.set_language(Language::Fr).await;
        assert_eq!(
            outcome,
            SwitchOutcome::FellBack {
                requested: Language::Fr,
                active: Language::En
            }
        );
        assert_eq!(provider.language(), Language::En);
        assert_eq!(provider.state(), LoadState::Loaded(Language::En));
        let expected = loader.load_language(Language::En).await.expect("en tree");
        assert_eq!(*provider.snapshot(), expected);
    }

    #[tokio::test]
    async fn enters_failed_when_default_also_fails() {
        let (provider, _) = provider_for(StaticContentFetcher::new());
        let outcome = provider.set_language(Language::Fr).await;
        assert_eq!(outcome, SwitchOutcome::Failed { requested: Language::Fr });
        assert_eq!(provider.state(), LoadState::Failed(Language::Fr));
        assert!(!provider.state().is_pending());
        assert!(provider.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failing_default_does_not_retry() {
        let mut fetcher = content_set(Language::En);
        fetcher.remove(&locale_path(Language::En));
        let (provider, _) = provider_for(fetcher);
        let outcome = provider.set_language(Language::En).await;
        assert_eq!(outcome, SwitchOutcome::Failed { requested: Language::En });
    }

    struct GatedFetcher {
        inner: StaticContentFetcher,
        gated_path: String,
        started: Notify,
        gate: Semaphore,
    }

    #[async_trait]
    impl ContentFetcher for GatedFetcher {
        async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
            if path == self.gated_path {
                self.started.notify_one();
                let _permit = self.gate.acquire().await.map_err(|err| FetchError::Transport {
                    path: path.to_string(),
                    message: err.to_string(),
                })?;
            }
            self.inner.fetch_json(path).await
        }
    }

    #[tokio::test]
    async fn stale_load_is_superseded_by_newer_switch() {
        let fetcher = Arc::new(GatedFetcher {
            inner: bilingual(),
            gated_path: locale_path(Language::Fr),
            started: Notify::new(),
            gate: Semaphore::new(0),
        });
        let provider = Arc::new(LanguageProvider::new(
            ContentLoader::new(fetcher.clone()),
            Language::En,
        ));

        let slow = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.set_language(Language::Fr).await })
        };
        fetcher.started.notified().await;

        assert_eq!(provider.set_language(Language::En).await, SwitchOutcome::Loaded(Language::En));
        fetcher.gate.add_permits(1);

        let outcome = slow.await.expect("join");
        assert_eq!(outcome, SwitchOutcome::Superseded { requested: Language::Fr });
        assert_eq!(provider.language(), Language::En);
        assert_eq!(provider.snapshot().text("hero.title"), Some("Hello en"));
    }
}
