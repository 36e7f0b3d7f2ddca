use std::sync::Arc;

use core_types::{ContentFetcher, FetchError, Language};
use futures::future::{join_all, try_join_all};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::tree::TranslationTree;

pub const PAGE_DOCUMENTS: [&str; 9] = [
    "about",
    "blog",
    "certificates",
    "contact",
    "education",
    "experience",
    "home",
    "projects",
    "tech-stack",
];

pub const USE_CASE_INDUSTRIES: [&str; 11] = [
    "cross-industry-solutions",
    "financial-services-banking",
    "insurance",
    "manufacturing",
    "media-entertainment",
    "pharmaceuticals",
    "professional-services",
    "public-sector",
    "retail-consumer-packaged-goods",
    "telecom",
    "utilities",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load ui strings for `{language}`")]
    UiStrings {
        language: Language,
        #[source]
        source: FetchError,
    },
    #[error("failed to load page content `{page}` for `{language}`")]
    PageContent {
        page: String,
        language: Language,
        #[source]
        source: FetchError,
    },
    #[error("document `{path}` is not a json object")]
    InvalidDocument { path: String },
}

pub fn locale_path(language: Language) -> String {
    format!("i18n/locales/{}.json", language.code())
}

pub fn page_path(page: &str, language: Language) -> String {
    format!("i18n/content/{page}.{}.json", language.code())
}

pub fn use_case_path(industry: &str, language: Language) -> String {
    format!("i18n/content/use-cases/{industry}.{}.json", language.code())
}

pub fn project_path(slug: &str, language: Language) -> String {
    format!("i18n/content/projects/{slug}.{}.json", language.code())
}

pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        match chars.peek() {
            Some(next) if ch == '-' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Clone)]
pub struct ContentLoader {
    fetcher: Arc<dyn ContentFetcher>,
}

impl ContentLoader {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn load_language(&self, language: Language) -> Result<TranslationTree, LoadError> {
        let path = locale_path(language);
        let ui_strings = self
            .fetcher
            .fetch_json(&path)
            .await
            .map_err(|source| LoadError::UiStrings { language, source })?;
        let mut tree =
            TranslationTree::from_value(ui_strings).ok_or(LoadError::InvalidDocument { path })?;

        let fetcher = &self.fetcher;
        let pages = try_join_all(PAGE_DOCUMENTS.iter().map(|page| async move {
            fetcher
                .fetch_json(&page_path(page, language))
                .await
                .map(|content| (*page, content))
                .map_err(|source| LoadError::PageContent {
                    page: page.to_string(),
                    language,
                    source,
                })
        }))
        .await?;

        for (page, content) in pages {
            if page == "home" {
                tree.merge_root(content);
                continue;
            }
            let root_key = camel_case(page);
            let section = match content {
                Value::Object(mut map) => map.remove(&root_key),
                _ => None,
            };
            tree.merge_under(&root_key, section);
        }

        let catalogue = self.load_use_cases(language).await;
        let use_case_count = catalogue.len();
        tree.set_under("useCases", "catalogue", Value::Array(catalogue));

        let project_count = self.load_project_details(&mut tree, language).await;

        info!(
            language = language.code(),
            use_cases = use_case_count,
            projects = project_count,
            "content loaded"
        );
        Ok(tree)
    }

    async fn load_use_cases(&self, language: Language) -> Vec<Value> {
        let fetcher = &self.fetcher;
        let documents = join_all(USE_CASE_INDUSTRIES.iter().map(|industry| async move {
            let result = fetcher.fetch_json(&use_case_path(industry, language)).await;
            (*industry, result)
        }))
        .await;

        let mut catalogue = Vec::new();
        for (industry, result) in documents {
            match result {
                Ok(Value::Object(mut document)) => match document.remove("catalogue") {
                    Some(Value::Array(entries)) => catalogue.extend(entries),
                    _ => warn!(industry, "use-case document has no catalogue array"),
                },
                Ok(_) => warn!(industry, "use-case document is not an object"),
                Err(err) => warn!(industry, error = %err, "skipping use-case document"),
            }
        }
        catalogue
    }

    async fn load_project_details(&self, tree: &mut TranslationTree, language: Language) -> usize {
        let slugs: Vec<String> = match tree.t("projects.items") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.get("slug").and_then(Value::as_str))
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
            _ => return 0,
        };

        let fetcher = &self.fetcher;
        let results = join_all(slugs.iter().map(|slug| async move {
            let result = fetcher.fetch_json(&project_path(slug, language)).await;
            (slug, result)
        }))
        .await;

        let mut details = Map::new();
        for (slug, result) in results {
            match result {
                Ok(document) => {
                    details.insert(slug.clone(), document);
                }
                Err(err) => warn!(slug = %slug, error = %err, "skipping project detail"),
            }
        }
        let count = details.len();
        tree.set_under("projects", "details", Value::Object(details));
        count
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fixtures::content_set;
    use super::*;

    #[test]
    fn camel_cases_page_names() {
        assert_eq!(camel_case("tech-stack"), "techStack");
        assert_eq!(camel_case("about"), "about");
        assert_eq!(camel_case("use-cases"), "useCases");
    }

    #[tokio::test]
    async fn merges_pages_use_cases_and_projects() {
        let loader = ContentLoader::new(Arc::new(content_set(Language::En)));
        let tree = loader.load_language(Language::En).await.expect("tree");

        assert_eq!(tree.text("hero.title"), Some("Hello en"));
        assert_eq!(tree.text("nav.about"), Some("About-en"));
        assert_eq!(tree.text("techStack.title"), Some("tech-stack-en"));
        assert_eq!(tree.text("about.title"), Some("about-en"));
        assert_eq!(tree.items("useCases.catalogue").len(), 2);
        assert_eq!(tree.text("useCases.catalogue.0.title"), Some("Claims"));
        assert_eq!(tree.text("projects.details.alpha.title"), Some("Alpha"));
        assert_eq!(tree.t("projects.details.beta"), None);
    }

    #[tokio::test]
    async fn missing_ui_strings_fail_fast() {
        let mut fetcher = content_set(Language::Fr);
        fetcher.remove(&locale_path(Language::Fr));
        let loader = ContentLoader::new(Arc::new(fetcher));
        let err = loader.load_language(Language::Fr).await.expect_err("fails");
        assert!(matches!(err, LoadError::UiStrings { language: Language::Fr, .. }));
    }

    #[tokio::test]
    async fn missing_page_aborts_whole_load() {
        let mut fetcher = content_set(Language::En);
        fetcher.remove(&page_path("education", Language::En));
        let loader = ContentLoader::new(Arc::new(fetcher));
        let err = loader.load_language(Language::En).await.expect_err("fails");
        assert!(matches!(err, LoadError::PageContent { ref page, .. } if page.as_str() == "education"));
    }

    #[tokio::test]
    async fn broken_industry_document_contributes_nothing() {
        let mut fetcher = content_set(Language::En);
        fetcher.insert(use_case_path("telecom", Language::En), json!({"unexpected": true}));
        let loader = ContentLoader::new(Arc::new(fetcher));
        let tree = loader.load_language(Language::En).await.expect("tree");
        assert_eq!(tree.items("useCases.catalogue").len(), 1);
    }
}
