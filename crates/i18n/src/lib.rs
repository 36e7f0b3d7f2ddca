//! Per-language content: fetching, merging, lookup and the active-language
//! state machine.

mod fetch;
mod loader;
mod provider;
mod tree;

pub use fetch::{DirContentFetcher, HttpContentFetcher, StaticContentFetcher};
pub use loader::{
    ContentLoader, LoadError, PAGE_DOCUMENTS, USE_CASE_INDUSTRIES, camel_case, locale_path,
    page_path, project_path, use_case_path,
};
pub use provider::{LanguageProvider, LoadState, SwitchOutcome};
pub use tree::{TranslationTree, Translator};
