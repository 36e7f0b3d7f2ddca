use std::sync::Arc;

use core_types::{AnalyticsEvent, AnalyticsSink, ElementId, Host, UseCase};
use i18n::TranslationTree;
use indexmap::IndexMap;
use router::Fragment;
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::{industries, industry_counts, technology_counts};
use crate::deep_link::{append_detail_token, detail_token, parse_detail_token, strip_detail_token};
use crate::filter::{
    ALL_INDUSTRIES, ALL_TECHNOLOGIES, CatalogueFilter, IndustryFilter, KNOWN_TECHNOLOGIES,
    TechnologyFilter,
};

pub const CATALOGUE_KEY: &str = "useCases.catalogue";
pub const CATALOGUE_FRAGMENT_PREFIX: &str = "#/use-cases";
pub const DETAIL_CONTAINER: &str = "use-case-detail";
const SEARCH_TRACKING_MIN_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("use case {0} is not in the catalogue")]
    UnknownUseCase(u32),
}

pub struct CatalogueState {
    use_cases: Vec<UseCase>,
    filter: CatalogueFilter,
    selected: Option<u32>,
    trigger: Option<ElementId>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl CatalogueState {
    pub fn new(use_cases: Vec<UseCase>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            use_cases,
            filter: CatalogueFilter::default(),
            selected: None,
            trigger: None,
            analytics,
        }
    }

    pub fn from_tree(tree: &TranslationTree, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self::new(parse_catalogue(tree), analytics)
    }

    pub fn reload_from_tree(&mut self, tree: &TranslationTree) {
        self.use_cases = parse_catalogue(tree);
        if self.selected.is_some_and(|id| self.find(id).is_none()) {
            self.selected = None;
        }
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    pub fn filter(&self) -> &CatalogueFilter {
        &self.filter
    }

    pub fn visible(&self) -> Vec<&UseCase> {
        self.filter.apply(&self.use_cases)
    }

    pub fn industry_counts(&self) -> IndexMap<String, usize> {
        industry_counts(&self.use_cases)
    }

    pub fn technology_counts(&self) -> IndexMap<String, usize> {
        technology_counts(&self.use_cases)
    }

    pub fn industries(&self) -> Vec<String> {
        industries(&self.use_cases)
    }

    pub fn selected(&self) -> Option<&UseCase> {
        let id = self.selected?;
        self.find(id)
    }

    pub fn select_industry(&mut self, label: &str) {
        self.filter.industry = IndustryFilter::from_label(label);
        self.track_filter("industry", label);
    }

    pub fn select_technology(&mut self, label: &str) {
        self.filter.technology = TechnologyFilter::from_label(label);
        self.track_filter("technology", label);
    }

    pub fn search(&mut self, term: &str) {
        self.filter.search = term.to_string();
        if term.chars().count() >= SEARCH_TRACKING_MIN_LEN {
            self.analytics.track(
                AnalyticsEvent::custom("search_use_case").with("search_term", term),
            );
        }
    }

    pub fn sync_from_fragment(&mut self, host: &dyn Host) {
        let raw = host.fragment();
        if !raw.starts_with(CATALOGUE_FRAGMENT_PREFIX) {
            return;
        }

        if let Some(id) = parse_detail_token(&raw) {
            if self.find(id).is_some() {
                if self.selected != Some(id) {
                    self.show_detail(id, host);
                }
            } else {
                debug!(id, "deep link names an unknown use case");
            }
        }

        let fragment = Fragment::parse(&raw);
        if let Some(industry) = fragment.query_param("industry") {
            if industry == ALL_INDUSTRIES || self.industries().iter().any(|known| known == industry) {
                self.filter.industry = IndustryFilter::from_label(industry);
            }
        }
        if let Some(technology) = fragment.query_param("technology") {
            if technology == ALL_TECHNOLOGIES || KNOWN_TECHNOLOGIES.contains(&technology) {
                self.filter.technology = TechnologyFilter::from_label(technology);
            }
        }
    }

    pub fn open_detail(&mut self, id: u32, host: &dyn Host) -> Result<(), CatalogueError> {
        let title = self
            .find(id)
            .map(|use_case| use_case.title.clone())
            .ok_or(CatalogueError::UnknownUseCase(id))?;

        self.show_detail(id, host);
        self.analytics.track(
            AnalyticsEvent::custom("view_use_case")
                .with("use_case_id", id)
                .with("use_case_title", title),
        );
        host.set_fragment(&append_detail_token(&host.fragment(), id));
        Ok(())
    }

    pub fn close_detail(&mut self, host: &dyn Host) {
        if self.selected.take().is_none() {
            return;
        }
        host.set_body_scroll_locked(false);
        if let Some(trigger) = self.trigger.take() {
            host.focus(&trigger);
        }
        let current = host.fragment();
        let stripped = strip_detail_token(&current);
        if stripped != current {
            host.set_fragment(&stripped);
        }
    }

    pub fn share_link(&self, id: u32, site_url: &str) -> Result<String, CatalogueError> {
        if self.find(id).is_none() {
            return Err(CatalogueError::UnknownUseCase(id));
        }
        self.analytics
            .track(AnalyticsEvent::custom("share_use_case").with("use_case_id", id));
        Ok(format!(
            "{}/{CATALOGUE_FRAGMENT_PREFIX}#{}",
            site_url.trim_end_matches('/'),
            detail_token(id)
        ))
    }

    fn show_detail(&mut self, id: u32, host: &dyn Host) {
        if self.selected.is_none() {
            self.trigger = host.active_element();
        }
        self.selected = Some(id);
        host.set_body_scroll_locked(true);
        host.focus_first_within(&ElementId::new(DETAIL_CONTAINER));
    }

    fn find(&self, id: u32) -> Option<&UseCase> {
        self.use_cases.iter().find(|use_case| use_case.id == id)
    }

    fn track_filter(&self, filter_type: &str, value: &str) {
        self.analytics.track(
            AnalyticsEvent::custom("filter_use_case")
                .with("filter_type", filter_type)
                .with("filter_value", value),
        );
    }
}

fn parse_catalogue(tree: &TranslationTree) -> Vec<UseCase> {
    tree.items(CATALOGUE_KEY)
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<UseCase>(entry.clone()) {
                Ok(use_case) => Some(use_case),
                Err(err) => {
                    warn!(index, error = %err, "skipping malformed use case");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use core_types::{MemoryAnalytics, MemoryHost};
    use serde_json::json;

    use super::*;
    use crate::test_support::use_cases;

    fn state(analytics: Arc<MemoryAnalytics>) -> CatalogueState {
        CatalogueState::new(use_cases(), analytics)
    }

    fn host(fragment: &str) -> MemoryHost {
        let host = MemoryHost::new(fragment);
        host.register_focusable(
            ElementId::new(DETAIL_CONTAINER),
            ElementId::new("detail-close"),
        );
        host.focus(&ElementId::new("card-7"));
        host
    }

    #[test]
    fn from_tree_skips_malformed_entries() {
        let tree = TranslationTree::from_value(json!({
            "useCases": {"catalogue": [
                {"id": 1, "title": "Claims", "industry": "Insurance",
                 "technology": "Copilot Studio", "miniDescription": "Answers claims"},
                {"title": "missing id"}
            ]}
        }))
        .expect("tree");
        let state = CatalogueState::from_tree(&tree, Arc::new(MemoryAnalytics::default()));
        assert_eq!(state.use_cases().len(), 1);
        assert_eq!(state.use_cases()[0].title, "Claims");
    }

    #[test]
    fn reload_keeps_filters_and_drops_missing_selection() {
        let mut state = state(Arc::new(MemoryAnalytics::default()));
        let host = host("#/use-cases");
        state.select_industry("Insurance");
        state.open_detail(5, &host).expect("open");

        let tree = TranslationTree::from_value(json!({
            "useCases": {"catalogue": [
                {"id": 1, "title": "Sinistres", "industry": "Insurance",
                 "technology": "Copilot Studio", "miniDescription": "Répond"}
            ]}
        }))
        .expect("tree");
        state.reload_from_tree(&tree);
        assert_eq!(state.filter().industry, IndustryFilter::Only("Insurance".into()));
        assert!(state.selected().is_none());
        assert_eq!(state.visible()[0].title, "Sinistres");
    }

    #[test]
    fn industry_filter_leaves_counts_unchanged() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut state = state(analytics.clone());
        let before = state.industry_counts();

        state.select_industry("Insurance");
        let visible: Vec<u32> = state.visible().iter().map(|uc| uc.id).collect();
        assert_eq!(visible, vec![1, 5]);
        assert!(state.visible().iter().all(|uc| uc.industry == "Insurance"));
        assert_eq!(state.industry_counts(), before);
        assert_eq!(analytics.count("filter_use_case"), 1);

        state.select_industry(ALL_INDUSTRIES);
        assert_eq!(state.visible().len(), 5);
    }

    #[test]
    fn short_searches_are_not_tracked() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut state = state(analytics.clone());
        state.search("cl");
        state.search("claim");
        assert_eq!(analytics.count("search_use_case"), 1);
        assert_eq!(state.visible().len(), 1);
    }

    #[test]
    fn opening_and_closing_round_trips_the_fragment() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut state = state(analytics.clone());
        let mut cases = use_cases();
        cases.push(UseCase {
            id: 7,
            ..cases[0].clone()
        });
        state.use_cases = cases;

        let host = host("#/use-cases?industry=Insurance");
        state.open_detail(7, &host).expect("open");
        assert_eq!(host.fragment(), "#/use-cases?industry=Insurance#uc07");
        assert!(host.body_scroll_locked());
        assert_eq!(host.focused(), Some(ElementId::new("detail-close")));
        assert_eq!(state.selected().map(|uc| uc.id), Some(7));
        assert_eq!(analytics.count("view_use_case"), 1);

        state.close_detail(&host);
        assert_eq!(host.fragment(), "#/use-cases?industry=Insurance");
        assert!(!host.body_scroll_locked());
        assert_eq!(host.focused(), Some(ElementId::new("card-7")));
        assert!(state.selected().is_none());
    }

    #[test]
    fn inbound_deep_link_opens_without_tracking() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut state = state(analytics.clone());
        let host = host("#/use-cases?industry=Telecom&technology=Power+Automate#uc02");

        state.sync_from_fragment(&host);
        assert_eq!(state.selected().map(|uc| uc.id), Some(2));
        assert_eq!(analytics.count("view_use_case"), 0);
        assert_eq!(state.filter().industry, IndustryFilter::Only("Telecom".into()));
        assert_eq!(
            state.filter().technology,
            TechnologyFilter::Only("Power Automate".into())
        );
        assert_eq!(host.history().len(), 1);
    }

    #[test]
    fn inbound_unknown_values_are_ignored() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let mut state = state(analytics);
        let host = host("#/use-cases?industry=Mining&technology=Excel#uc99");
        state.sync_from_fragment(&host);
        assert!(state.selected().is_none());
        assert_eq!(state.filter(), &CatalogueFilter::default());

        let elsewhere = MemoryHost::new("#/about?industry=Telecom#uc01");
        state.sync_from_fragment(&elsewhere);
        assert!(state.selected().is_none());
        assert_eq!(state.filter(), &CatalogueFilter::default());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut state = state(Arc::new(MemoryAnalytics::default()));
        let host = host("#/use-cases");
        assert_eq!(
            state.open_detail(404, &host),
            Err(CatalogueError::UnknownUseCase(404))
        );
        assert_eq!(host.fragment(), "#/use-cases");
        assert!(!host.body_scroll_locked());
    }

    #[test]
    fn share_link_points_at_detail() {
        let analytics = Arc::new(MemoryAnalytics::default());
        let state = state(analytics.clone());
        let link = state.share_link(3, "https://folio.example/").expect("link");
        assert_eq!(link, "https://folio.example/#/use-cases#uc03");
        assert_eq!(analytics.count("share_use_case"), 1);
    }
}
