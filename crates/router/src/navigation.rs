use std::sync::Arc;

use core_types::{AnalyticsEvent, AnalyticsSink, DocumentMeta, Host, SiteIdentity};
use i18n::Translator;
use tracing::debug;

use crate::fragment::Fragment;
use crate::meta::{blog_post_meta, derive_page_meta, project_meta};
use crate::route::{ResolvedPage, RouteTable};

#[derive(Debug, Clone)]
pub struct Navigation {
    pub fragment: Fragment,
    pub page: ResolvedPage,
    pub route_key: Option<String>,
    pub meta: Option<DocumentMeta>,
}

pub struct Router {
    table: RouteTable,
    site: SiteIdentity,
    analytics: Arc<dyn AnalyticsSink>,
}

impl Router {
    pub fn new(table: RouteTable, site: SiteIdentity, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            table,
            site,
            analytics,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn site(&self) -> &SiteIdentity {
        &self.site
    }

    pub fn handle_fragment_change(&self, host: &dyn Host, translator: &Translator) -> Navigation {
        let fragment = Fragment::parse(&host.fragment());
        let matched = self.table.match_route(fragment.path());
        let page = matched
            .as_ref()
            .map_or(ResolvedPage::NotFound, |matched| matched.resolve());
        let route_key = matched.as_ref().map(|matched| matched.route.key.clone());

        host.scroll_to_top();

        let meta = derive_page_meta(matched.as_ref(), &fragment, translator, &self.site);
        if let Some(meta) = &meta {
            self.publish(host, &fragment, meta);
        }

        debug!(
            fragment = fragment.raw(),
            route = route_key.as_deref().unwrap_or("not_found"),
            "navigation handled"
        );

        Navigation {
            fragment,
            page,
            route_key,
            meta,
        }
    }

    pub fn publish_detail_meta(
        &self,
        host: &dyn Host,
        navigation: &Navigation,
        translator: &Translator,
    ) -> Option<DocumentMeta> {
        let meta = match &navigation.page {
            ResolvedPage::ProjectDetail { slug } => {
                project_meta(slug, &navigation.fragment, translator, &self.site)
            }
            ResolvedPage::BlogPost { slug } => {
                blog_post_meta(slug, &navigation.fragment, translator, &self.site)
            }
            _ => return None,
        };
        self.publish(host, &navigation.fragment, &meta);
        Some(meta)
    }

    fn publish(&self, host: &dyn Host, fragment: &Fragment, meta: &DocumentMeta) {
        host.apply_document(meta);
        if let Some(title) = &meta.title {
            self.analytics
                .track(AnalyticsEvent::page_view(fragment.raw(), title.clone()));
        }
    }
}
