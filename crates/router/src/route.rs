use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Experience,
    Education,
    Certificates,
    UseCases,
    Blog,
    BlogPost,
    Projects,
    ProjectDetail,
    TechStack,
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPage {
    Home,
    About,
    Experience,
    Education,
    Certificates,
    UseCases,
    Blog,
    BlogPost { slug: String },
    Projects,
    ProjectDetail { slug: String },
    TechStack,
    Contact,
    NotFound,
}

impl ResolvedPage {
    pub fn owns_metadata(&self) -> bool {
        matches!(
            self,
            ResolvedPage::BlogPost { .. } | ResolvedPage::ProjectDetail { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub path: String,
    pub page: Page,
    pub key: String,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, page: Page, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub route: &'a RouteConfig,
    pub params: BTreeMap<String, String>,
}

impl MatchResult<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn resolve(&self) -> ResolvedPage {
        let slug = || self.param("slug").unwrap_or_default().to_string();
        match self.route.page {
            Page::Home => ResolvedPage::Home,
            Page::About => ResolvedPage::About,
            Page::Experience => ResolvedPage::Experience,
            Page::Education => ResolvedPage::Education,
            Page::Certificates => ResolvedPage::Certificates,
            Page::UseCases => ResolvedPage::UseCases,
            Page::Blog => ResolvedPage::Blog,
            Page::BlogPost => ResolvedPage::BlogPost { slug: slug() },
            Page::Projects => ResolvedPage::Projects,
            Page::ProjectDetail => ResolvedPage::ProjectDetail { slug: slug() },
            Page::TechStack => ResolvedPage::TechStack,
            Page::Contact => ResolvedPage::Contact,
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("route `{path}` has an empty parameter name")]
    EmptyParameter { path: String },
    #[error("route `{path}` repeats parameter `{name}`")]
    DuplicateParameter { path: String, name: String },
    #[error("route `{path}` does not compile")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug)]
struct CompiledRoute {
    config: RouteConfig,
    matcher: Regex,
    params: Vec<String>,
}

// Ordered route table. The first pattern that matches wins, so overlapping
// patterns must be declared most specific first.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteConfig>) -> Result<Self, RouterError> {
        let routes = routes
            .into_iter()
            .map(|config| {
                let (matcher, params) = compile_pattern(&config.path)?;
                Ok(CompiledRoute {
                    config,
                    matcher,
                    params,
                })
            })
            .collect::<Result<Vec<_>, RouterError>>()?;
        Ok(Self { routes })
    }

    pub fn with_default_routes() -> Result<Self, RouterError> {
        Self::new(default_routes())
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteConfig> {
        self.routes.iter().map(|route| &route.config)
    }

    // `path` must already be stripped of any `?query` suffix.
    pub fn match_route(&self, path: &str) -> Option<MatchResult<'_>> {
        self.routes.iter().find_map(|route| {
            let captures = route.matcher.captures(path)?;
            let params = route
                .params
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| Some((name.clone(), value?.as_str().to_string())))
                .collect();
            Some(MatchResult {
                route: &route.config,
                params,
            })
        })
    }
}

pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("/", Page::Home, "home"),
        RouteConfig::new("/about", Page::About, "about"),
        RouteConfig::new("/experience", Page::Experience, "experience"),
        RouteConfig::new("/education", Page::Education, "education"),
        RouteConfig::new("/certificates", Page::Certificates, "certificates"),
        RouteConfig::new("/use-cases", Page::UseCases, "useCases"),
        RouteConfig::new("/blog", Page::Blog, "blog"),
        RouteConfig::new("/blog/:slug", Page::BlogPost, "blogPost"),
        RouteConfig::new("/projects", Page::Projects, "projects"),
        RouteConfig::new("/projects/:slug", Page::ProjectDetail, "projectDetail"),
        RouteConfig::new("/tech-stack", Page::TechStack, "techStack"),
        RouteConfig::new("/contact", Page::Contact, "contact"),
    ]
}

fn compile_pattern(path: &str) -> Result<(Regex, Vec<String>), RouterError> {
    let mut params = Vec::new();
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment.strip_prefix(':') {
            Some(name) => {
                if name.is_empty() {
                    return Err(RouterError::EmptyParameter {
                        path: path.to_string(),
                    });
                }
                if params.iter().any(|existing| existing == name) {
                    return Err(RouterError::DuplicateParameter {
                        path: path.to_string(),
                        name: name.to_string(),
                    });
                }
                params.push(name.to_string());
                segments.push(r"([^\s/]+)".to_string());
            }
            None => segments.push(regex::escape(segment)),
        }
    }

    let pattern = format!("^{}$", segments.join("/"));
    let matcher = Regex::new(&pattern).map_err(|source| RouterError::Pattern {
        path: path.to_string(),
        source,
    })?;
    Ok((matcher, params))
}
