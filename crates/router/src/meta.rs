use core_types::{DocumentMeta, SiteIdentity};
use i18n::{TranslationTree, Translator};
use serde_json::{Value, json};

use crate::breadcrumbs::{derive_breadcrumbs, find_blog_post, find_project};
use crate::fragment::Fragment;
use crate::route::{MatchResult, ResolvedPage};

pub const NOT_FOUND_KEY: &str = "notFound";
const SCHEMA_CONTEXT: &str = "https://schema.org";

pub fn derive_page_meta(
    matched: Option<&MatchResult<'_>>,
    fragment: &Fragment,
    translator: &Translator,
    site: &SiteIdentity,
) -> Option<DocumentMeta> {
    if matched.is_some_and(|matched| matched.resolve().owns_metadata()) {
        return None;
    }

    let key = matched.map_or(NOT_FOUND_KEY, |matched| matched.route.key.as_str());
    let title = translator.text(&format!("seo.{key}.title")).map(str::to_string);
    let description = translator
        .text(&format!("seo.{key}.description"))
        .map(str::to_string);

    let structured_data = matched.map(|matched| {
        if matched.route.key == "home" {
            website_schema(site, translator)
        } else {
            webpage_schema(
                title.as_deref().unwrap_or(&site.name),
                description.as_deref(),
                &site.canonical_url(fragment.raw()),
            )
        }
    });

    let breadcrumbs = match matched {
        Some(_) => derive_breadcrumbs(fragment.path(), translator.tree()),
        None => Vec::new(),
    };

    Some(DocumentMeta {
        title,
        description,
        structured_data,
        breadcrumbs,
    })
}

pub fn project_meta(
    slug: &str,
    fragment: &Fragment,
    translator: &Translator,
    site: &SiteIdentity,
) -> DocumentMeta {
    match find_project(slug, translator.tree()) {
        Some(project) => {
            let title = project.get("title").and_then(Value::as_str).unwrap_or(slug);
            let subtitle = project.get("subtitle").and_then(Value::as_str);
            let page_title = format!("{title} | {}", site.name);
            DocumentMeta {
                structured_data: Some(webpage_schema(
                    &page_title,
                    subtitle,
                    &site.canonical_url(fragment.raw()),
                )),
                title: Some(page_title),
                description: subtitle.map(str::to_string),
                breadcrumbs: derive_breadcrumbs(fragment.path(), translator.tree()),
            }
        }
        None => not_found_meta(
            format!("Project Not Found | {}", site.name),
            "The requested project could not be found.",
        ),
    }
}

pub fn blog_post_meta(
    slug: &str,
    fragment: &Fragment,
    translator: &Translator,
    site: &SiteIdentity,
) -> DocumentMeta {
    match find_blog_post(slug, translator.tree()) {
        Some(post) => {
            let title = post.get("title").and_then(Value::as_str).unwrap_or(slug);
            let summary = post.get("summary").and_then(Value::as_str);
            DocumentMeta {
                title: Some(format!("{title} | {}", site.name)),
                description: summary.map(str::to_string),
                structured_data: Some(json!({
                    "@context": SCHEMA_CONTEXT,
                    "@type": "BlogPosting",
                    "headline": title,
                    "description": summary,
                    "url": site.canonical_url(fragment.raw()),
                    "inLanguage": translator.language().code(),
                })),
                breadcrumbs: derive_breadcrumbs(fragment.path(), translator.tree()),
            }
        }
        None => not_found_meta(
            format!("Blog Post Not Found | {}", site.name),
            "The requested blog post could not be found.",
        ),
    }
}

pub fn detail_content<'a>(page: &ResolvedPage, tree: &'a TranslationTree) -> Option<&'a Value> {
    match page {
        ResolvedPage::ProjectDetail { slug } => find_project(slug, tree),
        ResolvedPage::BlogPost { slug } => find_blog_post(slug, tree),
        _ => None,
    }
}

fn not_found_meta(title: String, description: &str) -> DocumentMeta {
    DocumentMeta {
        title: Some(title),
        description: Some(description.to_string()),
        structured_data: None,
        breadcrumbs: Vec::new(),
    }
}

fn website_schema(site: &SiteIdentity, translator: &Translator) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebSite",
        "name": site.name,
        "url": site.url,
        "inLanguage": translator.language().code(),
    })
}

fn webpage_schema(name: &str, description: Option<&str>, url: &str) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebPage",
        "name": name,
        "description": description,
        "url": url,
    })
}
