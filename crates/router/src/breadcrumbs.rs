use core_types::BreadcrumbLink;
use i18n::{TranslationTree, camel_case};
use serde_json::Value;

const ABOUT_FAMILY: [&str; 4] = ["about", "experience", "education", "certificates"];
const TOP_LEVEL: [&str; 4] = ["use-cases", "blog", "tech-stack", "contact"];

pub fn derive_breadcrumbs(path: &str, tree: &TranslationTree) -> Vec<BreadcrumbLink> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let Some(first) = segments.next() else {
        return Vec::new();
    };
    let detail = segments.next();

    if ABOUT_FAMILY.contains(&first) {
        let about = nav_label("about", tree);
        return if first == "about" {
            vec![BreadcrumbLink::current(about)]
        } else {
            vec![
                BreadcrumbLink::link(about, "#/about"),
                BreadcrumbLink::current(nav_label(first, tree)),
            ]
        };
    }

    match (first, detail) {
        ("projects", None) => vec![BreadcrumbLink::current(nav_label("projects", tree))],
        ("projects", Some(slug)) => vec![
            BreadcrumbLink::link(nav_label("projects", tree), "#/projects"),
            BreadcrumbLink::current(project_title(slug, tree).unwrap_or(slug)),
        ],
        ("blog", Some(slug)) => vec![
            BreadcrumbLink::link(nav_label("blog", tree), "#/blog"),
            BreadcrumbLink::current(blog_post_title(slug, tree).unwrap_or(slug)),
        ],
        (segment, _) if TOP_LEVEL.contains(&segment) => {
            vec![BreadcrumbLink::current(nav_label(segment, tree))]
        }
        _ => Vec::new(),
    }
}

pub fn nav_label(segment: &str, tree: &TranslationTree) -> String {
    tree.text(&format!("nav.{}", camel_case(segment)))
        .map(str::to_string)
        .unwrap_or_else(|| title_case(segment))
}

pub(crate) fn project_title<'a>(slug: &str, tree: &'a TranslationTree) -> Option<&'a str> {
    find_project(slug, tree)?.get("title").and_then(Value::as_str)
}

pub(crate) fn find_project<'a>(slug: &str, tree: &'a TranslationTree) -> Option<&'a Value> {
    tree.t("projects.details")?.get(slug)
}

pub(crate) fn blog_post_title<'a>(slug: &str, tree: &'a TranslationTree) -> Option<&'a str> {
    find_blog_post(slug, tree)?.get("title").and_then(Value::as_str)
}

pub(crate) fn find_blog_post<'a>(slug: &str, tree: &'a TranslationTree) -> Option<&'a Value> {
    tree.items("blog.posts")
        .iter()
        .find(|post| post.get("slug").and_then(Value::as_str) == Some(slug))
}

fn title_case(segment: &str) -> String {
    segment
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
