use catalogue::CatalogueState;
use contact::ContactForm;
use core_types::{DocumentMeta, Theme};
use i18n::{LoadState, TranslationTree, Translator};
use router::{Navigation, ResolvedPage, detail_content, nav_label};
use serde_json::Value;

const NAV_SEGMENTS: [&str; 7] = [
    "about",
    "experience",
    "use-cases",
    "projects",
    "blog",
    "tech-stack",
    "contact",
];

pub struct View<'a> {
    pub state: LoadState,
    pub theme: Theme,
    pub translator: &'a Translator,
    pub navigation: &'a Navigation,
    pub document: &'a DocumentMeta,
    pub catalogue: Option<&'a CatalogueState>,
    pub contact: &'a ContactForm,
}

pub fn render(view: &View<'_>) -> String {
    match view.state {
        LoadState::Failed(language) => {
            return format!("!! content for `{language}` could not be loaded, try another language");
        }
        state if state.is_pending() => return "loading...".to_string(),
        _ => {}
    }

    let tree = view.translator.tree();
    let mut lines = vec![header(view, tree)];
    if let Some(title) = &view.document.title {
        lines.push(format!("== {title} =="));
    }
    if !view.document.breadcrumbs.is_empty() {
        let crumbs: Vec<&str> = view
            .document
            .breadcrumbs
            .iter()
            .map(|crumb| crumb.label.as_str())
            .collect();
        lines.push(crumbs.join(" > "));
    }
    lines.push(String::new());
    lines.extend(page_body(view, tree));
    lines.join("\n")
}

fn header(view: &View<'_>, tree: &TranslationTree) -> String {
    let nav: Vec<String> = NAV_SEGMENTS
        .iter()
        .map(|segment| nav_label(segment, tree))
        .collect();
    format!(
        "[{} | {}] {}",
        view.translator.language(),
        view.theme.as_str(),
        nav.join(" · ")
    )
}

fn page_body(view: &View<'_>, tree: &TranslationTree) -> Vec<String> {
    match &view.navigation.page {
        ResolvedPage::Home => texts(tree, &["hero.title", "hero.subtitle"]),
        ResolvedPage::About => {
            let mut lines = texts(tree, &["about.title"]);
            lines.extend(
                tree.items("about.skills.items")
                    .iter()
                    .map(|skill| format!("- {}", field(skill, "name"))),
            );
            lines
        }
        ResolvedPage::Experience => tree
            .items("experience.timeline")
            .iter()
            .map(|entry| {
                format!(
                    "- {} @ {} ({})",
                    field(entry, "role"),
                    field(entry, "company"),
                    field(entry, "period")
                )
            })
            .collect(),
        ResolvedPage::Education => texts(tree, &["education.title", "education.subtitle"]),
        ResolvedPage::Certificates => {
            texts(tree, &["certificates.title", "certificates.subtitle"])
        }
        ResolvedPage::UseCases => match view.catalogue {
            Some(catalogue) => use_cases(catalogue),
            None => Vec::new(),
        },
        ResolvedPage::Blog => tree
            .items("blog.posts")
            .iter()
            .map(|post| format!("- {} (#/blog/{})", field(post, "title"), field(post, "slug")))
            .collect(),
        ResolvedPage::BlogPost { .. } => detail(view, tree, "#/blog"),
        ResolvedPage::ProjectDetail { .. } => detail(view, tree, "#/projects"),
        ResolvedPage::Projects => tree
            .items("projects.items")
            .iter()
            .map(|project| {
                format!(
                    "- {} (#/projects/{})",
                    field(project, "title"),
                    field(project, "slug")
                )
            })
            .collect(),
        ResolvedPage::TechStack => texts(tree, &["techStack.title", "techStack.subtitle"]),
        ResolvedPage::Contact => {
            let mut lines = texts(tree, &["contact.title", "contact.subtitle"]);
            lines.extend(view.contact.status_text(view.translator));
            lines
        }
        ResolvedPage::NotFound => vec![
            tree.text("notFound.message")
                .unwrap_or("This page does not exist.")
                .to_string(),
        ],
    }
}

fn use_cases(catalogue: &CatalogueState) -> Vec<String> {
    let tiles: Vec<String> = catalogue
        .industry_counts()
        .iter()
        .map(|(industry, count)| format!("{industry}: {count}"))
        .collect();
    let technologies: Vec<String> = catalogue
        .technology_counts()
        .iter()
        .map(|(technology, count)| format!("{technology}: {count}"))
        .collect();

    let filter = catalogue.filter();
    let mut lines = vec![
        tiles.join(" | "),
        technologies.join(" | "),
        format!(
            "filters: {} / {} / \"{}\"",
            filter.industry.label(),
            filter.technology.label(),
            filter.search
        ),
    ];
    lines.extend(catalogue.visible().iter().map(|use_case| {
        format!(
            "  [{}] {} ({}, {})",
            use_case.id, use_case.title, use_case.industry, use_case.technology
        )
    }));

    if let Some(selected) = catalogue.selected() {
        lines.push(String::new());
        lines.push(format!(">> {} (level {}/10)", selected.title, selected.technical_level));
        lines.push(format!("   {}", selected.mini_description));
        if !selected.problem.is_empty() {
            lines.push(format!("   {}", selected.problem));
        }
    }
    lines
}

fn texts(tree: &TranslationTree, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| tree.text(key))
        .map(str::to_string)
        .collect()
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn detail(view: &View<'_>, tree: &TranslationTree, listing: &str) -> Vec<String> {
    let mut lines: Vec<String> = view.document.description.iter().cloned().collect();
    if detail_content(&view.navigation.page, tree).is_none() {
        lines.push(format!("<- back ({listing})"));
    }
    lines
}
