use catalogue::KNOWN_TECHNOLOGIES;
use i18n::{TranslationTree, Translator};
use indexmap::IndexSet;
use router::default_routes;
use serde_json::Value;

pub fn navigable_paths() -> Vec<String> {
    default_routes()
        .into_iter()
        .filter(|route| !route.path.contains(':'))
        .map(|route| format!("#{}", route.path))
        .collect()
}

fn catalogue_industries(tree: &TranslationTree) -> Vec<String> {
    tree.items("useCases.catalogue")
        .iter()
        .filter_map(|entry| entry.get("industry").and_then(Value::as_str))
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

pub fn build_system_instruction(translator: &Translator, site_name: &str) -> String {
    let tree = translator.tree();
    let paths = navigable_paths()
        .iter()
        .map(|path| format!("\"{path}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let industries = catalogue_industries(tree).join("\", \"");
    let technologies = KNOWN_TECHNOLOGIES.join("\", \"");

    format!(
        r##"You are the assistant of {site_name}'s portfolio website. Your primary role is to help visitors by answering questions and performing actions.

RULES:
1. You MUST respond in the visitor's language, which is currently: {language}.
2. For general questions, answer ONLY from the context provided below. If the answer isn't there, say you don't have that information.
3. To perform an action, you MUST respond with a single, valid JSON object and nothing else.

TOOLS:

1. Navigation tool: navigates the visitor to a page.
   - tool_name: "navigateTo"
   - path: the fragment of the page. Valid paths are: {paths}
   - Example: the visitor says "Take me to the blog". You respond: {{"tool_name": "navigateTo", "path": "#/blog"}}

2. Use case filtering tool: filters the use case library.
   - tool_name: "filterUseCases"
   - filters: an object containing "industry" and/or "technology" keys.
   - Valid industries: "{industries}"
   - Valid technologies: "{technologies}"
   - Example: the visitor says "Show me insurance use cases". You respond: {{"tool_name": "filterUseCases", "filters": {{"industry": "Insurance"}}}}

--- START OF CONTEXT ---
{context}
--- END OF CONTEXT ---
"##,
        language = translator.language().english_name(),
        context = build_context(tree),
    )
}

pub fn build_context(tree: &TranslationTree) -> String {
    let intro = tree
        .t("about.intro")
        .map(Value::to_string)
        .unwrap_or_default();

    let skills = tree
        .items("about.skills.items")
        .iter()
        .map(|skill| {
            format!(
                "- {}: {}",
                field(skill, "name"),
                field(skill, "description")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let experience = tree
        .items("experience.timeline")
        .iter()
        .map(|entry| {
            let points = entry
                .get("points")
                .and_then(Value::as_array)
                .map(|points| {
                    points
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!(
                "- {} at {} ({}): {points}",
                field(entry, "role"),
                field(entry, "company"),
                field(entry, "period")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("ABOUT:\n{intro}\nKEY SKILLS:\n{skills}\n\nPROFESSIONAL EXPERIENCE:\n{experience}")
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}
