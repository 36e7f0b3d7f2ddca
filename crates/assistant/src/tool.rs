use router::encode_query;
use serde_json::{Map, Value};

pub const UNKNOWN_TOOL_REPLY: &str = "I'm not sure how to do that.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    NavigateTo { path: String },
    FilterUseCases { filters: Vec<(String, String)> },
    Unknown { name: String },
}

impl ToolCall {
    pub fn name(&self) -> &str {
        match self {
            ToolCall::NavigateTo { .. } => "navigateTo",
            ToolCall::FilterUseCases { .. } => "filterUseCases",
            ToolCall::Unknown { name } => name,
        }
    }

    pub fn target_fragment(&self) -> Option<String> {
        match self {
            ToolCall::NavigateTo { path } => Some(path.clone()),
            ToolCall::FilterUseCases { .. } => Some(format!("#/use-cases?{}", self.encoded_filters())),
            ToolCall::Unknown { .. } => None,
        }
    }

    pub fn confirmation(&self) -> String {
        match self {
            ToolCall::NavigateTo { path } => format!("Navigating to {}...", path.replace("#/", "")),
            ToolCall::FilterUseCases { .. } => {
                format!("Applying filters: {}", self.encoded_filters())
            }
            ToolCall::Unknown { .. } => UNKNOWN_TOOL_REPLY.to_string(),
        }
    }

    fn encoded_filters(&self) -> String {
        let ToolCall::FilterUseCases { filters } = self else {
            return String::new();
        };
        let pairs: Vec<(&str, &str)> = filters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        encode_query(&pairs)
    }
}

// A reply is a tool call only when the whole text is a JSON object with a
// `tool_name`. A surrounding code fence is tolerated. Calls missing their
// arguments are reported as unknown; an empty `filters` object is a plain
// catalogue navigation.
pub fn parse_tool_call(reply: &str) -> Option<ToolCall> {
    let body = strip_code_fence(reply.trim());
    let value: Value = serde_json::from_str(body).ok()?;
    let name = value.get("tool_name")?.as_str()?;

    let call = match name {
        "navigateTo" => value
            .get("path")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .map(|path| ToolCall::NavigateTo {
                path: path.to_string(),
            }),
        "filterUseCases" => value
            .get("filters")
            .and_then(Value::as_object)
            .map(|filters| ToolCall::FilterUseCases {
                filters: filter_pairs(filters),
            }),
        _ => None,
    };
    Some(call.unwrap_or_else(|| ToolCall::Unknown {
        name: name.to_string(),
    }))
}

fn filter_pairs(filters: &Map<String, Value>) -> Vec<(String, String)> {
    filters
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_tool_call() {
        assert_eq!(parse_tool_call("The blog has three posts."), None);
        assert_eq!(parse_tool_call(r#"{"answer": 42}"#), None);
        assert_eq!(parse_tool_call("[1, 2]"), None);
    }

    #[test]
    fn parses_navigation() {
        let call = parse_tool_call(r##" {"tool_name": "navigateTo", "path": "#/blog"} "##)
            .expect("tool call");
        assert_eq!(
            call,
            ToolCall::NavigateTo {
                path: "#/blog".to_string()
            }
        );
        assert_eq!(call.target_fragment().as_deref(), Some("#/blog"));
        assert_eq!(call.confirmation(), "Navigating to blog...");
    }

    #[test]
    fn parses_filters_into_catalogue_fragment() {
        let reply = "```json\n{\"tool_name\": \"filterUseCases\", \"filters\": {\"industry\": \"Manufacturing\", \"technology\": \"Power Automate\"}}\n```";
        let call = parse_tool_call(reply).expect("tool call");
        assert_eq!(call.name(), "filterUseCases");
        assert_eq!(
            call.target_fragment().as_deref(),
            Some("#/use-cases?industry=Manufacturing&technology=Power+Automate")
        );
        assert_eq!(
            call.confirmation(),
            "Applying filters: industry=Manufacturing&technology=Power+Automate"
        );
    }

    #[test]
    fn unknown_or_incomplete_tools_are_unknown() {
        let call = parse_tool_call(r#"{"tool_name": "bookMeeting"}"#).expect("tool call");
        assert_eq!(call.confirmation(), UNKNOWN_TOOL_REPLY);
        assert_eq!(call.target_fragment(), None);

        let missing = parse_tool_call(r#"{"tool_name": "navigateTo"}"#).expect("tool call");
        assert_eq!(
            missing,
            ToolCall::Unknown {
                name: "navigateTo".to_string()
            }
        );
    }

    #[test]
    fn empty_filters_navigate_to_the_catalogue() {
        let call = parse_tool_call(r#"{"tool_name": "filterUseCases", "filters": {}}"#)
            .expect("tool call");
        assert_eq!(call, ToolCall::FilterUseCases { filters: Vec::new() });
        assert_eq!(call.target_fragment().as_deref(), Some("#/use-cases?"));

        let missing = parse_tool_call(r#"{"tool_name": "filterUseCases"}"#).expect("tool call");
        assert_eq!(missing.target_fragment(), None);
    }
}
