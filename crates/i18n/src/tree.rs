use std::sync::Arc;

use core_types::Language;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTree {
    root: Value,
}

impl Default for TranslationTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl TranslationTree {
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Option<Self> {
        root.is_object().then_some(Self { root })
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_object().is_none_or(Map::is_empty)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    // Resolves `a.b.c`. Objects are walked by key, arrays by numeric index.
    pub fn t(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in key.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn t_with(&self, key: &str, replacements: &[(&str, &str)]) -> Option<Value> {
        let value = self.t(key)?;
        match value {
            Value::String(text) => Some(Value::String(substitute(text, replacements))),
            other => Some(other.clone()),
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.t(key).and_then(Value::as_str)
    }

    pub fn text_with(&self, key: &str, replacements: &[(&str, &str)]) -> Option<String> {
        self.text(key).map(|text| substitute(text, replacements))
    }

    pub fn items(&self, key: &str) -> &[Value] {
        self.t(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn merge_root(&mut self, content: Value) {
        if let (Value::Object(target), Value::Object(source)) = (&mut self.root, content) {
            target.extend(source);
        }
    }

    pub(crate) fn merge_under(&mut self, key: &str, content: Option<Value>) {
        let slot = self.object_slot(key);
        if let (Some(slot), Some(Value::Object(source))) = (slot, content) {
            slot.extend(source);
        }
    }

    pub(crate) fn set_under(&mut self, key: &str, field: &str, value: Value) {
        if let Some(slot) = self.object_slot(key) {
            slot.insert(field.to_string(), value);
        }
    }

    fn object_slot(&mut self, key: &str) -> Option<&mut Map<String, Value>> {
        let root = self.root.as_object_mut()?;
        let entry = root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry.as_object_mut()
    }
}

pub(crate) fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in replacements {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    tree: Arc<TranslationTree>,
}

impl Translator {
    pub fn new(language: Language, tree: Arc<TranslationTree>) -> Self {
        Self { language, tree }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn tree(&self) -> &TranslationTree {
        &self.tree
    }

    pub fn t(&self, key: &str) -> Option<&Value> {
        self.tree.t(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.tree.text(key)
    }

    pub fn text_with(&self, key: &str, replacements: &[(&str, &str)]) -> Option<String> {
        self.tree.text_with(key, replacements)
    }
}
