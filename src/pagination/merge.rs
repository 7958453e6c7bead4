//! Placeholder substitution for query templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Named values substituted into a query template.
pub type MergeParams = Map<String, Value>;

/// Turns a query template plus parameters into a concrete query string.
pub trait QueryMerger: Send + Sync {
    /// Returns `template` with its placeholders bound from `params`.
    fn merge(&self, template: &str, params: &MergeParams) -> String;
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Replaces `{name}` with the GraphQL literal of `params[name]`.
///
/// Placeholders without a matching parameter are left as they are, so
/// selection sets such as `{id}` survive untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMerger;

impl QueryMerger for PlaceholderMerger {
    fn merge(&self, template: &str, params: &MergeParams) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match params.get(&caps[1]) {
                Some(value) => to_graphql_literal(value),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Renders a JSON value as a GraphQL input literal.
///
/// Strings are inserted raw so that selection fragments (like the page-info
/// selection) can be spliced in; object keys are left unquoted.
pub fn to_graphql_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(to_nested_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|(key, field)| format!("{}: {}", key, to_nested_literal(field)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

// Strings nested inside lists and objects are real string values and need quoting
fn to_nested_literal(value: &Value) -> String {
    match value {
        Value::String(s) => Value::String(s.clone()).to_string(),
        other => to_graphql_literal(other),
    }
}
