//! Step command templates.
//!
//! A template is a literal string with `{{.Field}}` placeholders (inner
//! padding allowed). Parsing and execution are separate so parsed
//! templates can be cached per `(composition type, step name)` and reused
//! across every instance of that composition.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn field_pattern() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| {
        Regex::new(r"^\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("valid field pattern")
    })
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed step template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template source string. Only `{{.Field}}` access actions
    /// are supported; anything else inside `{{ }}` is rejected.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or_else(|| "unclosed action".to_string())?;
            let action = &after_open[..close];
            let captures = field_pattern()
                .captures(action)
                .ok_or_else(|| format!("unsupported action {{{{{}}}}}", action))?;
            segments.push(Segment::Field(captures[1].to_string()));
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Execute against a context map. Referencing a field the context does
    /// not contain is an error.
    pub fn execute(&self, context: &BTreeMap<String, Value>) -> Result<String, String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(name) => {
                    let value = context
                        .get(name)
                        .ok_or_else(|| format!("no entry in context for key {:?}", name))?;
                    match value {
                        Value::String(s) => out.push_str(s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(out)
    }
}
