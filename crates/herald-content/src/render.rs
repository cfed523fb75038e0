//! Template rendering.
//!
//! Templates use `{field}` placeholders; `{{` and `}}` are literal braces.
//! A placeholder resolves, in order, to the event's typed field, a scalar
//! value from the event metadata, or the renderer's default table. A
//! placeholder that resolves to nothing is an error rather than a blank.

use crate::amount::format_amount;
use crate::error::{ContentError, ContentResult, TemplateError};
use crate::event::{Amount, Event};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Built-in template for alpha-token posts.
pub const ALPHA_TEMPLATE: &str = include_str!("../templates/alpha_template.txt");

/// Template for kinds whose text arrives pre-rendered.
pub const MESSAGE_TEMPLATE: &str = "{message}";

/// Fallbacks for optional fields that may be absent from an event.
pub const FIELD_DEFAULTS: &[(&str, &str)] = &[
    ("chain", "Unknown Chain"),
    ("address", "N/A"),
    ("name", "Unknown"),
    ("symbol", "?"),
    ("amount", "0"),
    ("contract", "N/A"),
    ("explorer", ""),
    ("detected_at", ""),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template source.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(TemplateError::Malformed {
                                    position: pos,
                                    reason: "nested `{` inside placeholder",
                                })
                            }
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::Malformed {
                            position: pos,
                            reason: "unterminated placeholder",
                        });
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::Malformed {
                            position: pos,
                            reason: "empty placeholder",
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
                '}' => {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "unmatched `}`",
                    })
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Load and parse a template file.
    pub fn from_file(path: impl AsRef<Path>) -> ContentResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ContentError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source)?)
    }

    /// The built-in alpha-token template.
    pub fn alpha() -> Self {
        // Embedded source is covered by test_builtin_alpha_template_parses.
        Self::parse(ALPHA_TEMPLATE).unwrap_or_else(|_| Self::message())
    }

    /// `{message}`.
    pub fn message() -> Self {
        Self {
            segments: vec![Segment::Placeholder("message".to_string())],
        }
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// Renders events through templates with an explicit default table.
#[derive(Debug, Clone)]
pub struct Renderer {
    defaults: HashMap<String, String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            defaults: FIELD_DEFAULTS
                .iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a default.
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    /// Substitute every placeholder in `template` from `event`.
    pub fn render(&self, event: &Event, template: &Template) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &template.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = self.resolve(event, name).ok_or_else(|| {
                        TemplateError::UnknownPlaceholder { name: name.clone() }
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }

    fn resolve(&self, event: &Event, name: &str) -> Option<String> {
        if let Some(value) = event_field(event, name) {
            return Some(value);
        }
        if let Some(value) = event.metadata.get(name).and_then(scalar_text) {
            return Some(value);
        }
        let default = self.defaults.get(name)?;
        if name == "amount" {
            return Some(format_amount(&Amount::Text(default.clone())));
        }
        Some(default.clone())
    }
}

/// Render with the default field table.
pub fn render(event: &Event, template: &Template) -> Result<String, TemplateError> {
    Renderer::default().render(event, template)
}

fn event_field(event: &Event, name: &str) -> Option<String> {
    match name {
        "type" | "kind" => event.raw_discriminator().map(str::to_string),
        "message" => event.message.clone(),
        "chain" => event.chain.clone(),
        "address" => event.address.clone(),
        "name" => event.name.clone(),
        "symbol" => event.symbol.clone(),
        "amount" => event.amount.as_ref().map(format_amount),
        "contract" => event.contract.clone(),
        "explorer" => event.explorer.clone(),
        "threshold" => event.threshold.as_ref().map(format_amount),
        "detected_at" | "detectedAt" => event.detected_at.clone(),
        "queue_id" => event.queue_id.clone(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{parse, EventKind};
    use std::io::Write;

    fn complete_alpha() -> Event {
        parse(
            br#"{"type":"alpha_new_token","chain":"BASE","name":"Foo","symbol":"FOO","amount":1500000,"contract":"0xabc","explorer":"https://x"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_alpha_template_parses() {
        let template = Template::parse(ALPHA_TEMPLATE).unwrap();
        let names: Vec<_> = template.placeholders().collect();
        assert_eq!(
            names,
            vec!["chain", "name", "symbol", "amount", "contract", "explorer"]
        );
        assert_eq!(Template::alpha(), template);
    }

    #[test]
    fn test_alpha_render_formats_amount() {
        let text = render(&complete_alpha(), &Template::alpha()).unwrap();
        assert!(text.contains("1,500,000"));
        assert!(text.contains("BASE"));
        assert!(text.contains("Foo ($FOO)"));
        assert!(text.contains("0xabc"));
    }

    #[test]
    fn test_non_numeric_amount_renders_raw() {
        let template = Template::parse("{amount}").unwrap();

        let mut event = complete_alpha();
        event.amount = Some(Amount::Other(serde_json::json!({"value": 5})));
        assert_eq!(render(&event, &template).unwrap(), r#"{"value":5}"#);

        event.amount = Some(Amount::Other(serde_json::Value::Bool(true)));
        assert_eq!(render(&event, &template).unwrap(), "1");
    }

    #[test]
    fn test_defaults_fill_missing_optional_fields() {
        let template =
            Template::parse("{chain}|{symbol}|{address}|{explorer}|{amount}|{name}").unwrap();
        let event = Event::of_kind(EventKind::AlphaNewToken);
        assert_eq!(render(&event, &template).unwrap(), "Unknown Chain|?|N/A||0|Unknown");
    }

    #[test]
    fn test_unknown_placeholder_is_an_error() {
        let template = Template::parse("hello {nope}").unwrap();
        let err = render(&complete_alpha(), &template).unwrap_err();
        assert_eq!(err, TemplateError::UnknownPlaceholder { name: "nope".into() });
    }

    #[test]
    fn test_metadata_scalars_are_resolvable() {
        let event = parse(br#"{"type":"monitoring_alert","severity":"high","message":"m"}"#).unwrap();
        let template = Template::parse("[{severity}] {message}").unwrap();
        assert_eq!(render(&event, &template).unwrap(), "[high] m");
    }

    #[test]
    fn test_custom_default() {
        let renderer = Renderer::new().with_default("region", "global");
        let template = Template::parse("{region}").unwrap();
        assert_eq!(renderer.render(&Event::default(), &template).unwrap(), "global");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("{{literal}} {message}").unwrap();
        assert_eq!(render(&Event::generic("x"), &template).unwrap(), "{literal} x");
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(
            Template::parse("oops {name"),
            Err(TemplateError::Malformed { position: 5, .. })
        ));
        assert!(matches!(
            Template::parse("oops }"),
            Err(TemplateError::Malformed { .. })
        ));
        assert!(matches!(
            Template::parse("{}"),
            Err(TemplateError::Malformed { .. })
        ));
    }

    #[test]
    fn test_message_template() {
        let event = Event::generic("pre-rendered");
        assert_eq!(render(&event, &Template::message()).unwrap(), "pre-rendered");
    }

    #[test]
    fn test_template_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{name}} on {{chain}}").unwrap();

        let template = Template::from_file(file.path()).unwrap();
        assert_eq!(render(&complete_alpha(), &template).unwrap(), "Foo on BASE");
    }

    #[test]
    fn test_template_from_missing_file() {
        let err = Template::from_file("/nonexistent/template.txt").unwrap_err();
        assert!(matches!(err, ContentError::TemplateIo { .. }));
    }
}
