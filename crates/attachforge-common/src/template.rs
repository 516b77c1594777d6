//! Path templates for attachment storage locations.
//!
//! A pattern such as `uploads/:model/:{owner.slug}/:id.:ext` mixes literal
//! text with two kinds of tokens:
//!
//! - built-in tokens (`:folder`, `:model`, `:id`, `:ext`, `:filename`,
//!   `:custom`) filled from [`TemplateBindings`]
//! - extended tokens (`:{a.b.c}`) resolved by walking a dotted path from an
//!   [`AttributeSource`], usually the owning record
//!
//! Patterns are tokenized once and rendered in a single pass, so text that
//! comes out of a substitution is never scanned for tokens again.

use std::collections::HashMap;

use serde_json::Value;

/// Errors reported by [`PathTemplate::render_strict`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A built-in token appears in the pattern but has no binding.
    #[error("template token ':{token}' has no binding")]
    Unbound { token: &'static str },

    /// An extended token did not resolve to a scalar value.
    #[error("template path ':{{{path}}}' did not resolve to a value")]
    Unresolved { path: String },
}

/// Built-in template tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Configured storage folder.
    Folder,
    /// Type name of the owning record.
    Model,
    /// Primary key of the owning record.
    Id,
    /// File extension, without the dot.
    Ext,
    /// Original name of the uploaded file.
    Filename,
    /// Caller supplied value, the style name for variant paths.
    Custom,
}

impl Token {
    const ALL: [Token; 6] = [
        Token::Folder,
        Token::Model,
        Token::Id,
        Token::Ext,
        Token::Filename,
        Token::Custom,
    ];

    /// Name of the token as written after the `:`.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Folder => "folder",
            Token::Model => "model",
            Token::Id => "id",
            Token::Ext => "ext",
            Token::Filename => "filename",
            Token::Custom => "custom",
        }
    }
}

/// Values for the built-in tokens of a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateBindings {
    values: HashMap<Token, String>,
}

impl TemplateBindings {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a token, builder style.
    pub fn with(mut self, token: Token, value: impl Into<String>) -> Self {
        self.values.insert(token, value.into());
        self
    }

    /// Bind a token.
    pub fn set(&mut self, token: Token, value: impl Into<String>) {
        self.values.insert(token, value.into());
    }

    /// Get the value bound to a token.
    pub fn get(&self, token: Token) -> Option<&str> {
        self.values.get(&token).map(|s| s.as_str())
    }
}

/// Root of a dotted-path lookup for extended tokens.
pub trait AttributeSource {
    /// Look up a top-level attribute by name.
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl AttributeSource for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.as_object()?.get(name).cloned()
    }
}

/// Walk a dotted path such as `owner.profile.slug` from `root`.
///
/// Each segment projects a field out of the current object. Once the walk
/// reaches a non-object value it stops and that value is the result, so
/// `count.anything` resolves to the value of `count`. Missing fields give
/// `None`.
pub fn resolve_dotted(path: &str, root: &dyn AttributeSource) -> Option<Value> {
    let mut segments = path.split('.');
    let mut value = root.attribute(segments.next()?)?;

    for segment in segments {
        let next = match &value {
            Value::Object(map) => map.get(segment).cloned()?,
            _ => break,
        };
        value = next;
    }

    Some(value)
}

/// Text form of a resolved value, `None` for values with no path form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Builtin(Token),
    Extended(String),
}

/// A parsed path pattern.
///
/// # Example
///
/// ```
/// use attachforge_common::{PathTemplate, TemplateBindings, Token};
/// use serde_json::json;
///
/// let record = json!({ "owner": { "slug": "jane" } });
/// let template = PathTemplate::new(":folder/:{owner.slug}/:id.:ext");
/// let bindings = TemplateBindings::new()
///     .with(Token::Folder, "uploads")
///     .with(Token::Id, "7")
///     .with(Token::Ext, "png");
///
/// assert_eq!(template.render(&bindings, &record), "uploads/jane/7.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = parse(&pattern);
        Self { pattern, segments }
    }

    /// The pattern this template was parsed from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern contains the given built-in token.
    pub fn uses(&self, token: Token) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Builtin(token))
    }

    /// Whether the pattern ends with `.:ext`.
    pub fn ends_with_extension(&self) -> bool {
        self.pattern.ends_with(".:ext")
    }

    /// Template for style variants: every `.:ext` becomes `-:custom.:ext`.
    pub fn variant_pattern(&self) -> PathTemplate {
        PathTemplate::new(self.pattern.replace(".:ext", "-:custom.:ext"))
    }

    /// Render the template.
    ///
    /// Unbound tokens and unresolved extended tokens become empty strings.
    pub fn render(&self, bindings: &TemplateBindings, root: &dyn AttributeSource) -> String {
        self.expand(bindings, root).0
    }

    /// Render the template, failing on the first unbound or unresolved token.
    pub fn render_strict(
        &self,
        bindings: &TemplateBindings,
        root: &dyn AttributeSource,
    ) -> Result<String, TemplateError> {
        match self.expand(bindings, root) {
            (_, Some(err)) => Err(err),
            (path, None) => Ok(path),
        }
    }

    fn expand(
        &self,
        bindings: &TemplateBindings,
        root: &dyn AttributeSource,
    ) -> (String, Option<TemplateError>) {
        let mut out = String::with_capacity(self.pattern.len());
        let mut first_error = None;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Builtin(token) => match bindings.get(*token) {
                    Some(value) => out.push_str(value),
                    None => {
                        first_error.get_or_insert(TemplateError::Unbound {
                            token: token.name(),
                        });
                    }
                },
                Segment::Extended(path) => {
                    match resolve_dotted(path, root).as_ref().and_then(scalar_text) {
                        Some(value) => out.push_str(&value),
                        None => {
                            first_error.get_or_insert(TemplateError::Unresolved {
                                path: path.clone(),
                            });
                        }
                    }
                }
            }
        }

        (out, first_error)
    }
}

fn parse(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find(':') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(inner) = after.strip_prefix('{') {
            if let Some(end) = inner.find('}').filter(|end| *end > 0) {
                flush(&mut literal, &mut segments);
                segments.push(Segment::Extended(inner[..end].to_string()));
                rest = &inner[end + 1..];
                continue;
            }
        } else if let Some(token) = Token::ALL.iter().find(|t| after.starts_with(t.name())) {
            flush(&mut literal, &mut segments);
            segments.push(Segment::Builtin(*token));
            rest = &after[token.name().len()..];
            continue;
        }

        // Not a token: keep the colon as text.
        literal.push(':');
        rest = after;
    }

    literal.push_str(rest);
    flush(&mut literal, &mut segments);
    segments
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings() -> TemplateBindings {
        TemplateBindings::new()
            .with(Token::Folder, "uploads")
            .with(Token::Model, "Post")
            .with(Token::Id, "5")
            .with(Token::Ext, "jpg")
            .with(Token::Filename, "holiday.jpg")
    }

    #[test]
    fn test_render_builtin_tokens() {
        let template = PathTemplate::new(":folder/:model/:id.:ext");
        assert_eq!(
            template.render(&bindings(), &json!({})),
            "uploads/Post/5.jpg"
        );
    }

    #[test]
    fn test_render_unbound_is_empty() {
        let template = PathTemplate::new(":folder/:custom/:id.:ext");
        assert_eq!(template.render(&bindings(), &json!({})), "uploads//5.jpg");
    }

    #[test]
    fn test_render_extended_nested() {
        let root = json!({ "a": { "b": 5 } });
        let template = PathTemplate::new("x/:{a.b}");
        assert_eq!(template.render(&bindings(), &root), "x/5");
    }

    #[test]
    fn test_render_extended_missing_field() {
        let root = json!({ "a": { "b": 5 } });
        let template = PathTemplate::new(":{a.c}");
        assert_eq!(template.render(&bindings(), &root), "");
    }

    #[test]
    fn test_render_extended_stops_at_scalar() {
        let root = json!({ "a": "flat" });
        let template = PathTemplate::new(":{a.b.c}");
        assert_eq!(template.render(&bindings(), &root), "flat");
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = PathTemplate::new(":folder/:{note}/:id");
        let bindings = TemplateBindings::new()
            .with(Token::Folder, "a:id")
            .with(Token::Id, "9");
        let root = json!({ "note": ":model" });
        assert_eq!(template.render(&bindings, &root), "a:id/:model/9");
    }

    #[test]
    fn test_unknown_colon_text_is_literal() {
        let template = PathTemplate::new("C:\\data/:unknown/:{}/:{open/:id");
        assert_eq!(
            template.render(&bindings(), &json!({})),
            "C:\\data/:unknown/:{}/:{open/5"
        );
    }

    #[test]
    fn test_token_prefix_matches() {
        // `:idx` is `:id` followed by literal `x`
        let template = PathTemplate::new(":idx");
        assert_eq!(template.render(&bindings(), &json!({})), "5x");
    }

    #[test]
    fn test_render_deterministic_and_idempotent() {
        let template = PathTemplate::new(":folder/:model/:{owner.name}/:id.:ext");
        let root = json!({ "owner": { "name": "jane" } });
        let first = template.render(&bindings(), &root);
        let second = template.render(&bindings(), &root);
        assert_eq!(first, second);

        let again = PathTemplate::new(first.clone()).render(&bindings(), &root);
        assert_eq!(again, first);
    }

    #[test]
    fn test_render_strict_unbound() {
        let template = PathTemplate::new(":folder/:custom.:ext");
        let err = template
            .render_strict(&bindings(), &json!({}))
            .unwrap_err();
        assert_eq!(err, TemplateError::Unbound { token: "custom" });
    }

    #[test]
    fn test_render_strict_unresolved() {
        let template = PathTemplate::new(":{owner.name}/:id");
        let err = template
            .render_strict(&bindings(), &json!({ "owner": {} }))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unresolved {
                path: "owner.name".to_string()
            }
        );
    }

    #[test]
    fn test_render_strict_ok() {
        let template = PathTemplate::new(":folder/:id.:ext");
        assert_eq!(
            template.render_strict(&bindings(), &json!({})).unwrap(),
            "uploads/5.jpg"
        );
    }

    #[test]
    fn test_variant_pattern() {
        let template = PathTemplate::new("uploads/:model/:id.:ext");
        let variant = template.variant_pattern();
        assert_eq!(variant.pattern(), "uploads/:model/:id-:custom.:ext");

        let path = variant.render(&bindings().with(Token::Custom, "thumb"), &json!({}));
        assert_eq!(path, "uploads/Post/5-thumb.jpg");
    }

    #[test]
    fn test_uses_and_extension_suffix() {
        let template = PathTemplate::new(":folder/:filename");
        assert!(template.uses(Token::Filename));
        assert!(!template.uses(Token::Id));
        assert!(!template.ends_with_extension());
        assert!(PathTemplate::new(":id.:ext").ends_with_extension());
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("a")), Some("a".to_string()));
        assert_eq!(scalar_text(&json!(12)), Some("12".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!([1, 2])), None);
    }
}
