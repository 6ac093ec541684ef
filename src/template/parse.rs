//! Splitting and classifying the arguments of a `vite` template directive.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::attrs::AttrValue;
use crate::context::ViteContext;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?:[^\s'"]*(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')[^\s'"]*)+
            | \S+"#,
        )
        .expect("invalid directive token regex")
    })
}

/// Split directive text on whitespace, keeping quoted strings (and `key="a b"`) whole.
pub fn tokenize(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Values available while rendering a template.
pub trait RenderScope {
    /// Value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<AttrValue>;
}

impl RenderScope for HashMap<String, AttrValue> {
    fn lookup(&self, name: &str) -> Option<AttrValue> {
        self.get(name).cloned()
    }
}

impl RenderScope for BTreeMap<String, AttrValue> {
    fn lookup(&self, name: &str) -> Option<AttrValue> {
        self.get(name).cloned()
    }
}

/// A template expression resolved at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Expression named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Expression text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value in `scope`.
    pub fn resolve(&self, scope: &dyn RenderScope) -> Option<AttrValue> {
        scope.lookup(&self.name)
    }
}

/// An asset argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// Quoted path, already run through the static lookup.
    Literal(String),
    /// Expression yielding the path at render time.
    Deferred(Variable),
}

/// A `key=value` argument's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrSource {
    /// Quoted value.
    Literal(AttrValue),
    /// Expression yielding the value at render time.
    Deferred(Variable),
}

/// Classified directive arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    /// Assets in argument order.
    pub assets: Vec<AssetRef>,
    /// Attribute overrides in argument order.
    pub attrs: Vec<(String, AttrSource)>,
}

impl Directive {
    /// Whether any asset path is only known at render time.
    pub fn has_deferred_path(&self) -> bool {
        self.assets
            .iter()
            .any(|asset| matches!(asset, AssetRef::Deferred(_)))
    }

    /// Whether any attribute value is only known at render time.
    pub fn has_deferred_attr(&self) -> bool {
        self.attrs
            .iter()
            .any(|(_, value)| matches!(value, AttrSource::Deferred(_)))
    }
}

/// Classify directive arguments (the tokens after the directive name).
///
/// Without arguments in development mode the directive stands for the dev client script.
pub fn parse_directive<S: AsRef<str>>(ctx: &ViteContext, bits: &[S]) -> Directive {
    if bits.is_empty() && ctx.config().dev_mode {
        return Directive {
            assets: vec![AssetRef::Literal(ctx.config().ws_client.clone())],
            attrs: Vec::new(),
        };
    }

    let mut directive = Directive::default();
    for bit in bits {
        let bit = bit.as_ref();
        if let Some((key, value)) = bit.split_once('=') {
            let source = match unquote(value) {
                Some(literal) => AttrSource::Literal(AttrValue::Str(literal.to_string())),
                None if value.is_empty() => AttrSource::Literal(AttrValue::Str(String::new())),
                None => AttrSource::Deferred(Variable::new(value)),
            };
            directive.attrs.push((key.to_string(), source));
        } else {
            let asset = match unquote(bit) {
                Some(path) => AssetRef::Literal(ctx.find_asset(path)),
                None => AssetRef::Deferred(Variable::new(bit)),
            };
            directive.assets.push(asset);
        }
    }
    directive
}

fn unquote(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    if value.len() >= 2 && value.ends_with(quote) {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostSettings, ViteConfig};
    use serde_json::json;
    use std::path::PathBuf;

    fn context(overrides: serde_json::Value) -> ViteContext {
        let host = HostSettings::new("/srv/app");
        ViteContext::new(ViteConfig::resolve(&host, Some(&overrides)), |_: &str| {
            None::<PathBuf>
        })
    }

    #[test]
    fn tokenizer_keeps_quoted_strings_whole() {
        let tokens = tokenize(r#"'home/js/app.js' "my file.css" page_js class="a b" defer='x'"#);
        assert_eq!(tokens, vec![
            "'home/js/app.js'",
            "\"my file.css\"",
            "page_js",
            "class=\"a b\"",
            "defer='x'",
        ]);
    }

    #[test]
    fn empty_directive_in_dev_mode_means_dev_client() {
        let ctx = context(json!({ "DEV_MODE": true }));
        let directive = parse_directive::<&str>(&ctx, &[]);
        assert_eq!(directive.assets, vec![AssetRef::Literal("@vite/client".into())]);
    }

    #[test]
    fn empty_directive_in_production_is_empty() {
        let ctx = context(json!({}));
        assert_eq!(parse_directive::<&str>(&ctx, &[]), Directive::default());
    }

    #[test]
    fn classifies_literals_and_variables() {
        let ctx = context(json!({}));
        let directive = parse_directive(&ctx, &[
            "'/home/js/app.js'",
            "page_js",
            "nonce=csp_nonce",
            "media=\"print\"",
        ]);

        assert_eq!(directive.assets, vec![
            AssetRef::Literal("home/js/app.js".into()),
            AssetRef::Deferred(Variable::new("page_js")),
        ]);
        assert_eq!(directive.attrs, vec![
            ("nonce".to_string(), AttrSource::Deferred(Variable::new("csp_nonce"))),
            ("media".to_string(), AttrSource::Literal(AttrValue::from("print"))),
        ]);
        assert!(directive.has_deferred_path());
        assert!(directive.has_deferred_attr());
    }

    #[test]
    fn literal_values_keep_inner_equals_signs() {
        let ctx = context(json!({}));
        let directive = parse_directive(&ctx, &["data-q='a=b'"]);
        assert_eq!(directive.attrs, vec![(
            "data-q".to_string(),
            AttrSource::Literal(AttrValue::from("a=b"))
        )]);
    }

    #[test]
    fn variables_resolve_against_scope() {
        let mut scope = HashMap::new();
        scope.insert("page_js".to_string(), AttrValue::from("blog/js/post.js"));

        assert_eq!(
            Variable::new("page_js").resolve(&scope),
            Some(AttrValue::from("blog/js/post.js"))
        );
        assert_eq!(Variable::new("missing").resolve(&scope), None);
    }
}
