//! HTML attribute sets and their compiled string form.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value of a single HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `true` renders the bare attribute name; `false` renders `name="false"`.
    Bool(bool),
    /// Rendered as `name="value"`.
    Str(String),
}

impl AttrValue {
    /// String form used when the value stands in for an asset path.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Bool(flag) => serializer.serialize_bool(*flag),
            AttrValue::Str(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrValueVisitor;

        impl Visitor<'_> for AttrValueVisitor {
            type Value = AttrValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean, string or number attribute value")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<AttrValue, E> {
                Ok(AttrValue::Bool(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(value.to_string()))
            }
        }

        deserializer.deserialize_any(AttrValueVisitor)
    }
}

/// Insertion-ordered attribute map.
///
/// Merging never mutates the receiver: [`Attributes::merged`] hands back a fresh map, so a
/// shared default set stays untouched no matter how many render calls build on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, keeping the original position when the key already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`Attributes::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up an attribute value.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Copy of `self` with `overrides` applied key-for-key.
    pub fn merged(&self, overrides: &Attributes) -> Attributes {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.insert(name, value.clone());
        }
        merged
    }

    /// Render as an HTML attribute string, e.g. `type="module" defer`.
    pub fn compile(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| match value {
                AttrValue::Bool(true) => name.clone(),
                AttrValue::Bool(false) => format!("{name}=\"false\""),
                AttrValue::Str(value) => format!("{name}=\"{value}\""),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of HTML attributes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
                let mut attrs = Attributes::new();
                while let Some((name, value)) = access.next_entry::<String, AttrValue>()? {
                    attrs.insert(name, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Attribute strings for both tag kinds, compiled once per render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAttrs {
    /// Compiled attributes for `<script>` tags.
    pub js: String,
    /// Compiled attributes for `<link>` tags.
    pub css: String,
}

impl CompiledAttrs {
    /// Apply per-call `overrides` on top of both default sets and compile each.
    pub fn new(js_defaults: &Attributes, css_defaults: &Attributes, overrides: &Attributes) -> Self {
        Self {
            js: js_defaults.merged(overrides).compile(),
            css: css_defaults.merged(overrides).compile(),
        }
    }

    /// Compile the default sets without overrides.
    pub fn defaults(js_defaults: &Attributes, css_defaults: &Attributes) -> Self {
        Self::new(js_defaults, css_defaults, &Attributes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_flags_false_and_strings() {
        let attrs: Attributes = [
            ("type", AttrValue::Bool(true)),
            ("data-x", AttrValue::Bool(false)),
            ("class", AttrValue::from("a b")),
        ]
        .into_iter()
        .collect();

        assert_eq!(attrs.compile(), r#"type data-x="false" class="a b""#);
    }

    #[test]
    fn compile_is_order_preserving_and_idempotent() {
        let attrs = Attributes::new()
            .with("z", "1")
            .with("a", true)
            .with("m", "3");

        let first = attrs.compile();
        assert_eq!(first, r#"z="1" a m="3""#);
        assert_eq!(attrs.compile(), first);
    }

    #[test]
    fn empty_set_compiles_to_empty_string() {
        assert_eq!(Attributes::new().compile(), "");
    }

    #[test]
    fn merge_overrides_in_place_and_appends_new_keys() {
        let defaults = Attributes::new().with("rel", "stylesheet").with("type", "text/css");
        let overrides = Attributes::new().with("media", "print").with("type", "text/x-css");

        let merged = defaults.merged(&overrides);
        assert_eq!(
            merged.compile(),
            r#"rel="stylesheet" type="text/x-css" media="print""#
        );
    }

    #[test]
    fn merge_never_touches_the_defaults() {
        let defaults = Attributes::new().with("type", "module");
        let _ = defaults.merged(&Attributes::new().with("defer", true));
        let second = defaults.merged(&Attributes::new().with("async", true));

        assert_eq!(defaults.compile(), r#"type="module""#);
        assert_eq!(second.compile(), r#"type="module" async"#);
    }

    #[test]
    fn compiled_attrs_apply_overrides_to_both_kinds() {
        let js = Attributes::new().with("type", "module");
        let css = Attributes::new().with("rel", "stylesheet");
        let compiled = CompiledAttrs::new(&js, &css, &Attributes::new().with("nonce", "abc"));

        assert_eq!(compiled.js, r#"type="module" nonce="abc""#);
        assert_eq!(compiled.css, r#"rel="stylesheet" nonce="abc""#);
    }

    #[test]
    fn deserializes_in_authored_order() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"type": "module", "defer": true, "data-n": 3}"#).unwrap();
        assert_eq!(attrs.compile(), r#"type="module" defer data-n="3""#);
    }
}
