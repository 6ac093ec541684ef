//! Host settings and the effective Vite configuration derived from them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::attrs::Attributes;
use crate::error::{Result, ViteError};

/// Settings file searched for by the command line tool.
pub const DEFAULT_SETTINGS_FILE: &str = "vite-tags.json";

/// Asset requested when a directive has no arguments in development mode.
pub const DEFAULT_WS_CLIENT: &str = "@vite/client";

/// Settings owned by the host web application.
///
/// These seed the configuration defaults; the optional `DJANGO_VITE_PLUGIN` object (or its
/// short form `VITE`) carries user overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HostSettings {
    /// Project root. Relative paths in the configuration are resolved against it.
    pub base_dir: PathBuf,
    /// Host debug flag, the default for `DEV_MODE`.
    #[serde(default)]
    pub debug: bool,
    /// Directory static files are collected into, the default build directory.
    #[serde(default)]
    pub static_root: Option<PathBuf>,
    /// Public URL prefix for static files.
    #[serde(default = "default_static_url")]
    pub static_url: String,
    /// Extra directories searched by the static file finder.
    #[serde(default)]
    pub staticfiles_dirs: Vec<PathBuf>,
    /// Installed applications, searched for a `static/` directory in order.
    #[serde(default)]
    pub installed_apps: Vec<InstalledApp>,
    /// User overrides merged over the defaults.
    #[serde(default, rename = "DJANGO_VITE_PLUGIN", alias = "VITE")]
    pub vite: Option<Value>,
}

/// An installed application and the directory it lives in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstalledApp {
    /// Application label.
    pub name: String,
    /// Application directory, relative to the project root when not absolute.
    pub path: PathBuf,
}

fn default_static_url() -> String {
    "/static/".into()
}

impl HostSettings {
    /// Minimal settings rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            debug: false,
            static_root: None,
            static_url: default_static_url(),
            staticfiles_dirs: Vec::new(),
            installed_apps: Vec::new(),
            vite: None,
        }
    }

    /// Read settings from a JSON file.
    ///
    /// A relative `BASE_DIR` is taken relative to the directory holding the file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| ViteError::Settings {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let mut settings: HostSettings =
            serde_json::from_str(&content).map_err(|err| ViteError::Settings {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        if settings.base_dir.is_relative() {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            settings.base_dir = parent.join(&settings.base_dir);
        }
        Ok(settings)
    }

    /// Resolve an application directory against the project root.
    pub fn app_dir(&self, app: &InstalledApp) -> PathBuf {
        absolutize(&self.base_dir, &app.path)
    }
}

/// Dev server options consumed by the JavaScript side of the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ServerConfig {
    /// Serve over HTTPS.
    pub https: bool,
    /// Host the dev server binds to.
    pub host: String,
    /// Port the dev server binds to.
    pub port: u16,
    /// TLS key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// TLS certificate file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            https: false,
            host: "127.0.0.1".into(),
            port: 5173,
            key: None,
            cert: None,
        }
    }
}

/// Merge target: defaults are serialised from this, overrides deserialised into it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ConfigValues {
    ws_client: String,
    dev_mode: bool,
    build_dir: PathBuf,
    manifest: Option<PathBuf>,
    hot_file: Option<PathBuf>,
    build_url_prefix: String,
    server: ServerConfig,
    js_attrs: Attributes,
    css_attrs: Attributes,
    static_lookup: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ConfigValues {
    fn defaults(host: &HostSettings) -> Self {
        Self {
            ws_client: DEFAULT_WS_CLIENT.into(),
            dev_mode: host.debug,
            build_dir: host
                .static_root
                .clone()
                .unwrap_or_else(|| host.base_dir.join("static")),
            manifest: None,
            hot_file: None,
            build_url_prefix: host.static_url.clone(),
            server: ServerConfig::default(),
            js_attrs: Attributes::new().with("type", "module"),
            css_attrs: Attributes::new()
                .with("rel", "stylesheet")
                .with("type", "text/css"),
            static_lookup: true,
            extra: Map::new(),
        }
    }
}

/// Fully resolved configuration. Immutable once built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ViteConfig {
    /// Asset emitted for an argument-less directive in development mode.
    pub ws_client: String,
    /// Proxy assets to the dev server instead of reading the manifest.
    pub dev_mode: bool,
    /// Bundler output directory, as configured.
    pub build_dir: PathBuf,
    /// Absolute path of the bundler manifest.
    pub manifest: PathBuf,
    /// Absolute path of the dev server hot file.
    pub hot_file: PathBuf,
    /// Public URL prefix for built assets; always ends with `/`.
    pub build_url_prefix: String,
    /// Dev server options.
    pub server: ServerConfig,
    /// Default attributes for `<script>` tags.
    pub js_attrs: Attributes,
    /// Default attributes for `<link>` tags.
    pub css_attrs: Attributes,
    /// Run asset references through the static file finder.
    pub static_lookup: bool,
    /// Override keys the defaults do not know about, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ViteConfig {
    /// Merge `overrides` over the defaults derived from `host`.
    ///
    /// Never fails: each override value that does not fit its setting falls back to that
    /// setting's default while the remaining overrides stay in effect.
    pub fn resolve(host: &HostSettings, overrides: Option<&Value>) -> Self {
        let defaults = ConfigValues::defaults(host);
        let values = match overrides {
            Some(overrides) => match serde_json::to_value(&defaults) {
                Ok(default_value) => {
                    let mut merged = deep_merge(overrides, &default_value);
                    overlay_attributes(&mut merged, overrides);
                    settle(merged, default_value).unwrap_or(defaults)
                }
                Err(_) => defaults,
            },
            None => defaults,
        };

        Self::from_values(values, &host.base_dir)
    }

    /// Shorthand for [`ViteConfig::resolve`] using the overrides stored in the host settings.
    pub fn from_host(host: &HostSettings) -> Self {
        Self::resolve(host, host.vite.as_ref())
    }

    fn from_values(values: ConfigValues, base_dir: &Path) -> Self {
        let build_path = absolutize(base_dir, &values.build_dir);
        let manifest = values
            .manifest
            .map(|path| absolutize(base_dir, &path))
            .unwrap_or_else(|| build_path.join(".vite").join("manifest.json"));
        let hot_file = values
            .hot_file
            .map(|path| absolutize(base_dir, &path))
            .unwrap_or_else(|| base_dir.join(".vite").join("hot"));

        let mut build_url_prefix = values.build_url_prefix;
        if !build_url_prefix.ends_with('/') {
            build_url_prefix.push('/');
        }

        let mut js_attrs = values.js_attrs;
        if !values.dev_mode {
            if let Some(build_attrs) = values.extra.get("JS_ATTRS_BUILD") {
                match serde_json::from_value::<Attributes>(build_attrs.clone()) {
                    Ok(attrs) => js_attrs = attrs,
                    Err(err) => warn!(error = %err, "ignoring invalid JS_ATTRS_BUILD"),
                }
            }
        }

        Self {
            ws_client: values.ws_client,
            dev_mode: values.dev_mode,
            build_dir: values.build_dir,
            manifest,
            hot_file,
            build_url_prefix,
            server: values.server,
            js_attrs,
            css_attrs: values.css_attrs,
            static_lookup: values.static_lookup,
            extra: values.extra,
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Project root the configuration was resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build directory resolved against the project root.
    pub fn build_path(&self) -> PathBuf {
        absolutize(&self.base_dir, &self.build_dir)
    }
}

/// Merge `config` over `default`.
///
/// Keys missing from `config` take the default, nested objects are merged recursively, keys
/// unknown to `default` pass through, and a value whose JSON type differs from the default's is
/// replaced by the default. A `null` default accepts anything.
pub fn deep_merge(config: &Value, default: &Value) -> Value {
    if default.is_null() {
        return config.clone();
    }
    if !same_kind(config, default) {
        return default.clone();
    }

    let (Value::Object(config_map), Value::Object(default_map)) = (config, default) else {
        return config.clone();
    };

    let mut merged = Map::new();
    for (key, default_value) in default_map {
        let value = match config_map.get(key) {
            Some(value) => deep_merge(value, default_value),
            None => default_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    for (key, value) in config_map {
        if !default_map.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// Override keys holding attribute maps. Their values are booleans or strings by the user's
/// choice, so they are taken as given instead of matched against the default's type.
const ATTRIBUTE_KEYS: &[&str] = &["JS_ATTRS", "CSS_ATTRS"];

fn overlay_attributes(merged: &mut Value, overrides: &Value) {
    let (Value::Object(merged), Value::Object(overrides)) = (merged, overrides) else {
        return;
    };
    for key in ATTRIBUTE_KEYS {
        if let (Some(Value::Object(target)), Some(Value::Object(given))) =
            (merged.get_mut(*key), overrides.get(*key))
        {
            for (name, value) in given {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Adopt the merged values one key at a time on top of the defaults, keeping only those that
/// still deserialise.
fn settle(merged: Value, default_value: Value) -> Option<ConfigValues> {
    let Value::Object(fields) = merged else {
        return None;
    };
    let mut accepted = default_value;
    for (key, value) in fields {
        adopt(&mut accepted, &mut vec![key], value);
    }
    serde_json::from_value(accepted).ok()
}

fn adopt(accepted: &mut Value, path: &mut Vec<String>, value: Value) {
    let candidate = value.clone();
    let previous = swap_at(accepted, path, Some(candidate));
    let err = match serde_json::from_value::<ConfigValues>(accepted.clone()) {
        Ok(_) => return,
        Err(err) => err,
    };
    swap_at(accepted, path, previous.clone());

    match (value, previous) {
        (Value::Object(fields), Some(Value::Object(_))) => {
            for (key, value) in fields {
                path.push(key);
                adopt(accepted, path, value);
                path.pop();
            }
        }
        _ => warn!(
            key = %path.join("."),
            error = %err,
            "ignoring unusable Vite override"
        ),
    }
}

/// Replace (or with `None`, remove) the value at `path`, returning what was there.
fn swap_at(root: &mut Value, path: &[String], value: Option<Value>) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut node = root;
    for key in parents {
        node = node.get_mut(key.as_str())?;
    }
    let map = node.as_object_mut()?;
    match value {
        Some(value) => map.insert(last.clone(), value),
        None => map.shift_remove(last.as_str()),
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
