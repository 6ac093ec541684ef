//! The per-application resolution context: configuration plus lazily filled caches.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::asset_paths::{StaticDirsFinder, StaticFinder, fallback_path, normalize_found_path};
use crate::attrs::{Attributes, CompiledAttrs};
use crate::config::{HostSettings, ViteConfig};
use crate::error::{Result, ViteError};
use crate::html::{Tag, emit_dev, render_tags};
use crate::manifest::{Manifest, entry_tags};

/// Owns the configuration and every cache used while rendering asset tags.
///
/// The manifest, the dev server URL and static lookups are each computed on first use and then
/// reused until [`ViteContext::reset`]. Concurrent first use may compute a value twice; the
/// results are identical, so whichever write lands last is kept.
pub struct ViteContext {
    config: ViteConfig,
    finder: Box<dyn StaticFinder>,
    default_attrs: CompiledAttrs,
    manifest: RwLock<Option<Arc<Manifest>>>,
    dev_server: RwLock<Option<Arc<str>>>,
    found: RwLock<HashMap<String, String>>,
}

impl ViteContext {
    /// Context using `finder` for static lookups.
    pub fn new(config: ViteConfig, finder: impl StaticFinder + 'static) -> Self {
        let default_attrs = CompiledAttrs::defaults(&config.js_attrs, &config.css_attrs);
        Self {
            config,
            finder: Box::new(finder),
            default_attrs,
            manifest: RwLock::new(None),
            dev_server: RwLock::new(None),
            found: RwLock::new(HashMap::new()),
        }
    }

    /// Context for a host application, searching its static directories on disk.
    pub fn from_host(host: &HostSettings) -> Self {
        Self::new(ViteConfig::from_host(host), StaticDirsFinder::from_host(host))
    }

    /// Effective configuration.
    pub fn config(&self) -> &ViteConfig {
        &self.config
    }

    /// Attribute strings used when a render call passes no overrides.
    pub fn default_attrs(&self) -> &CompiledAttrs {
        &self.default_attrs
    }

    /// Manifest, loaded from disk on first call.
    pub fn manifest(&self) -> Result<Arc<Manifest>> {
        if let Some(manifest) = self.manifest.read().as_ref() {
            return Ok(Arc::clone(manifest));
        }

        let manifest = Arc::new(Manifest::load(&self.config.manifest)?);
        *self.manifest.write() = Some(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Dev server base URL, read verbatim from the hot file on first call.
    pub fn dev_server(&self) -> Result<Arc<str>> {
        if let Some(url) = self.dev_server.read().as_ref() {
            return Ok(Arc::clone(url));
        }

        let hot_file = &self.config.hot_file;
        let url: Arc<str> = fs::read_to_string(hot_file)
            .map_err(|err| ViteError::DevServerUnavailable {
                hot_file: hot_file.clone(),
                source: err,
            })?
            .into();
        debug!(hot_file = %hot_file.display(), url = %url, "found Vite dev server");
        *self.dev_server.write() = Some(Arc::clone(&url));
        Ok(url)
    }

    /// Map a raw asset reference to the path the bundler knows it by.
    ///
    /// Identity when static lookup is disabled. Misses fall back to the trimmed input.
    pub fn find_asset(&self, raw: &str) -> String {
        if !self.config.static_lookup {
            return raw.to_string();
        }
        if let Some(found) = self.found.read().get(raw) {
            return found.clone();
        }

        let resolved = match self.finder.find(raw) {
            Some(path) => normalize_found_path(&path, self.config.base_dir()),
            None => fallback_path(raw),
        };
        self.found
            .write()
            .insert(raw.to_string(), resolved.clone());
        resolved
    }

    /// Merge per-call attribute overrides into the configured defaults.
    pub fn compile_attrs(&self, overrides: &Attributes) -> CompiledAttrs {
        if overrides.is_empty() {
            return self.default_attrs.clone();
        }
        CompiledAttrs::new(&self.config.js_attrs, &self.config.css_attrs, overrides)
    }

    /// Tags for one already-resolved asset, through the dev server or the manifest.
    pub fn asset_tags(&self, asset: &str, attrs: &CompiledAttrs) -> Result<Vec<Tag>> {
        if self.config.dev_mode {
            let dev_server = self.dev_server()?;
            return Ok(vec![emit_dev(&dev_server, asset, attrs)]);
        }

        let manifest = self.manifest()?;
        entry_tags(
            &manifest,
            asset,
            &self.config.build_url_prefix,
            &self.default_attrs.css,
            attrs,
        )
    }

    /// Render one already-resolved asset.
    pub fn render_asset(&self, asset: &str, attrs: &CompiledAttrs) -> Result<String> {
        Ok(render_tags(&self.asset_tags(asset, attrs)?))
    }

    /// Look up and render raw asset references with the given attribute overrides.
    pub fn render<S: AsRef<str>>(&self, assets: &[S], overrides: &Attributes) -> Result<String> {
        let attrs = self.compile_attrs(overrides);
        let mut html = String::new();
        for asset in assets {
            let resolved = self.find_asset(asset.as_ref());
            html.push_str(&self.render_asset(&resolved, &attrs)?);
        }
        Ok(html)
    }

    /// Drop the cached manifest, dev server URL and static lookups.
    pub fn reset(&self) {
        *self.manifest.write() = None;
        *self.dev_server.write() = None;
        self.found.write().clear();
        debug!("cleared Vite caches");
    }
}

impl std::fmt::Debug for ViteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViteContext")
            .field("config", &self.config)
            .field("manifest_loaded", &self.manifest.read().is_some())
            .field("dev_server", &self.dev_server.read())
            .field("found", &self.found.read().len())
            .finish_non_exhaustive()
    }
}
