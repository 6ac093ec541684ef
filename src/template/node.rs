//! A parsed `vite` directive ready to render.

use crate::attrs::{Attributes, CompiledAttrs};
use crate::context::ViteContext;
use crate::error::Result;

use super::parse::{AssetRef, AttrSource, Directive, RenderScope, parse_directive};

/// Parsed directive with as much work as possible done up front.
///
/// Fully literal directives are rendered once at parse time; directives with only deferred paths
/// compile their attributes once.
#[derive(Debug, Clone)]
pub struct AssetTag {
    assets: Vec<AssetRef>,
    attrs: AttrPlan,
    html: Option<String>,
}

#[derive(Debug, Clone)]
enum AttrPlan {
    Compiled(CompiledAttrs),
    Deferred(Vec<(String, AttrSource)>),
}

impl AssetTag {
    /// Parse directive arguments and pre-render what does not depend on the template scope.
    pub fn new<S: AsRef<str>>(ctx: &ViteContext, bits: &[S]) -> Result<Self> {
        Self::from_directive(ctx, parse_directive(ctx, bits))
    }

    /// Build from already classified arguments.
    pub fn from_directive(ctx: &ViteContext, directive: Directive) -> Result<Self> {
        let has_deferred_path = directive.has_deferred_path();
        let attrs = if directive.has_deferred_attr() {
            AttrPlan::Deferred(directive.attrs)
        } else {
            let literal: Attributes = directive
                .attrs
                .into_iter()
                .filter_map(|(name, source)| match source {
                    AttrSource::Literal(value) => Some((name, value)),
                    AttrSource::Deferred(_) => None,
                })
                .collect();
            AttrPlan::Compiled(ctx.compile_attrs(&literal))
        };

        let mut tag = Self {
            assets: directive.assets,
            attrs,
            html: None,
        };
        if let (AttrPlan::Compiled(compiled), false) = (&tag.attrs, has_deferred_path) {
            tag.html = Some(render_literals(ctx, &tag.assets, compiled)?);
        }
        Ok(tag)
    }

    /// Whether the output was fixed at parse time.
    pub fn is_static(&self) -> bool {
        self.html.is_some()
    }

    /// Render against the current template scope.
    pub fn render(&self, ctx: &ViteContext, scope: &dyn RenderScope) -> Result<String> {
        if let Some(html) = &self.html {
            return Ok(html.clone());
        }

        let resolved;
        let attrs = match &self.attrs {
            AttrPlan::Compiled(compiled) => compiled,
            AttrPlan::Deferred(sources) => {
                let overrides: Attributes = sources
                    .iter()
                    .filter_map(|(name, source)| {
                        let value = match source {
                            AttrSource::Literal(value) => Some(value.clone()),
                            AttrSource::Deferred(variable) => variable.resolve(scope),
                        };
                        value.map(|value| (name.clone(), value))
                    })
                    .collect();
                resolved = ctx.compile_attrs(&overrides);
                &resolved
            }
        };

        let mut html = String::new();
        for asset in &self.assets {
            let path = match asset {
                AssetRef::Literal(path) => path.clone(),
                AssetRef::Deferred(variable) => {
                    let Some(value) = variable.resolve(scope) else {
                        continue;
                    };
                    let Some(path) = value.as_path() else {
                        continue;
                    };
                    ctx.find_asset(path)
                }
            };
            html.push_str(&ctx.render_asset(&path, attrs)?);
        }
        Ok(html)
    }
}

fn render_literals(ctx: &ViteContext, assets: &[AssetRef], attrs: &CompiledAttrs) -> Result<String> {
    let mut html = String::new();
    for asset in assets {
        if let AssetRef::Literal(path) = asset {
            html.push_str(&ctx.render_asset(path, attrs)?);
        }
    }
    Ok(html)
}
