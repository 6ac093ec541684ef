//! Depth-first traversal of manifest imports collecting stylesheet links.

use std::collections::BTreeSet;

use crate::attrs::CompiledAttrs;
use crate::error::{Result, ViteError};
use crate::html::{Tag, emit, join_url};

use super::store::Manifest;

/// Collect the `<link>` tags for every stylesheet reachable from `key`.
///
/// Imports are walked before the entry's own `css` list, each in listed order, and every
/// stylesheet is emitted once at the position it is first discovered.
pub fn collect_css(
  manifest: &Manifest,
  key: &str,
  prefix: &str,
  css_attrs: &str,
) -> Result<Vec<Tag>> {
  let mut walker = CssWalker::new(manifest, prefix, css_attrs);
  walker.visit(key)?;
  Ok(walker.finish())
}

/// Render a production entry: its stylesheets followed by the entry's own tag.
///
/// Stylesheet dependencies always use `default_css_attrs`; per-call overrides in `attrs` only
/// reach the entry itself.
pub fn entry_tags(
  manifest: &Manifest,
  key: &str,
  prefix: &str,
  default_css_attrs: &str,
  attrs: &CompiledAttrs,
) -> Result<Vec<Tag>> {
  let entry = manifest.get(key)?;
  let mut tags = collect_css(manifest, key, prefix, default_css_attrs)?;
  tags.push(emit(&join_url(prefix, &entry.file), attrs));
  Ok(tags)
}

/// Stateful walker; reusable across several entries to share the set of emitted stylesheets.
#[derive(Debug)]
pub struct CssWalker<'a> {
  manifest: &'a Manifest,
  prefix: &'a str,
  css_attrs: &'a str,
  visited: BTreeSet<String>,
  walked: BTreeSet<&'a str>,
  in_progress: Vec<&'a str>,
  tags: Vec<Tag>,
}

impl<'a> CssWalker<'a> {
  /// Start a walk with nothing emitted yet.
  pub fn new(manifest: &'a Manifest, prefix: &'a str, css_attrs: &'a str) -> Self {
    Self {
      manifest,
      prefix,
      css_attrs,
      visited: BTreeSet::new(),
      walked: BTreeSet::new(),
      in_progress: Vec::new(),
      tags: Vec::new(),
    }
  }

  /// Walk `key` and everything it imports, appending newly discovered stylesheets.
  pub fn visit(&mut self, key: &'a str) -> Result<()> {
    if let Some(start) = self.in_progress.iter().position(|open| *open == key) {
      let mut chain: Vec<String> = self.in_progress[start..]
        .iter()
        .map(|open| open.to_string())
        .collect();
      chain.push(key.to_string());
      return Err(ViteError::CyclicManifest { chain });
    }

    // a finished entry has already emitted all of its stylesheets
    if self.walked.contains(key) {
      return Ok(());
    }

    let manifest = self.manifest;
    let entry = manifest.get(key)?;

    self.in_progress.push(key);
    for import in &entry.imports {
      self.visit(import)?;
    }
    self.in_progress.pop();

    for css in &entry.css {
      if self.visited.insert(css.clone()) {
        self
          .tags
          .push(Tag::link(self.css_attrs, join_url(self.prefix, css)));
      }
    }
    self.walked.insert(key);
    Ok(())
  }

  /// Stylesheet paths emitted so far.
  pub fn visited(&self) -> &BTreeSet<String> {
    &self.visited
  }

  /// Tags in emission order.
  pub fn finish(self) -> Vec<Tag> {
    self.tags
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::html::render_tags;
  use crate::manifest::ManifestEntry;

  const CSS: &str = r#"rel="stylesheet""#;

  fn entry(file: &str, imports: &[&str], css: &[&str]) -> ManifestEntry {
    ManifestEntry {
      file: file.into(),
      imports: imports.iter().map(|value| value.to_string()).collect(),
      css: css.iter().map(|value| value.to_string()).collect(),
    }
  }

  fn hrefs(tags: &[Tag]) -> Vec<&str> {
    tags.iter().filter_map(Tag::url).collect()
  }

  #[test]
  fn imported_css_precedes_own_css_without_duplicates() {
    let manifest: Manifest = [
      ("main.js", entry("main-abc.js", &["shared.js"], &["main.css"])),
      ("shared.js", entry("shared-def.js", &[], &["shared.css", "main.css"])),
    ]
    .into_iter()
    .collect();

    let attrs = CompiledAttrs {
      js: r#"type="module""#.into(),
      css: CSS.into(),
    };
    let tags = entry_tags(&manifest, "main.js", "/static/", CSS, &attrs).unwrap();

    assert_eq!(render_tags(&tags), concat!(
      r#"<link rel="stylesheet" href="/static/shared.css" />"#,
      r#"<link rel="stylesheet" href="/static/main.css" />"#,
      r#"<script type="module" src="/static/main-abc.js"></script>"#,
    ));
  }

  #[test]
  fn diamond_imports_emit_shared_css_once_at_first_discovery() {
    let manifest: Manifest = [
      ("app.js", entry("app.js", &["a.js", "b.js"], &["app.css"])),
      ("a.js", entry("a.js", &["base.js"], &["a.css"])),
      ("b.js", entry("b.js", &["base.js"], &["b.css", "a.css"])),
      ("base.js", entry("base.js", &[], &["base.css"])),
    ]
    .into_iter()
    .collect();

    let tags = collect_css(&manifest, "app.js", "/", CSS).unwrap();
    assert_eq!(hrefs(&tags), vec!["/base.css", "/a.css", "/b.css", "/app.css"]);
  }

  #[test]
  fn layered_shared_chunks_are_walked_once() {
    const LAYERS: usize = 40;
    let name = |layer: usize, side: char| format!("l{layer}{side}");
    let manifest: Manifest = (0..LAYERS)
      .flat_map(|layer| ['a', 'b'].map(|side| (layer, side)))
      .map(|(layer, side)| {
        let imports = if layer + 1 < LAYERS {
          vec![format!("{}.js", name(layer + 1, 'a')), format!("{}.js", name(layer + 1, 'b'))]
        } else {
          Vec::new()
        };
        let entry = ManifestEntry {
          file: format!("{}.js", name(layer, side)),
          imports,
          css: vec![format!("{}.css", name(layer, side))],
        };
        (format!("{}.js", name(layer, side)), entry)
      })
      .collect();

    let tags = collect_css(&manifest, "l0a.js", "/", CSS).unwrap();

    let mut expected: Vec<String> = (1..LAYERS)
      .rev()
      .flat_map(|layer| ['a', 'b'].map(|side| format!("/{}.css", name(layer, side))))
      .collect();
    expected.push("/l0a.css".to_string());
    assert_eq!(hrefs(&tags), expected);
  }

  #[test]
  fn entry_without_css_yields_nothing() {
    let manifest: Manifest = [("app.js", entry("app.js", &[], &[]))].into_iter().collect();
    assert!(collect_css(&manifest, "app.js", "/", CSS).unwrap().is_empty());
  }

  #[test]
  fn missing_import_is_reported() {
    let manifest: Manifest = [("app.js", entry("app.js", &["gone.js"], &[]))]
      .into_iter()
      .collect();

    let err = collect_css(&manifest, "app.js", "/", CSS).unwrap_err();
    assert!(matches!(err, ViteError::MissingManifestEntry { ref key } if key == "gone.js"));
  }

  #[test]
  fn cycles_fail_fast_with_chain() {
    let manifest: Manifest = [
      ("a.js", entry("a.js", &["b.js"], &[])),
      ("b.js", entry("b.js", &["c.js"], &[])),
      ("c.js", entry("c.js", &["b.js"], &[])),
    ]
    .into_iter()
    .collect();

    let err = collect_css(&manifest, "a.js", "/", CSS).unwrap_err();
    match err {
      ViteError::CyclicManifest { chain } => assert_eq!(chain, vec!["b.js", "c.js", "b.js"]),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn walker_shares_visited_set_across_entries() {
    let manifest: Manifest = [
      ("one.js", entry("one.js", &[], &["common.css", "one.css"])),
      ("two.js", entry("two.js", &[], &["common.css", "two.css"])),
    ]
    .into_iter()
    .collect();

    let mut walker = CssWalker::new(&manifest, "/", CSS);
    walker.visit("one.js").unwrap();
    walker.visit("two.js").unwrap();
    assert_eq!(walker.visited().len(), 3);
    assert_eq!(hrefs(&walker.finish()), vec!["/common.css", "/one.css", "/two.css"]);
  }
}
