use std::fmt;

use crate::attrs::CompiledAttrs;

/// Suffixes rendered as stylesheet links rather than scripts.
pub const CSS_EXTENSIONS: &[&str] = &[".css", ".scss", ".sass", ".less"];

/// A single rendered asset tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
  /// `<link {attrs} href="{href}" />`
  Link {
    /// Compiled attribute string.
    attrs: String,
    /// Stylesheet URL.
    href: String,
  },
  /// `<script {attrs} src="{src}"></script>`
  Script {
    /// Compiled attribute string.
    attrs: String,
    /// Script URL.
    src: String,
  },
  /// Markup emitted verbatim.
  Inline(String),
}

impl Tag {
  /// Stylesheet link.
  pub fn link(attrs: impl Into<String>, href: impl Into<String>) -> Self {
    Tag::Link {
      attrs: attrs.into(),
      href: href.into(),
    }
  }

  /// External script.
  pub fn script(attrs: impl Into<String>, src: impl Into<String>) -> Self {
    Tag::Script {
      attrs: attrs.into(),
      src: src.into(),
    }
  }

  /// URL referenced by the tag, if any.
  pub fn url(&self) -> Option<&str> {
    match self {
      Tag::Link { href, .. } => Some(href),
      Tag::Script { src, .. } => Some(src),
      Tag::Inline(_) => None,
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tag::Link { attrs, href } if attrs.is_empty() => write!(f, r#"<link href="{href}" />"#),
      Tag::Link { attrs, href } => write!(f, r#"<link {attrs} href="{href}" />"#),
      Tag::Script { attrs, src } if attrs.is_empty() => {
        write!(f, r#"<script src="{src}"></script>"#)
      }
      Tag::Script { attrs, src } => write!(f, r#"<script {attrs} src="{src}"></script>"#),
      Tag::Inline(markup) => f.write_str(markup),
    }
  }
}

/// Concatenate rendered tags.
pub fn render_tags(tags: &[Tag]) -> String {
  tags.iter().map(Tag::to_string).collect()
}

/// Whether `url` names a stylesheet.
pub fn is_css(url: &str) -> bool {
  CSS_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

/// Render `url` as a link or script tag depending on its suffix.
pub fn emit(url: &str, attrs: &CompiledAttrs) -> Tag {
  if is_css(url) {
    Tag::link(attrs.css.as_str(), url)
  } else {
    Tag::script(attrs.js.as_str(), url)
  }
}

/// Resolve `path` against the public URL `prefix`.
///
/// Absolute URLs are returned unchanged and root-relative paths keep only the prefix origin.
pub fn join_url(prefix: &str, path: &str) -> String {
  if has_scheme(path) || path.starts_with("//") {
    return path.to_string();
  }

  if path.starts_with('/') {
    return match origin(prefix) {
      Some(origin) => format!("{origin}{path}"),
      None => path.to_string(),
    };
  }

  if prefix.ends_with('/') || prefix.is_empty() {
    format!("{prefix}{path}")
  } else {
    match prefix.rfind('/') {
      Some(idx) if idx >= authority_end(prefix) => format!("{}/{path}", &prefix[..idx]),
      _ => format!("{prefix}/{path}"),
    }
  }
}

fn has_scheme(url: &str) -> bool {
  match url.find("://") {
    Some(idx) if idx > 0 => url[..idx]
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
    _ => false,
  }
}

fn authority_start(url: &str) -> Option<usize> {
  if has_scheme(url) {
    url.find("://").map(|idx| idx + 3)
  } else if url.starts_with("//") {
    Some(2)
  } else {
    None
  }
}

fn authority_end(url: &str) -> usize {
  match authority_start(url) {
    Some(start) => url[start..]
      .find('/')
      .map(|idx| start + idx)
      .unwrap_or(url.len()),
    None => 0,
  }
}

fn origin(prefix: &str) -> Option<&str> {
  authority_start(prefix).map(|_| &prefix[..authority_end(prefix)])
}
