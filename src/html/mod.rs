//! Markup for resolved assets, for both the production build and the dev server.

mod dev;
mod tags;

pub use dev::{REACT_SENTINEL, emit_dev, react_preamble};
pub use tags::{CSS_EXTENSIONS, Tag, emit, is_css, join_url, render_tags};
