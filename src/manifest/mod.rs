//! Vite manifest loading and the stylesheet dependency walk.

mod store;
mod walk;

pub use store::{Manifest, ManifestEntry};
pub use walk::{CssWalker, collect_css, entry_tags};
