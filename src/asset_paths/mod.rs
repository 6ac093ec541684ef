//! Mapping logical asset references to the paths the bundler knows them by.
//!
//! The finder locates files on disk, and normalisation turns the hit (or the raw reference on a
//! miss) into the forward-slash, project-relative form used as a manifest key.

mod finder;
mod normalize;

pub use finder::{StaticDirsFinder, StaticFinder};
pub use normalize::{fallback_path, normalize_found_path};
