#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod admin;
pub mod asset_paths;
pub mod attrs;
pub mod config;
pub mod context;
pub mod error;
pub mod html;
pub mod manifest;
pub mod template;

pub use attrs::{AttrValue, Attributes, CompiledAttrs};
pub use config::{HostSettings, ViteConfig};
pub use context::ViteContext;
pub use error::{Result, ViteError};
pub use html::Tag;
pub use manifest::{Manifest, ManifestEntry};
pub use template::{AssetTag, RenderScope};
