//! The `vite` template directive: argument parsing and per-render resolution.
//!
//! Template engines hand over the directive's raw argument tokens; everything engine specific
//! (tag registration, variable syntax) stays with the host.

mod node;
mod parse;

pub use node::AssetTag;
pub use parse::{
    AssetRef, AttrSource, Directive, RenderScope, Variable, parse_directive, tokenize,
};
