use crate::attrs::CompiledAttrs;

use super::tags::{Tag, emit};

/// Asset name that stands for the React fast-refresh preamble.
pub const REACT_SENTINEL: &str = "react";

/// Inline module script installing the React refresh runtime from the dev server.
pub fn react_preamble(dev_server: &str) -> String {
    format!(
        r#"<script type="module">
import RefreshRuntime from "{dev_server}/@react-refresh"
RefreshRuntime.injectIntoGlobalHook(window)
window.$RefreshReg$ = () => {{}}
window.$RefreshSig$ = () => (type) => type
window.__vite_plugin_react_preamble_installed__ = true
</script>
"#
    )
}

/// Render `url` as served by the dev server at `dev_server`.
pub fn emit_dev(dev_server: &str, url: &str, attrs: &CompiledAttrs) -> Tag {
    if url == REACT_SENTINEL {
        return Tag::Inline(react_preamble(dev_server));
    }
    emit(&format!("{dev_server}/{url}"), attrs)
}
