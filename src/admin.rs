//! Read-only introspection used by the bundler plugin and the command line tool.

use serde_json::{Map, Value};

use crate::config::HostSettings;
use crate::context::ViteContext;

/// Effective configuration as JSON, in the shape the bundler plugin reads.
///
/// `BUILD_DIR` is trimmed of surrounding separators when relative, and `INSTALLED_APPS` maps each
/// top-level app label to its directory so the plugin can build import aliases.
pub fn config_report(ctx: &ViteContext, host: &HostSettings) -> Value {
    let mut report = match serde_json::to_value(ctx.config()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let build_dir = ctx.config().build_dir.to_string_lossy().into_owned();
    let build_dir = if ctx.config().build_dir.is_absolute() {
        build_dir
    } else {
        build_dir.trim_matches(['/', '\\']).to_string()
    };
    report.insert("BUILD_DIR".into(), Value::String(build_dir));

    let apps: Map<String, Value> = host
        .installed_apps
        .iter()
        .filter(|app| !app.name.contains('.'))
        .map(|app| {
            let path = host.app_dir(app).to_string_lossy().into_owned();
            (app.name.clone(), Value::String(path))
        })
        .collect();
    report.insert("INSTALLED_APPS".into(), Value::Object(apps));

    Value::Object(report)
}

/// Resolve raw asset references the same way templates do.
pub fn find_static_assets<S: AsRef<str>>(ctx: &ViteContext, assets: &[S]) -> Vec<String> {
    assets
        .iter()
        .map(|asset| ctx.find_asset(asset.as_ref()))
        .collect()
}
