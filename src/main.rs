//! `vite-tags` command line entry point.
//!
//! Answers the bundler plugin's questions about the host project:
//! - `config` - effective configuration as JSON
//! - `find` - static lookup results for raw asset references
//! - `render` - the HTML a template directive would produce
//! - `version` - crate version as a JSON string

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vite_asset_tags::admin::{config_report, find_static_assets};
use vite_asset_tags::config::DEFAULT_SETTINGS_FILE;
use vite_asset_tags::{AttrValue, Attributes, HostSettings, ViteContext};

#[derive(Debug, Parser)]
#[command(name = "vite-tags", version, about = "Resolve Vite assets for server-rendered pages")]
struct Cli {
    /// Host settings file.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective configuration as JSON.
    Config,
    /// Resolve raw asset references through the static lookup.
    Find {
        /// Raw asset references.
        #[arg(required = true)]
        assets: Vec<String>,
    },
    /// Render the tags for the given assets.
    Render {
        /// Raw asset references.
        assets: Vec<String>,
        /// Attribute override, `name=value` or a bare `name` flag.
        #[arg(long = "attr", value_name = "NAME[=VALUE]")]
        attrs: Vec<String>,
    },
    /// Print the crate version as JSON.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Version => {
            print!("{}", serde_json::to_string(env!("CARGO_PKG_VERSION"))?);
        }
        Command::Config => {
            let (host, ctx) = load(&cli.settings)?;
            println!("{}", serde_json::to_string(&config_report(&ctx, &host))?);
        }
        Command::Find { assets } => {
            let (_, ctx) = load(&cli.settings)?;
            println!("{}", serde_json::to_string(&find_static_assets(&ctx, &assets))?);
        }
        Command::Render { assets, attrs } => {
            let (_, ctx) = load(&cli.settings)?;
            let overrides = parse_attrs(&attrs);
            let assets = if assets.is_empty() && ctx.config().dev_mode {
                vec![ctx.config().ws_client.clone()]
            } else {
                assets
            };
            let html = ctx
                .render(&assets, &overrides)
                .context("failed to render asset tags")?;
            println!("{html}");
        }
    }

    Ok(())
}

fn load(settings: &Path) -> Result<(HostSettings, ViteContext)> {
    let host = HostSettings::from_path(settings)
        .with_context(|| format!("failed to load settings from {}", settings.display()))?;
    let ctx = ViteContext::from_host(&host);
    Ok((host, ctx))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_attrs(raw: &[String]) -> Attributes {
    raw.iter()
        .map(|item| match item.split_once('=') {
            Some((name, value)) => (name.to_string(), AttrValue::from(value)),
            None => (item.clone(), AttrValue::Bool(true)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_values() {
        let attrs = parse_attrs(&["defer".to_string(), "nonce=abc".to_string()]);
        assert_eq!(attrs.compile(), r#"defer nonce="abc""#);
    }

    #[test]
    fn cli_accepts_render_overrides() {
        let cli = Cli::try_parse_from([
            "vite-tags",
            "render",
            "home/js/app.js",
            "--attr",
            "defer",
            "--settings",
            "site.json",
        ])
        .unwrap();

        assert_eq!(cli.settings, PathBuf::from("site.json"));
        match cli.command {
            Command::Render { assets, attrs } => {
                assert_eq!(assets, vec!["home/js/app.js"]);
                assert_eq!(attrs, vec!["defer"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
