// packages/engine/src/main.rs
//! Pocket Proxy config checker
//!
//! Loads a redirect configuration the same way the on-device plugin does and
//! shows where each given URL would be sent.

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use pocket_proxy_engine::interception::{
    ConfigLoader, InterceptionContext, RedirectTable, RequestDescriptor,
};
use pocket_proxy_engine::observability::init_tracing;
use pocket_proxy_engine::EngineConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "pocket-proxy")]
#[command(author, version, about = "Check a Pocket Proxy redirect configuration")]
struct Args {
    /// Redirect configuration file (defaults to the on-device path)
    #[arg(short, long, env = "POCKET_PROXY__CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// URLs to resolve against the configuration
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EngineConfig::load().context("Failed to load engine settings")?;
    if let Some(path) = args.config {
        config.config_path = path;
    }
    if let Some(level) = args.log_level {
        config.log_filter = level;
    }
    config.json_logs |= args.json_logs;

    init_tracing(&config)?;

    info!("Checking redirect config at {}", config.config_path.display());
    let report = ConfigLoader::load_with_report(&config.config_path);

    let results = check_urls(&report.table, &args.urls)?;

    if args.json {
        let requests: Vec<_> = results
            .iter()
            .map(|checked| {
                serde_json::json!({
                    "url": checked.url,
                    "dispatched": checked.dispatched,
                    "redirected": checked.redirected(),
                })
            })
            .collect();

        let output = serde_json::json!({
            "config_path": config.config_path,
            "table": &report.table,
            "error": report.error.as_ref().map(ToString::to_string),
            "error_line": report.error_line(),
            "skipped_sections": &report.skipped_sections,
            "requests": requests,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", report.table.export_config());
    if let Some(error) = &report.error {
        println!("\n! {}", error);
    }
    for section in &report.skipped_sections {
        println!("! skipped section [{}]", section);
    }

    if !results.is_empty() {
        println!();
    }
    for checked in &results {
        let marker = if checked.redirected() { "redirect" } else { "passthrough" };
        println!("{} -> {} ({})", checked.url, checked.dispatched, marker);
    }

    Ok(())
}

/// One URL and the URL the original call received for it
#[derive(Debug)]
struct CheckedUrl {
    url: Url,
    dispatched: Url,
}

impl CheckedUrl {
    fn redirected(&self) -> bool {
        self.url != self.dispatched
    }
}

/// Send each URL through the entry point and record what it dispatched
fn check_urls(table: &RedirectTable, urls: &[String]) -> Result<Vec<CheckedUrl>> {
    let dispatched = Arc::new(Mutex::new(Vec::with_capacity(urls.len())));
    let sink = Arc::clone(&dispatched);
    let context = InterceptionContext::with_table(
        table.clone(),
        Box::new(move |request: RequestDescriptor| sink.lock().push(request.url)),
    );

    let mut inputs = Vec::with_capacity(urls.len());
    for raw in urls {
        let url = Url::parse(raw).with_context(|| format!("Invalid URL: {}", raw))?;
        context.intercept(RequestDescriptor::new(url.clone()));
        inputs.push(url);
    }

    let dispatched = std::mem::take(&mut *dispatched.lock());
    Ok(inputs
        .into_iter()
        .zip(dispatched)
        .map(|(url, dispatched)| CheckedUrl { url, dispatched })
        .collect())
}
