//! # stream-relay CLI
//!
//! Command-line interface for the stream-relay library.
//! Pipes a file from a download URL straight into an upload URL.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::error;
use serde_json::{Map, Value};
use stream_relay::{
    execute_items, resolve_headers, TransferEngine, TransferOptions, TransferRequest,
    TransportConfig,
};

mod cli;

/// Command-line interface for stream-relay
#[derive(Parser)]
#[command(name = "stream-relay")]
#[command(about = "Stream a file from one URL directly into an upload to another")]
#[command(long_about = "Relays a file without storing it, locally or in memory:
  stream-relay https://d.example/file.zip https://u.example/upload
  stream-relay SRC 'https://u.example/upload?bearer=TOKEN'   # token sent as Authorization
  stream-relay SRC DST -X PUT --upload-header 'X-Api-Key: k'
  stream-relay --items transfers.json --continue-on-fail

Items files hold a JSON array of objects with the keys downloadUrl, uploadUrl,
method, contentLength, downloadHeaders, uploadHeaders and throwOnError.")]
#[command(version = env!("STREAM_RELAY_VERSION"))]
struct Cli {
    /// URL to download the file from
    #[arg(required_unless_present = "items")]
    download_url: Option<String>,

    /// URL to upload the file to
    #[arg(required_unless_present = "items")]
    upload_url: Option<String>,

    /// HTTP method for the upload: POST or PUT
    #[arg(short = 'X', long, default_value = "POST")]
    method: String,

    /// File size in bytes (detected from the download when omitted)
    #[arg(long)]
    content_length: Option<String>,

    /// Extra download header as NAME:VALUE (repeatable)
    #[arg(long = "download-header", value_name = "NAME:VALUE")]
    download_header: Vec<String>,

    /// Extra upload header as NAME:VALUE (repeatable)
    #[arg(long = "upload-header", value_name = "NAME:VALUE")]
    upload_header: Vec<String>,

    /// Download headers as a JSON object
    #[arg(long, value_name = "JSON")]
    download_headers: Option<String>,

    /// Upload headers as a JSON object
    #[arg(long, value_name = "JSON")]
    upload_headers: Option<String>,

    /// Report failed transfers as error records instead of failing
    #[arg(long)]
    no_throw: bool,

    /// Run every item of a JSON items file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["download_url", "upload_url"])]
    items: Option<PathBuf>,

    /// Keep going after an item fails, recording the error for that item
    #[arg(long)]
    continue_on_fail: bool,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,

    /// Overall timeout per request in seconds (none by default)
    #[arg(long)]
    timeout: Option<u64>,

    /// Show what would be sent without transferring anything
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output and a progress bar
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging to stderr
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        eprintln!("📦 stream-relay v{} starting...", env!("STREAM_RELAY_VERSION"));
    }

    let items = match &cli.items {
        Some(path) => cli::items::load_items(path)?,
        None => vec![single_item(&cli)?],
    };

    if cli.dry_run {
        for (index, item) in items.iter().enumerate() {
            show_dry_run(index, item);
        }
        return Ok(());
    }

    let config = TransportConfig {
        connect_timeout: Some(Duration::from_secs(cli.connect_timeout)),
        request_timeout: cli.timeout.map(Duration::from_secs),
        ..Default::default()
    };

    let progress_manager = cli
        .verbose
        .then(|| cli::ProgressManager::new(&format!("🌐 Relaying {} item(s)", items.len())));
    let options = TransferOptions {
        progress: progress_manager.as_ref().map(|manager| manager.callback()),
    };

    let engine = TransferEngine::with_config(&config)?.with_options(options);
    let outcome = execute_items(&engine, &items, items.len(), cli.continue_on_fail).await;

    if let Some(manager) = &progress_manager {
        manager.finish();
    }

    let outputs = outcome?;
    let rendered = serde_json::to_string_pretty(&outputs).context("Failed to render results")?;
    println!("{rendered}");

    Ok(())
}

/// Build the parameter item for a single transfer given on the command line
fn single_item(cli: &Cli) -> anyhow::Result<Map<String, Value>> {
    let mut item = Map::new();
    item.insert(
        "downloadUrl".to_string(),
        Value::String(cli.download_url.clone().unwrap_or_default()),
    );
    item.insert(
        "uploadUrl".to_string(),
        Value::String(cli.upload_url.clone().unwrap_or_default()),
    );
    item.insert("method".to_string(), Value::String(cli.method.clone()));
    if let Some(length) = &cli.content_length {
        item.insert("contentLength".to_string(), Value::String(length.clone()));
    }
    item.insert(
        "downloadHeaders".to_string(),
        cli::items::header_parameter(cli.download_headers.as_deref(), &cli.download_header)?,
    );
    item.insert(
        "uploadHeaders".to_string(),
        cli::items::header_parameter(cli.upload_headers.as_deref(), &cli.upload_header)?,
    );
    item.insert("throwOnError".to_string(), Value::Bool(!cli.no_throw));
    Ok(item)
}

/// Show the resolved request for an item without sending it
fn show_dry_run(index: usize, item: &Map<String, Value>) {
    let params = vec![item.clone()];
    match TransferRequest::from_parameters(&params, 0) {
        Ok(request) => {
            let headers = resolve_headers(&request);
            eprintln!(
                "🔍 [DRY RUN] Item {index}: would relay {} -> {} ({})",
                request.download_url, request.upload_url, request.method
            );
            for (name, value) in &headers.download {
                eprintln!("    download  {name}: {value}");
            }
            for (name, value) in &headers.upload {
                let shown = if name.eq_ignore_ascii_case("authorization") {
                    "<redacted>"
                } else {
                    value.as_str()
                };
                eprintln!("    upload    {name}: {shown}");
            }
        }
        Err(e) => eprintln!("🔍 [DRY RUN] Item {index}: invalid ({e})"),
    }
}
