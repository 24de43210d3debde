mod catalog;
mod config;
mod http;
mod report;
mod runner;
mod sink;
mod template;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use http::executor::{Executor, DEFAULT_TIMEOUT};
use http::transport::ReqwestTransport;
use runner::Runner;

#[derive(Debug, Parser)]
#[command(
    name = "probegrid",
    about = "Probes a REST API under multiple credential tiers and renders a permission matrix"
)]
struct Args {
    /// Path to the JSON config file (base URL, roles, placeholders).
    #[arg(long, default_value = "probegrid.json")]
    config: PathBuf,

    /// Optional custom endpoint catalog; defaults to the built-in set.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Override the config file's base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Override the per-call timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Where to write the CSV permission matrix.
    #[arg(long, default_value = "api-permissions-matrix.csv")]
    matrix_out: PathBuf,

    /// Where to write the YAML detail log.
    #[arg(long, default_value = "api-test-results.yaml")]
    detail_out: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = config::load(&args.config)?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }

    let definitions = match &args.catalog {
        Some(path) => catalog::load_custom(path)?,
        None => catalog::builtin(),
    };
    if definitions.is_empty() {
        return Err("the endpoint catalog is empty; nothing to probe".into());
    }

    let timeout = args
        .timeout_secs
        .or(config.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let credentials = config.credential_set();
    let placeholders = config.placeholder_map();

    tracing::info!(
        base_url = %config.base_url,
        roles = credentials.len(),
        endpoints = definitions.len(),
        "starting probe run"
    );

    let transport = ReqwestTransport::new()?;
    let executor = Executor::new(Box::new(transport), timeout);
    let outcomes = Runner::new(&executor, &config.base_url, &placeholders)
        .run(&credentials, &definitions)
        .await;

    let rows = runner::resolved_rows(&definitions, &placeholders);
    let roles = credentials.roles();
    let matrix = report::matrix::matrix_document(&outcomes, &rows, &roles, chrono::Utc::now());
    let detail = report::detail::detail_document(&outcomes)?;

    sink::persist(&args.matrix_out, &matrix)?;
    tracing::info!(path = %args.matrix_out.display(), "permission matrix written");
    sink::persist(&args.detail_out, &detail)?;
    tracing::info!(path = %args.detail_out.display(), "detail log written");

    Ok(())
}
