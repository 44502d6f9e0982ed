// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dnsource::{
    config::SourceConfig,
    constants::DEFAULT_WATCH_INTERVAL_SECS,
    crd::{DNSEndpoint, DNSEndpointSpec},
    crd_source::CrdSource,
    endpoint::Endpoint,
    merge::merge_endpoints,
    metrics,
    source::{Source, StaticSource},
    wrappers::{DedupSource, FilterSource, Nat64Source, PostProcessor},
};
use futures::StreamExt;
use kube::{
    runtime::{reflector, watcher, WatchStreamExt},
    Api, Client, ResourceExt,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Endpoint source layer for Kubernetes DNS synchronization.
#[derive(Debug, Parser)]
#[command(name = "dnsource", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run endpoints from a file through the source chain and print the result
    Render {
        /// File holding a list of endpoints, or an object with an `endpoints` list
        #[arg(long)]
        endpoints: PathBuf,

        /// Source configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Print Prometheus metrics to stderr after rendering
        #[arg(long, default_value_t = false)]
        metrics: bool,
    },

    /// Watch `DNSEndpoint` resources and log the converged endpoint set
    Watch {
        /// Source configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds between two renders when nothing changes
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS)]
        interval_secs: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Accepted layouts of the `render` input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndpointsFile {
    List(Vec<Endpoint>),
    Spec(DNSEndpointSpec),
}

type SourceChain<S> = PostProcessor<FilterSource<Nat64Source<DedupSource<S>>>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("dnsource")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();

    match cli.command {
        Command::Render {
            endpoints,
            config,
            format,
            metrics,
        } => render(&endpoints, config.as_deref(), format, metrics).await,
        Command::Watch {
            config,
            interval_secs,
        } => watch(config.as_deref(), interval_secs).await,
    }
}

/// Initialize logging
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
/// Logs go to stderr so that `render` output on stdout stays machine-readable.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized with file and line number tracking");
}

/// Load the configuration file, or the defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<SourceConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Ok(SourceConfig::load(path)?)
        }
        None => Ok(SourceConfig::default()),
    }
}

/// Wrap `source` as `PostProcessor(FilterSource(Nat64Source(DedupSource(source))))`.
fn build_chain<S: Source>(source: S, config: &SourceConfig) -> Result<SourceChain<S>> {
    let filters = config.validate().context("invalid source configuration")?;

    let nat64 = Nat64Source::new(DedupSource::new(source), &config.nat64_prefixes)
        .context("invalid source configuration")?;

    let mut chain = PostProcessor::new(FilterSource::new(
        nat64,
        filters.target_nets,
        filters.exclude_domains,
    ))
    .with_ttl(config.default_ttl())
    .with_prefer_alias(config.prefer_alias);

    if let Some(owner_id) = &config.owner_id {
        chain = chain.with_owner_id(owner_id.clone());
    }

    Ok(chain)
}

/// Read endpoints from a YAML or JSON file.
fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read endpoints file '{}'", path.display()))?;
    let file: EndpointsFile = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse endpoints file '{}'", path.display()))?;

    Ok(match file {
        EndpointsFile::List(endpoints) => endpoints,
        EndpointsFile::Spec(spec) => spec.endpoints,
    })
}

/// Run `endpoints` through the source chain and merge the result.
async fn render_endpoints(endpoints: Vec<Endpoint>, config: &SourceConfig) -> Result<Vec<Endpoint>> {
    let chain = build_chain(StaticSource::new(endpoints), config)?;
    let endpoints = chain.endpoints().await?;
    Ok(merge_endpoints(endpoints))
}

fn format_endpoints(endpoints: &[Endpoint], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(endpoints)?,
        OutputFormat::Yaml => serde_yaml::to_string(endpoints)?,
    })
}

async fn render(
    endpoints_path: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    print_metrics: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let endpoints = load_endpoints(endpoints_path)?;
    info!(
        "Rendering {} endpoints from {}",
        endpoints.len(),
        endpoints_path.display()
    );

    let start = Instant::now();
    let rendered = render_endpoints(endpoints, &config).await?;
    metrics::record_source_render("render", start.elapsed(), rendered.len());

    println!("{}", format_endpoints(&rendered, format)?);

    if print_metrics {
        eprintln!("{}", metrics::gather_metrics()?);
    }

    Ok(())
}

async fn watch(config_path: Option<&Path>, interval_secs: u64) -> Result<()> {
    let config = load_config(config_path)?;

    info!("Starting DNSEndpoint watch");
    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let api: Api<DNSEndpoint> = match &config.namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    };

    let (reader, writer) = reflector::store::<DNSEndpoint>();

    let mut crd_source = CrdSource::new(reader.clone(), config.controller_annotation.clone())
        .with_status_updates(client);
    if let Some(namespace) = &config.namespace {
        crd_source = crd_source.with_namespace(namespace.clone());
    }
    let crd_source = Arc::new(crd_source);

    let chain = build_chain(Arc::clone(&crd_source), &config)?;

    let changed = Arc::new(Notify::new());
    let notify = Arc::clone(&changed);
    chain.add_event_handler(Arc::new(move || notify.notify_one()));

    let watched = Arc::clone(&crd_source);
    let mut watch_task = tokio::spawn(async move {
        reflector(writer, watcher(api, watcher::Config::default()))
            .default_backoff()
            .touched_objects()
            .for_each(|event| {
                match event {
                    Ok(resource) => {
                        debug!(
                            "DNSEndpoint {}/{} changed",
                            resource.namespace().unwrap_or_default(),
                            resource.name_any()
                        );
                        watched.notify();
                    }
                    Err(e) => warn!("DNSEndpoint watch error: {}", e),
                }
                futures::future::ready(())
            })
            .await;
    });

    reader
        .wait_until_ready()
        .await
        .context("DNSEndpoint reflector stopped before its initial sync")?;
    info!("DNSEndpoint cache synced");

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = changed.notified() => {
                debug!("Rendering after DNSEndpoint change");
            }
            result = &mut shutdown => {
                result?;
                info!("Received shutdown signal, stopping DNSEndpoint watch");
                watch_task.abort();
                return Ok(());
            }
            result = &mut watch_task => {
                error!("CRITICAL: DNSEndpoint watch exited unexpectedly: {:?}", result);
                result?;
                anyhow::bail!("DNSEndpoint watch exited unexpectedly without error")
            }
        }

        render_once(&chain).await;
    }
}

async fn render_once<S: Source>(chain: &S) {
    let start = Instant::now();
    match chain.endpoints().await {
        Ok(endpoints) => {
            let endpoints = merge_endpoints(endpoints);
            metrics::record_source_render("crd", start.elapsed(), endpoints.len());
            info!("Rendered {} endpoints", endpoints.len());
            for ep in &endpoints {
                info!("{}", ep);
            }
        }
        Err(e) => error!("Failed to render endpoints: {}", e),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
