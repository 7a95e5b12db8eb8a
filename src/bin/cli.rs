use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jobflow::prelude::*;
use jobflow::LoggingListener;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "jobflow")]
#[command(about = "Run conditional job pipelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline file
    Run {
        /// Path to the pipeline YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a pipeline file without running it
    Validate {
        /// Path to the pipeline YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the jobs and transitions of a pipeline file
    Graph {
        /// Path to the pipeline YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) -> anyhow::Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose { "jobflow=debug" } else { "jobflow=info" };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("jobflow");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
    Ok(())
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose { "jobflow=debug" } else { "jobflow=info" };

    // stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    if let Err(e) = init_otel_tracing(cli.verbose) {
        eprintln!("Error: failed to initialize tracing: {:#}", e);
        return ExitCode::from(2);
    }

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "jobflow failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run { file, json } => run_pipeline(file, json).await,
        Commands::Validate { file } => validate(file),
        Commands::Graph { file } => graph(file),
    }
}

fn load(file: &Path) -> anyhow::Result<PipelineDefinition> {
    if !file.exists() {
        anyhow::bail!("Pipeline file not found: {}", file.display());
    }
    Ok(PipelineLoader::load_file(file)?)
}

#[tracing::instrument(skip(file, json), fields(file = %file.display()))]
async fn run_pipeline(file: PathBuf, json: bool) -> anyhow::Result<bool> {
    let definition = load(&file)?;
    let pipeline = definition.builder()?.listener(LoggingListener).build()?;

    if !json {
        println!("Running pipeline: {} ({})\n", pipeline.name(), file.display());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling pipeline");
            on_interrupt.cancel();
        }
    });

    let report = pipeline.execute_with(&cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_pipeline_report(&report);
    }
    Ok(report.succeeded())
}

fn validate(file: PathBuf) -> anyhow::Result<bool> {
    let definition = load(&file)?;
    definition.validate()?;

    let transitions: usize = definition.jobs.values().map(|j| j.transitions.len()).sum();
    println!(
        "✓ {} is valid: {} jobs, {} transitions",
        file.display(),
        definition.jobs.len(),
        transitions
    );
    Ok(true)
}

fn graph(file: PathBuf) -> anyhow::Result<bool> {
    let definition = load(&file)?;
    definition.validate()?;

    let start = definition.start_job().unwrap_or_default();
    println!("{} (start: {})", definition.name, start);
    for (name, job) in &definition.jobs {
        println!("  {}", name);
        for transition in &job.transitions {
            println!("    {} -> {}", transition.when, transition.then);
        }
    }
    Ok(true)
}

fn print_pipeline_report(report: &PipelineReport) {
    println!("\n=== Pipeline Result ===\n");
    println!("Success: {}", if report.succeeded() { "YES" } else { "NO" });
    println!("Run ID: {}", report.run_id);
    if let Termination::CycleDetected { job_name, .. } = &report.termination {
        println!("Stopped: job '{}' would have run twice", job_name);
    }
    println!();

    for (_, job_report) in report.iter() {
        let marker = if job_report.status.is_completed() {
            "✓"
        } else if job_report.status.is_failed() {
            "✗"
        } else {
            "•"
        };
        println!("{} Job: {} [{}]", marker, job_report.job_name, job_report.status);
        if let Some(err) = &job_report.error {
            println!("    Error: {}", err);
        }
    }
}
