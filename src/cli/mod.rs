//! Command-line interface for docsift.
//!
//! Provides commands for analyzing a single document, running a batch,
//! checking the status of an existing operation, and inspecting the
//! resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{content_type_for, AnalysisBackend, HttpAnalysisBackend};
use crate::config::{self, ResolvedConfig};
use crate::core::{BatchOrchestrator, OperationPoller, ResultExporter};
use crate::domain::{ItemStatus, OperationStatus};

/// docsift - batch client for asynchronous document-analysis services
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single document and export its result artifacts
    Analyze {
        /// Document to analyze
        file: PathBuf,

        /// Processing profile (analyzer) to run the document through
        #[arg(short, long)]
        profile: String,

        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze many documents sequentially and write a run summary
    Batch {
        /// Input files, or a single directory to scan
        inputs: Vec<PathBuf>,

        /// Processing profile (analyzer) to run the documents through
        #[arg(short, long)]
        profile: String,

        /// Collection identifier used in the summary file name
        /// (defaults to the inputs' parent directory name)
        #[arg(short, long)]
        collection: Option<String>,

        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the current status of a previously submitted operation
    Status {
        /// Operation handle returned at submission
        handle: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze {
                file,
                profile,
                output,
            } => analyze_document(&file, &profile, output).await,
            Commands::Batch {
                inputs,
                profile,
                collection,
                output,
            } => run_batch(inputs, &profile, collection, output).await,
            Commands::Status { handle } => show_status(&handle).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the HTTP backend from resolved configuration
fn build_backend(cfg: &ResolvedConfig) -> Result<Arc<dyn AnalysisBackend>> {
    let endpoint = cfg.endpoint.clone().context(
        "no service endpoint configured; set DOCSIFT_ENDPOINT or service.endpoint in .docsift/config.yaml",
    )?;
    let api_key = cfg.api_key.clone().context(
        "no API key configured; set DOCSIFT_KEY or service.api_key in .docsift/config.yaml",
    )?;

    Ok(Arc::new(
        HttpAnalysisBackend::new(endpoint, api_key).with_api_version(cfg.api_version.clone()),
    ))
}

fn build_exporter(cfg: &ResolvedConfig, output: Option<PathBuf>) -> ResultExporter {
    let dir = output.unwrap_or_else(|| cfg.output_dir.clone());
    ResultExporter::new(dir).with_fields_pointer(cfg.fields_pointer.clone())
}

/// Analyze one document end to end
async fn analyze_document(file: &PathBuf, profile: &str, output: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;
    let backend = build_backend(cfg)?;
    let poller = OperationPoller::new(backend.clone(), cfg.poll_settings());
    let exporter = build_exporter(cfg, output);

    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read input file: {}", file.display()))?;
    let identifier = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    eprintln!("Submitting {} with profile '{}'...", identifier, profile);
    let handle = backend
        .submit(&bytes, content_type_for(file), profile)
        .await?;
    eprintln!("Operation: {}", handle);

    let operation = poller.wait_for_completion(&handle).await?;
    let result = operation
        .result
        .as_ref()
        .context("succeeded operation carried no result payload")?;

    let paths = exporter
        .export(result, Some(&identifier), Some(&handle))
        .await?;

    let digest = exporter.field_digest(result);
    if digest.is_empty() {
        println!("No fields were extracted.");
    } else {
        for (name, value) in digest {
            println!("{}: {}", name, value);
        }
    }

    eprintln!("\nStructured: {}", paths.structured.display());
    eprintln!("Rendered:   {}", paths.rendered.display());

    Ok(())
}

/// Run a batch over files or a directory
async fn run_batch(
    inputs: Vec<PathBuf>,
    profile: &str,
    collection: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::config()?;
    let backend = build_backend(cfg)?;
    let poller = OperationPoller::new(backend.clone(), cfg.poll_settings());
    let exporter = build_exporter(cfg, output);

    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("no input files to process");
    }

    let collection_id = collection.unwrap_or_else(|| derive_collection_id(&files));

    let orchestrator = BatchOrchestrator::new(backend, poller, exporter);
    let outcome = orchestrator.run(&files, profile, &collection_id).await;

    println!("{:<30} {:<10} {:>10}", "INPUT", "STATUS", "TIME (MS)");
    println!("{}", "-".repeat(52));
    for row in &outcome.summary.rows {
        let status = match row.status {
            ItemStatus::Succeeded => "succeeded",
            ItemStatus::Failed => "failed",
        };
        println!(
            "{:<30} {:<10} {:>10}",
            row.input_identifier, status, row.duration_ms
        );
        if let Some(ref message) = row.error_message {
            println!("    {}", message);
        }
    }

    println!(
        "\n{} succeeded, {} failed",
        outcome.summary.succeeded_count(),
        outcome.summary.failed_count()
    );
    match outcome.summary_path {
        Some(path) => println!("Summary: {}", path.display()),
        None => println!("Summary: (no summary produced)"),
    }

    if outcome.summary.failed_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Check an operation handle once, without waiting
async fn show_status(handle: &str) -> Result<()> {
    let cfg = config::config()?;
    let backend = build_backend(cfg)?;

    let operation = backend.fetch_status(handle).await?;

    println!("Operation: {}", operation.handle);
    println!("Status: {:?}", operation.status);
    match operation.status {
        OperationStatus::Failed => {
            println!(
                "Code: {}",
                operation.failure_code.as_deref().unwrap_or("Unknown")
            );
            println!(
                "Message: {}",
                operation.failure_message.as_deref().unwrap_or("None")
            );
        }
        OperationStatus::Succeeded => {
            println!("Result available; re-run with 'analyze' to export artifacts.");
        }
        _ => {
            println!("Still in progress.");
        }
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("docsift configuration");
    println!("{}", "-".repeat(40));
    println!(
        "Config file:    {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!(
        "Endpoint:       {}",
        cfg.endpoint.as_deref().unwrap_or("(not set)")
    );
    println!(
        "API key:        {}",
        if cfg.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("API version:    {}", cfg.api_version);
    println!("Output dir:     {}", cfg.output_dir.display());
    println!("Fields pointer: {}", cfg.fields_pointer);
    println!("Poll interval:  {:?}", cfg.interval);
    println!("Max wait:       {:?}", cfg.max_wait);

    Ok(())
}

/// Expand a single-directory argument into its files, sorted by name;
/// pass plain file lists through unchanged.
fn collect_inputs(inputs: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if inputs.len() == 1 && inputs[0].is_dir() {
        let dir = &inputs[0];
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read input directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        return Ok(files);
    }

    Ok(inputs)
}

/// Default collection identifier: the shared parent directory name.
fn derive_collection_id(files: &[PathBuf]) -> String {
    files
        .first()
        .and_then(|path| path.parent())
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_collection_id_from_parent() {
        let files = vec![PathBuf::from("/data/invoices/a.pdf")];
        assert_eq!(derive_collection_id(&files), "invoices");
    }

    #[test]
    fn test_derive_collection_id_fallback() {
        assert_eq!(derive_collection_id(&[PathBuf::from("a.pdf")]), "batch");
        assert_eq!(derive_collection_id(&[]), "batch");
    }

    #[test]
    fn test_collect_inputs_passes_files_through() {
        let inputs = vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")];
        let collected = collect_inputs(inputs.clone()).unwrap();
        assert_eq!(collected, inputs);
    }

    #[test]
    fn test_collect_inputs_expands_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.pdf"), b"b").unwrap();
        std::fs::write(temp.path().join("a.pdf"), b"a").unwrap();

        let collected = collect_inputs(vec![temp.path().to_path_buf()]).unwrap();
        let names: Vec<_> = collected
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }
}
