use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cdmodel_core::{Config, Document, JsonObject, ModelError};
use cdmodel_stage::{list_files_in_folder, Stager};

/// cdmodel - Schema document checking, formatting and staging
#[derive(Parser)]
#[command(name = "cdmodel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: cdmodel.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate schema documents
    Check {
        /// Documents to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Rewrite a document in canonical form
    Fmt {
        /// Document to format
        file: PathBuf,

        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective traits of a purpose or parameters of a trait
    Resolve {
        /// Document holding the definition
        file: PathBuf,

        #[command(flatten)]
        target: ResolveTarget,
    },

    /// Mirror schema documents into the distribution directory
    Stage {
        /// Source directory (overrides [staging].source)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Destination directory (overrides [staging].destination)
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// List the files directly inside a directory
    List {
        /// Directory to list
        dir: PathBuf,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ResolveTarget {
    /// Purpose to resolve
    #[arg(long)]
    purpose: Option<String>,

    /// Trait definition to resolve
    #[arg(long = "trait")]
    trait_name: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if Path::new("cdmodel.toml").exists() {
        Config::from_file(Path::new("cdmodel.toml")).context("Failed to load cdmodel.toml")?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Check { files } => check_command(&files, cli.verbose),
        Commands::Fmt { file, output } => fmt_command(&file, output.as_deref()),
        Commands::Resolve { file, target } => resolve_command(&file, &target),
        Commands::Stage { source, destination } => stage_command(config, source, destination),
        Commands::List { dir } => list_command(&dir),
    }
}

/// Check command - load, validate and round-trip each document
fn check_command(files: &[PathBuf], verbose: bool) -> Result<()> {
    let mut failures = 0;

    for path in files {
        match check_document(path) {
            Ok(summary) => {
                println!("{} {}", "✓".green(), path.display());
                if verbose {
                    println!("    {}", summary);
                }
            }
            Err(e) => {
                failures += 1;
                println!("{} {}: {:#}", "✗".red().bold(), path.display(), e);
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{}", format!("All {} document(s) passed", files.len()).green().bold());
        Ok(())
    } else {
        println!(
            "{}",
            format!("{} of {} document(s) failed", failures, files.len()).red().bold()
        );
        std::process::exit(1);
    }
}

fn check_document(path: &Path) -> Result<String> {
    let document = Document::from_file(path)?;

    let reparsed = Document::from_json(&document.to_json()).context("Canonical form failed to reload")?;
    if reparsed != document {
        anyhow::bail!("Canonical form does not reload to the same document");
    }

    // Resolution surfaces cycles; names defined elsewhere are left to their own documents
    let purposes: Vec<String> = document.purposes().map(|p| p.purpose_name.clone()).collect();
    for name in &purposes {
        match document.resolve_purpose(name) {
            Ok(_) | Err(ModelError::UnresolvedReference { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let traits: Vec<String> = document.trait_definitions().map(|t| t.trait_name.clone()).collect();
    for name in &traits {
        match document.resolve_trait(name) {
            Ok(_) | Err(ModelError::UnresolvedReference { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(format!(
        "{} purpose(s), {} trait(s), {} entit(ies)",
        purposes.len(),
        traits.len(),
        document.entities().count()
    ))
}

/// Fmt command - rewrite a document in canonical form
fn fmt_command(file: &Path, output: Option<&Path>) -> Result<()> {
    let document = Document::from_file(file)?;
    let target = output.unwrap_or(file);

    document
        .save_to_file(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("{} {}", "Formatted".green(), target.display());
    Ok(())
}

/// Resolve command - print the effective set as JSON
fn resolve_command(file: &Path, target: &ResolveTarget) -> Result<()> {
    let document = Document::from_file(file)?;

    let (chain, json) = match (&target.purpose, &target.trait_name) {
        (Some(name), _) => {
            let effective = document.resolve_purpose(name)?;
            (effective.chain.clone(), effective.to_json())
        }
        (None, Some(name)) => {
            let effective = document.resolve_trait(name)?;
            (effective.chain.clone(), effective.to_json())
        }
        (None, None) => anyhow::bail!("Pass --purpose or --trait"),
    };

    eprintln!("{} {}", "Inheritance chain:".cyan(), chain.join(" -> "));
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Stage command - mirror the source tree into the destination
fn stage_command(mut config: Config, source: Option<PathBuf>, destination: Option<PathBuf>) -> Result<()> {
    if let Some(source) = source {
        config.staging.source = source;
    }
    if let Some(destination) = destination {
        config.staging.destination = destination;
    }

    let stager = Stager::from_config(&config)?;
    let summary = stager
        .copy_and_overwrite()
        .with_context(|| format!("Failed to stage {}", stager.source().display()))?;

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Staging Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();
    println!("{} {}", "Source:".bold(), stager.source().display());
    println!("{} {}", "Destination:".bold(), stager.destination().display());
    println!("  Files copied:        {}", summary.files_copied.to_string().green());
    println!("  Directories created: {}", summary.directories_created);
    println!("  Ignored:             {}", summary.ignored.len().to_string().yellow());

    for path in &summary.ignored {
        println!("    {} {}", "-".yellow(), path.display());
    }

    Ok(())
}

/// List command - print files directly inside a directory
fn list_command(dir: &Path) -> Result<()> {
    let files = list_files_in_folder(&[dir])?;

    if files.is_empty() {
        println!("{}", "No files found".yellow());
    }
    for file in files {
        println!("{}", file.display());
    }

    Ok(())
}
