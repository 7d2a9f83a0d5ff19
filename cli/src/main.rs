//! reqdot CLI - requirements template generator
//!
//! Writes a Word requirements template and runs the package fixer over it.

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use reqdot::{FixReport, TemplateConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Generate a numbered requirements template for Word
#[derive(Parser)]
#[command(
    name = "reqdot",
    author = "iyulab",
    version,
    about = "Generate a Word requirements template",
    long_about = "reqdot - Word requirements template generator.\n\n\
                  Builds a .dotx with numbered heading and requirement styles, then\n\
                  checks and repairs the package so Word opens it without complaint."
)]
struct Cli {
    /// Output file path
    #[arg(default_value = "Requirements.dotx")]
    output: PathBuf,

    /// JSON configuration overriding the default style tables
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => TemplateConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => TemplateConfig::default(),
    };

    let (path, report) = match generate(&cli.output, &config) {
        Ok(report) => (cli.output.clone(), report),
        Err(e) if e.is_access_denied() => {
            let fallback = fallback_path(&cli.output);
            println!(
                "{} Cannot write {} ({}), writing {} instead",
                "!".yellow().bold(),
                cli.output.display(),
                e,
                fallback.display()
            );
            let report = generate(&fallback, &config)?;
            (fallback, report)
        }
        Err(e) => return Err(e.into()),
    };

    print_summary(&path, &config, &report);
    Ok(())
}

fn generate(path: &Path, config: &TemplateConfig) -> reqdot::Result<FixReport> {
    let pb = create_spinner(&format!("Generating {}...", path.display()));
    let result = reqdot::generate_template(path, config);
    pb.finish_and_clear();
    result
}

/// Same file name under the system temp directory.
fn fallback_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Requirements.dotx"));
    std::env::temp_dir().join(name)
}

fn print_summary(path: &Path, config: &TemplateConfig, report: &FixReport) {
    println!(
        "{} Template written: {}",
        "✓".green().bold(),
        path.display()
    );
    println!("{}: {}", "Heading levels".bold(), config.headings.len());
    println!("{}: {}", "Requirement levels".bold(), config.requirements.len());
    println!("{}: {}", "Note styles".bold(), config.active_notes().len());

    if report.repaired {
        println!("\n{}", "Package repaired".cyan().bold());
        println!("{}", "─".repeat(40));
        for finding in &report.diagnosis.findings {
            println!("  {}", finding);
        }
        if let Some(outcome) = &report.outcome {
            for name in &outcome.verbatim_fallbacks {
                println!("{} {} copied unchanged", "!".yellow().bold(), name);
            }
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
