//! pdf-insight: PDF outline extraction and persona-driven section ranking

mod cli;
mod config;
mod error;
mod input;
mod output;
mod processing;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::Config;
use error::{PdfInsightError, Result};
use input::manager::InputManager;
use input::span_extractor::{LopdfSpanExtractor, SpanExtractor};
use input::spec::AnalysisInput;
use log::{error, info, warn};
use output::report::{write_json, AnalysisReport, OutlineReport};
use processing::analyzer::InsightEngine;
use processing::classifier::HeadingClassifier;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Outline { input, output } => {
            let documents = InputManager::collect_documents(&input)?;
            if documents.is_empty() {
                return Err(PdfInsightError::InvalidInput(format!(
                    "No PDF documents found under {}",
                    input.display()
                )));
            }

            let extractor = LopdfSpanExtractor;
            let classifier = HeadingClassifier::new(config.classifier.clone());

            let mut failures = 0;
            for path in &documents {
                info!("Extracting outline from {}", path.display());
                let outline = match extractor.extract(path) {
                    Ok(spans) => classifier.classify(&spans),
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        failures += 1;
                        continue;
                    }
                };

                let report = OutlineReport::from(&outline);
                let out_path = outline_output_path(&output, path);
                write_json(&report, &out_path)?;
                info!(
                    "Wrote {} heading(s) to {}",
                    report.outline.len(),
                    out_path.display()
                );
            }

            if failures == documents.len() {
                return Err(PdfInsightError::Extraction(
                    "Every input document failed extraction".to_string(),
                ));
            }
        }

        Commands::Analyze {
            input,
            documents,
            output,
        } => {
            cli::validate_file_extension(&input, &["json"])
                .map_err(PdfInsightError::InvalidInput)?;

            let spec = AnalysisInput::load(&input)?;
            let documents_dir = documents.unwrap_or_else(|| {
                input
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            });

            let paths: Vec<PathBuf> = spec
                .documents
                .iter()
                .map(|d| InputManager::resolve_document(&documents_dir, d.filename()))
                .collect();

            info!(
                "Analyzing {} document(s) for persona: {}",
                paths.len(),
                spec.persona()
            );

            let engine = InsightEngine::new(&config)?;
            let report: AnalysisReport = engine.analyze(&paths, &spec.query()).await?;
            write_json(&report, &output)?;

            info!(
                "Wrote {} ranked section(s) and {} subsection(s) to {}",
                report.extracted_sections.len(),
                report.subsection_analysis.len(),
                output.display()
            );
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Models Directory: {}", config.models_dir().display());
                println!("Embedding Model: {}", config.models.embedding_model);
                println!("\nScoring Weights:");
                println!("  Embedding (w1): {:.2}", config.scoring.embedding_weight);
                println!("  Length (w2): {:.2}", config.scoring.length_weight);
                println!("  Keyword (w3): {:.2}", config.scoring.keyword_weight);
                println!("  Structural (w4): {:.2}", config.scoring.structural_weight);
                println!("\nRanking:");
                println!("  Top sections: {}", config.ranking.top_k_sections);
                println!("  Subsection depth: {}", config.ranking.subsection_depth);
            }
            Some(ConfigAction::Reset) => {
                let default_config = Config::default();
                default_config.save()?;
                println!("Configuration reset to defaults");
            }
        },
    }

    Ok(())
}

fn outline_output_path(output_dir: &Path, document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "outline".to_string());
    output_dir.join(format!("{}.json", stem))
}
