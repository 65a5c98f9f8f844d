//! CLI interface for pdf-insight

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-insight")]
#[command(about = "Extract outlines and persona-ranked sections from PDF documents")]
#[command(
    long_about = "Extracts hierarchical heading outlines from PDFs and ranks document sections by relevance to a persona and job-to-be-done, fully offline using local embeddings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a title and heading outline from each input PDF
    Outline {
        /// PDF file or directory of PDFs
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the per-document outline JSON files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rank sections across documents against a persona and job
    Analyze {
        /// Analysis input spec (JSON with documents, persona, job_to_be_done)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory containing the referenced PDF documents
        /// (defaults to the input spec's directory)
        #[arg(short, long)]
        documents: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_validation() {
        assert!(validate_file_extension(&PathBuf::from("in.json"), &["json"]).is_ok());
        assert!(validate_file_extension(&PathBuf::from("in.yaml"), &["json"]).is_err());
        assert!(validate_file_extension(&PathBuf::from("noext"), &["json"]).is_err());
    }
}
