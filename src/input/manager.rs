//! Input manager for locating and validating batch inputs

use crate::error::{PdfInsightError, Result};
use log::info;
use std::path::{Path, PathBuf};

pub struct InputManager;

impl InputManager {
    /// Resolve an input path into the list of PDF documents to process.
    /// Directories are scanned non-recursively; the order is lexicographic
    /// by file name so batch runs are reproducible.
    pub fn collect_documents(input: &Path) -> Result<Vec<PathBuf>> {
        if !input.exists() {
            return Err(PdfInsightError::InvalidInput(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }

        if input.is_file() {
            Self::require_pdf(input)?;
            return Ok(vec![input.to_path_buf()]);
        }

        let mut documents = Vec::new();
        for entry in std::fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && Self::is_pdf(&path) {
                documents.push(path);
            }
        }
        documents.sort();

        info!(
            "Found {} PDF document(s) under {}",
            documents.len(),
            input.display()
        );
        Ok(documents)
    }

    /// Resolve a document reference from an analysis input spec against the
    /// documents directory.
    pub fn resolve_document(documents_dir: &Path, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            documents_dir.join(filename)
        }
    }

    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    fn require_pdf(path: &Path) -> Result<()> {
        if Self::is_pdf(path) {
            Ok(())
        } else {
            Err(PdfInsightError::UnsupportedFormat(format!(
                "Not a PDF file: {}",
                path.display()
            )))
        }
    }
}
