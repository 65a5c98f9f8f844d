//! Analysis input specification
//!
//! Accepts both the detailed form (`{"filename": ..., "title": ...}`,
//! `{"role": ...}`, `{"task": ...}`) and the older plain-string form for
//! every field.

use crate::error::{PdfInsightError, Result};
use crate::processing::document::PersonaQuery;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisInput {
    pub documents: Vec<DocumentRef>,
    pub persona: PersonaField,
    pub job_to_be_done: JobField,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentRef {
    Detailed {
        filename: String,
        #[serde(default)]
        title: Option<String>,
    },
    Plain(String),
}

impl DocumentRef {
    pub fn filename(&self) -> &str {
        match self {
            DocumentRef::Detailed { filename, .. } => filename,
            DocumentRef::Plain(filename) => filename,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonaField {
    Detailed { role: String },
    Plain(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobField {
    Detailed { task: String },
    Plain(String),
}

impl AnalysisInput {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let input: AnalysisInput = serde_json::from_str(&content)?;
        if input.documents.is_empty() {
            return Err(PdfInsightError::InvalidInput(
                "Analysis input lists no documents".to_string(),
            ));
        }
        Ok(input)
    }

    pub fn persona(&self) -> &str {
        match &self.persona {
            PersonaField::Detailed { role } => role,
            PersonaField::Plain(role) => role,
        }
    }

    pub fn job(&self) -> &str {
        match &self.job_to_be_done {
            JobField::Detailed { task } => task,
            JobField::Plain(task) => task,
        }
    }

    pub fn query(&self) -> PersonaQuery {
        PersonaQuery::new(self.persona(), self.job())
    }
}
