//! JSON report structures and writers

use crate::error::Result;
use crate::processing::document::{Outline, RankedSection, SubsectionEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-document outline report: `{ "title": ..., "outline": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineReport {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: String,
    pub text: String,
    pub page: u32,
}

impl From<&Outline> for OutlineReport {
    fn from(outline: &Outline) -> Self {
        Self {
            title: outline.title.clone(),
            outline: outline
                .headings
                .iter()
                .map(|h| OutlineEntry {
                    level: h.level.to_string(),
                    text: h.text.clone(),
                    page: h.page_number,
                })
                .collect(),
        }
    }
}

/// Per-run persona analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: RunMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

impl AnalysisReport {
    pub fn new(
        input_documents: Vec<String>,
        persona: String,
        job_to_be_done: String,
        top_sections: &[RankedSection],
        subsections: &[SubsectionEntry],
    ) -> Self {
        Self {
            metadata: RunMetadata {
                input_documents,
                persona,
                job_to_be_done,
                processing_timestamp: chrono::Utc::now().to_rfc3339(),
            },
            extracted_sections: top_sections
                .iter()
                .map(|r| ExtractedSection {
                    document: r.section.document_id.clone(),
                    section_title: r.section.title.clone(),
                    importance_rank: r.importance_rank,
                    page_number: r.section.page_start,
                })
                .collect(),
            subsection_analysis: subsections
                .iter()
                .map(|s| SubsectionAnalysis {
                    document: s.document_id.clone(),
                    refined_text: s.refined_text.clone(),
                    page_number: s.page_number,
                })
                .collect(),
        }
    }
}

/// Write any report as pretty-printed JSON. Serialization failure is fatal
/// and surfaces to the caller.
pub fn write_json<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
