//! Integration tests for the pdf-insight pipeline

use pdf_insight::config::Config;
use pdf_insight::error::{PdfInsightError, Result};
use pdf_insight::input::spec::AnalysisInput;
use pdf_insight::output::report::{write_json, AnalysisReport, OutlineReport};
use pdf_insight::processing::analyzer::InsightEngine;
use pdf_insight::processing::classifier::HeadingClassifier;
use pdf_insight::processing::document::{BBox, TextSpan};
use pdf_insight::processing::embeddings::EmbeddingProvider;
use pdf_insight::input::span_extractor::SpanExtractor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn span(text: &str, size: f32, page: u32, y: f32) -> TextSpan {
    TextSpan {
        text: text.to_string(),
        font_size: size,
        font_name: "Helvetica".to_string(),
        is_bold: false,
        bbox: BBox::new(72.0, y, 72.0 + text.len() as f32 * size * 0.4, y + size),
        page_number: page,
    }
}

/// In-memory extractor standing in for the PDF collaborator.
struct MemoryExtractor {
    documents: HashMap<String, Vec<TextSpan>>,
}

impl SpanExtractor for MemoryExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<TextSpan>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.documents
            .get(&name)
            .cloned()
            .ok_or_else(|| PdfInsightError::Extraction(format!("unknown fixture: {}", name)))
    }
}

/// Deterministic topical embedding on three axes.
struct TopicProvider;

impl EmbeddingProvider for TopicProvider {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut v = vec![0.0_f32; 3];
        for word in lower.split_whitespace() {
            match word.trim_matches(|c: char| !c.is_alphanumeric()) {
                "trip" | "nightlife" | "club" | "beach" | "travel" => v[0] += 1.0,
                "visa" | "paperwork" | "embassy" => v[1] += 1.0,
                _ => v[2] += 0.1,
            }
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        3
    }
}

fn guide_doc() -> Vec<TextSpan> {
    let mut spans = vec![span("Coastal Travel Guide", 22.0, 1, 50.0)];
    spans.push(span("Nightlife and Entertainment", 16.0, 2, 80.0));
    for i in 0..5 {
        spans.push(span(
            "Every club and beach bar along the strip keeps the nightlife going until sunrise on a summer trip.",
            11.0,
            2,
            120.0 + i as f32 * 15.0,
        ));
    }
    spans.push(span("Visa Requirements", 16.0, 4, 80.0));
    for i in 0..5 {
        spans.push(span(
            "Embassy paperwork and visa applications must be submitted six weeks before the intended departure date.",
            11.0,
            4,
            120.0 + i as f32 * 15.0,
        ));
    }
    spans
}

fn planning_doc() -> Vec<TextSpan> {
    let mut spans = vec![span("Trip Planning Workbook", 22.0, 1, 50.0)];
    spans.push(span("Packing Checklist", 16.0, 1, 90.0));
    for i in 0..5 {
        spans.push(span(
            "A reliable checklist covers chargers, adapters, medication, and copies of every travel document you hold.",
            11.0,
            1,
            130.0 + i as f32 * 15.0,
        ));
    }
    spans
}

fn engine() -> InsightEngine {
    let mut documents = HashMap::new();
    documents.insert("guide.pdf".to_string(), guide_doc());
    documents.insert("planning.pdf".to_string(), planning_doc());
    documents.insert("empty.pdf".to_string(), Vec::new());
    InsightEngine::with_components(
        &Config::default(),
        Arc::new(MemoryExtractor { documents }),
        Arc::new(TopicProvider),
    )
}

#[tokio::test]
async fn test_full_analysis_run_across_documents() {
    let engine = engine();
    let query = pdf_insight::processing::document::PersonaQuery::new(
        "Travel Planner",
        "Plan a nightlife focused trip for college friends",
    );

    let report = engine
        .analyze(
            &[PathBuf::from("guide.pdf"), PathBuf::from("planning.pdf")],
            &query,
        )
        .await
        .unwrap();

    assert_eq!(
        report.metadata.input_documents,
        vec!["guide.pdf", "planning.pdf"]
    );
    assert_eq!(report.metadata.persona, "Travel Planner");

    // Strict total order with unique ranks.
    let ranks: Vec<usize> = report
        .extracted_sections
        .iter()
        .map(|s| s.importance_rank)
        .collect();
    let expected: Vec<usize> = (1..=report.extracted_sections.len()).collect();
    assert_eq!(ranks, expected);

    // The nightlife section dominates the query semantically.
    assert_eq!(
        report.extracted_sections[0].section_title,
        "Nightlife and Entertainment"
    );
    assert!(report
        .extracted_sections
        .iter()
        .any(|s| s.document == "planning.pdf"));

    // Subsection order mirrors the parent ranking.
    assert!(!report.subsection_analysis.is_empty());
    assert_eq!(report.subsection_analysis[0].document, "guide.pdf");
    assert_eq!(report.subsection_analysis[0].page_number, 2);
}

#[tokio::test]
async fn test_corrupt_document_does_not_poison_the_batch() {
    let engine = engine();
    let query =
        pdf_insight::processing::document::PersonaQuery::new("Travel Planner", "Plan a trip");

    let report = engine
        .analyze(
            &[PathBuf::from("missing.pdf"), PathBuf::from("guide.pdf")],
            &query,
        )
        .await
        .unwrap();

    assert_eq!(report.metadata.input_documents.len(), 2);
    assert!(!report.extracted_sections.is_empty());
    assert!(report
        .extracted_sections
        .iter()
        .all(|s| s.document == "guide.pdf"));
}

#[tokio::test]
async fn test_analysis_report_round_trips_through_disk() {
    let engine = engine();
    let query = pdf_insight::processing::document::PersonaQuery::new(
        "Travel Planner",
        "Plan a nightlife focused trip",
    );
    let report = engine
        .analyze(&[PathBuf::from("guide.pdf")], &query)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");
    write_json(&report, &path).unwrap();

    let parsed: AnalysisReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_empty_document_produces_empty_outline_json() {
    let classifier = HeadingClassifier::new(Config::default().classifier);
    let outline = classifier.classify(&[]);
    let report = OutlineReport::from(&outline);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json, serde_json::json!({ "title": "", "outline": [] }));
}

#[test]
fn test_outline_output_is_reproducible() {
    let classifier = HeadingClassifier::new(Config::default().classifier);
    let spans = guide_doc();

    let first = serde_json::to_vec(&OutlineReport::from(&classifier.classify(&spans))).unwrap();
    let second = serde_json::to_vec(&OutlineReport::from(&classifier.classify(&spans))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_analysis_input_spec_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.json");
    std::fs::write(
        &path,
        r#"{
            "documents": [
                {"filename": "guide.pdf", "title": "Coastal Guide"},
                {"filename": "planning.pdf", "title": "Workbook"}
            ],
            "persona": {"role": "Travel Planner"},
            "job_to_be_done": {"task": "Plan a trip for college friends"}
        }"#,
    )
    .unwrap();

    let spec = AnalysisInput::load(&path).unwrap();
    assert_eq!(spec.documents.len(), 2);
    assert_eq!(spec.documents[0].filename(), "guide.pdf");
    assert_eq!(spec.query().job, "Plan a trip for college friends");
}
