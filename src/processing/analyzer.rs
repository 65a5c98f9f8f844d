//! Pipeline orchestration
//!
//! Per-document work (span extraction, heading classification, segmentation)
//! fans out onto blocking worker tasks with no shared mutable state; results
//! join at a single barrier before cross-document scoring and ranking, since
//! rank order depends on the full candidate set. The embedding model is
//! loaded once and shared read-only.

use crate::config::Config;
use crate::error::{PdfInsightError, Result};
use crate::input::span_extractor::{LopdfSpanExtractor, SpanExtractor};
use crate::output::report::AnalysisReport;
use crate::processing::classifier::HeadingClassifier;
use crate::processing::document::{Outline, PersonaQuery, Section};
use crate::processing::embeddings::{EmbeddingEngine, EmbeddingProvider};
use crate::processing::ranker::Ranker;
use crate::processing::scorer::RelevanceScorer;
use crate::processing::segmenter::SectionSegmenter;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct InsightEngine {
    extractor: Arc<dyn SpanExtractor>,
    classifier: Arc<HeadingClassifier>,
    segmenter: Arc<SectionSegmenter>,
    scorer: RelevanceScorer,
    ranker: Ranker,
}

impl InsightEngine {
    /// Production construction: loads the Model2Vec embedding model once.
    pub fn new(config: &Config) -> Result<Self> {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(EmbeddingEngine::from_config(config)?);
        Ok(Self::with_components(
            config,
            Arc::new(LopdfSpanExtractor),
            provider,
        ))
    }

    /// Dependency-injected construction for tests and alternate backends.
    pub fn with_components(
        config: &Config,
        extractor: Arc<dyn SpanExtractor>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            extractor,
            classifier: Arc::new(HeadingClassifier::new(config.classifier.clone())),
            segmenter: Arc::new(SectionSegmenter::new(config.segmenter.clone())),
            scorer: RelevanceScorer::new(provider, config.scoring.clone()),
            ranker: Ranker::new(config.ranking.clone()),
        }
    }

    /// Extract and classify one document's outline.
    pub fn outline_document(&self, path: &Path) -> Result<Outline> {
        let spans = self.extractor.extract(path)?;
        Ok(self.classifier.classify(&spans))
    }

    /// Full persona run: fan out per-document work, join, then score, rank
    /// and refine across all documents. A document that fails extraction is
    /// logged and excluded; the run continues for the rest.
    pub async fn analyze(
        &self,
        documents: &[PathBuf],
        query: &PersonaQuery,
    ) -> Result<AnalysisReport> {
        let mut tasks: JoinSet<(usize, Result<Vec<Section>>)> = JoinSet::new();

        for (order, path) in documents.iter().enumerate() {
            let extractor = Arc::clone(&self.extractor);
            let classifier = Arc::clone(&self.classifier);
            let segmenter = Arc::clone(&self.segmenter);
            let path = path.clone();

            tasks.spawn_blocking(move || {
                let document_id = document_name(&path);
                let result = extractor.extract(&path).map(|spans| {
                    let outline = classifier.classify(&spans);
                    segmenter.segment(&document_id, &spans, &outline)
                });
                (order, result)
            });
        }

        // Barrier: every per-document task must finish before ranking.
        let mut per_document: Vec<(usize, Vec<Section>)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (order, result) = joined
                .map_err(|e| PdfInsightError::Processing(format!("Worker task failed: {}", e)))?;
            match result {
                Ok(sections) => per_document.push((order, sections)),
                Err(e) => {
                    warn!(
                        "Excluding document {} from the batch: {}",
                        documents[order].display(),
                        e
                    );
                }
            }
        }
        per_document.sort_by_key(|(order, _)| *order);

        let sections: Vec<(usize, Section)> = per_document
            .into_iter()
            .flat_map(|(order, sections)| sections.into_iter().map(move |s| (order, s)))
            .collect();
        info!(
            "Collected {} section(s) across {} document(s)",
            sections.len(),
            documents.len()
        );

        let query_embedding = self.scorer.query_embedding(query)?;
        let scored = self.scorer.score_sections(query, &sections)?;
        let ranked = self.ranker.rank(scored);
        let top = self.ranker.top_sections(&ranked);
        let subsections = self.ranker.refine(top, &self.scorer, &query_embedding);

        Ok(AnalysisReport::new(
            documents.iter().map(|p| document_name(p)).collect(),
            query.persona.clone(),
            query.job.clone(),
            top,
            &subsections,
        ))
    }
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
