//! Persona-driven relevance scoring
//!
//! Scores sections against a persona/job query. Cosine similarity between
//! embeddings is the dominant signal; length, a structural keyword lexicon,
//! and canonical section titles contribute small additive boosts. The scorer
//! is pure with respect to its inputs.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::processing::document::{PersonaQuery, ScoredSection, Section};
use crate::processing::embeddings::{cosine_similarity, truncate_for_embedding, EmbeddingProvider};
use log::warn;
use std::sync::Arc;

pub struct RelevanceScorer {
    provider: Arc<dyn EmbeddingProvider>,
    config: ScoringConfig,
}

impl RelevanceScorer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: ScoringConfig) -> Self {
        Self { provider, config }
    }

    /// Embedding of the persona role concatenated with the job description.
    pub fn query_embedding(&self, query: &PersonaQuery) -> Result<Vec<f32>> {
        self.provider.encode(&query.query_text())
    }

    /// Score every section against the query. A failed section embedding is
    /// replaced by a zero vector so that section sinks to the bottom of the
    /// ranking instead of aborting the run.
    pub fn score_sections(
        &self,
        query: &PersonaQuery,
        sections: &[(usize, Section)],
    ) -> Result<Vec<ScoredSection>> {
        let query_embedding = self.query_embedding(query)?;

        let mut scored = Vec::with_capacity(sections.len());
        for (document_order, section) in sections {
            let base = self.base_similarity(&query_embedding, section);
            let score = self.config.embedding_weight * base
                + self.config.length_weight * self.length_norm(&section.text)
                + self.config.keyword_weight * self.keyword_boost(section)
                + self.config.structural_weight * self.structural_priority(&section.title);

            scored.push(ScoredSection {
                section: section.clone(),
                relevance_score: score,
                document_order: *document_order,
            });
        }

        Ok(scored)
    }

    /// Paragraph-granularity score: base similarity plus length only.
    /// Keyword and structural boosts are section-level signals and do not
    /// re-apply here.
    pub fn chunk_score(&self, query_embedding: &[f32], text: &str) -> f32 {
        let truncated = truncate_for_embedding(text, self.config.max_embed_chars);
        let base = match self.provider.encode(truncated) {
            Ok(embedding) => cosine_similarity(query_embedding, &embedding).unwrap_or(0.0),
            Err(e) => {
                warn!("Chunk embedding failed, scoring as zero: {}", e);
                0.0
            }
        };
        self.config.embedding_weight * base + self.config.length_weight * self.length_norm(text)
    }

    fn base_similarity(&self, query_embedding: &[f32], section: &Section) -> f32 {
        let combined = format!("{} {}", section.title, section.text);
        let truncated = truncate_for_embedding(&combined, self.config.max_embed_chars);
        match self.provider.encode(truncated) {
            Ok(embedding) => cosine_similarity(query_embedding, &embedding).unwrap_or(0.0),
            Err(e) => {
                warn!(
                    "Embedding failed for section '{}' in {}, scoring as zero: {}",
                    section.title, section.document_id, e
                );
                0.0
            }
        }
    }

    /// Rewards substantial sections with diminishing returns beyond the cap,
    /// so padding cannot buy rank.
    fn length_norm(&self, text: &str) -> f32 {
        let len = text.chars().count().min(self.config.length_cap);
        len as f32 / self.config.length_cap.max(1) as f32
    }

    /// 1.0 when the title or leading text contains a lexicon term.
    fn keyword_boost(&self, section: &Section) -> f32 {
        let title = section.title.to_lowercase();
        let leading: String = section.text.chars().take(200).collect::<String>().to_lowercase();
        let hit = self
            .config
            .keyword_lexicon
            .iter()
            .any(|k| title.contains(k.as_str()) || leading.contains(k.as_str()));
        if hit {
            1.0
        } else {
            0.0
        }
    }

    /// Small fixed bonus for canonical high-value section names.
    fn structural_priority(&self, title: &str) -> f32 {
        let normalized = title.trim().trim_end_matches(':').to_lowercase();
        if self.config.priority_titles.iter().any(|t| *t == normalized) {
            1.0
        } else {
            0.0
        }
    }
}
