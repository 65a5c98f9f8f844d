//! Cross-document ranking and subsection refinement
//!
//! Totally orders scored sections into reproducible importance ranks, then
//! refines the top-ranked sections at paragraph granularity.

use crate::config::RankingConfig;
use crate::processing::document::{RankedSection, ScoredSection, SubsectionEntry};
use crate::processing::scorer::RelevanceScorer;

pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Sort descending by composite score into unique ranks 1..N. Ties break
    /// by document input order, then page_start, guaranteeing a strict total
    /// order across runs.
    pub fn rank(&self, mut scored: Vec<ScoredSection>) -> Vec<RankedSection> {
        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.document_order.cmp(&b.document_order))
                .then(a.section.page_start.cmp(&b.section.page_start))
        });

        scored
            .into_iter()
            .enumerate()
            .map(|(i, s)| RankedSection {
                section: s.section,
                relevance_score: s.relevance_score,
                importance_rank: i + 1,
            })
            .collect()
    }

    /// Top K ranked sections selected for the report. K is fixed by
    /// configuration, not a score threshold.
    pub fn top_sections<'a>(&self, ranked: &'a [RankedSection]) -> &'a [RankedSection] {
        &ranked[..ranked.len().min(self.config.top_k_sections)]
    }

    /// Paragraph-level refinement of the highest-ranked sections: each
    /// section contributes its single best chunk, scored on similarity and
    /// length alone. Output order mirrors the parent rank order.
    pub fn refine(
        &self,
        ranked: &[RankedSection],
        scorer: &RelevanceScorer,
        query_embedding: &[f32],
    ) -> Vec<SubsectionEntry> {
        let mut entries = Vec::new();

        for ranked_section in ranked.iter().take(self.config.subsection_depth) {
            let section = &ranked_section.section;
            let chunks = split_into_chunks(&section.text);

            let mut best: Option<(f32, &str)> = None;
            for chunk in &chunks {
                let score = scorer.chunk_score(query_embedding, chunk);
                // Strictly greater keeps the earlier chunk on ties.
                if best.map(|(s, _)| score > s).unwrap_or(true) {
                    best = Some((score, chunk));
                }
            }

            if let Some((score, text)) = best {
                entries.push(SubsectionEntry {
                    document_id: section.document_id.clone(),
                    refined_text: clip_refined_text(text, self.config.refined_text_chars),
                    page_number: section.page_start,
                    relevance_score: score,
                });
            }

            if entries.len() >= self.config.max_subsections {
                break;
            }
        }

        entries
    }
}

/// Paragraph chunks split on blank lines, falling back to sentences when the
/// text has no paragraph structure. Very short fragments are skipped; a
/// section that produces no qualifying chunk is kept whole.
fn split_into_chunks(text: &str) -> Vec<&str> {
    let mut chunks: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > 100)
        .take(10)
        .collect();

    if chunks.len() <= 1 {
        let sentences: Vec<&str> = text
            .split_inclusive(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| s.chars().count() > 100)
            .take(10)
            .collect();
        if sentences.len() > 1 {
            chunks = sentences;
        }
    }

    if chunks.is_empty() {
        chunks.push(text.trim());
    }
    chunks
}

fn clip_refined_text(text: &str, max_chars: usize) -> String {
    let clipped: String = text.chars().take(max_chars).collect();
    if clipped.chars().count() < text.chars().count() {
        format!("{}...", clipped)
    } else {
        clipped
    }
}
