//! Text embeddings behind an injectable provider trait
//!
//! The production provider wraps a Model2Vec static model loaded once per
//! run; tests inject deterministic stubs. Providers must be deterministic for
//! a given text and safe for concurrent read-only inference.

use crate::config::Config;
use crate::error::{PdfInsightError, Result};
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// Maps arbitrary text to a fixed-length numeric vector.
pub trait EmbeddingProvider: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
    fn dimension(&self) -> usize;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    dimension: usize,
    model_name: String,
}

impl EmbeddingEngine {
    pub fn new(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| PdfInsightError::ModelLoading(format!("Failed to load model: {}", e)))?;

        let dimension = model.encode_single("probe").len();
        info!(
            "Model loaded in {:.2?} ({} dimensions)",
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model,
            dimension,
            model_name: model_name.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let model_path = config.embedding_model_path();
        Self::new(&model_path, &config.models.embedding_model)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for EmbeddingEngine {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity in [-1, 1]. Zero-norm vectors score 0.0 so failed
/// embeddings sort to the bottom instead of aborting the run.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(PdfInsightError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Keep the leading portion of over-long text; headings and topic sentences
/// concentrate there. Grapheme-aware so multi-byte scripts are never split.
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> &str {
    match text.grapheme_indices(true).nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_of_identical_vectors() {
        let v = vec![0.5, -0.25, 1.0];
        let score = cosine_similarity(&v, &v).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_of_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(cosine_similarity(&a, &b).is_err());
    }

    #[test]
    fn test_truncation_keeps_leading_portion() {
        assert_eq!(truncate_for_embedding("hello world", 5), "hello");
        assert_eq!(truncate_for_embedding("short", 100), "short");
    }

    #[test]
    fn test_truncation_respects_grapheme_boundaries() {
        let text = "héllo wörld";
        let truncated = truncate_for_embedding(text, 6);
        assert_eq!(truncated, "héllo ");
    }
}
