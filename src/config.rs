//! Configuration management for pdf-insight
//!
//! All heuristic constants (heading rule weights, relevance weights, ranking
//! cuts) live here as an explicit value object handed to each component at
//! construction, so they are testable and overridable per run.

use crate::error::{PdfInsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub classifier: ClassifierConfig,
    pub segmenter: SegmenterConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
}

/// Tuning constants for the layout-aware heading classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// A span is a heading candidate when its font size exceeds
    /// body_size * size_ratio_threshold.
    pub size_ratio_threshold: f32,
    /// Composite score a candidate must exceed to be accepted.
    pub acceptance_threshold: f32,
    /// Score contributions for the three level bands (H1, H2, H3).
    pub size_band_weights: [f32; 3],
    pub bold_weight: f32,
    pub pattern_weight: f32,
    pub isolation_weight: f32,
    /// Fraction of pages on which identical text at the same vertical
    /// position marks a running header/footer.
    pub repeat_page_fraction: f32,
    /// Maximum heading length as a fraction of page width.
    pub max_heading_width_fraction: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Vertical gap multiple of the median line gap that starts a new
    /// paragraph in fallback segmentation.
    pub paragraph_gap_factor: f32,
    /// Cap on fallback sections per document.
    pub max_fallback_sections: usize,
    /// Sections shorter than this many characters are dropped as noise.
    pub min_section_chars: usize,
}

/// Relevance score weights. `embedding_weight` (w1) dominates; the remaining
/// weights are small additive boosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub embedding_weight: f32,
    pub length_weight: f32,
    pub keyword_weight: f32,
    pub structural_weight: f32,
    /// Length at which length_norm saturates.
    pub length_cap: usize,
    /// Leading characters of section text fed to the embedding provider.
    pub max_embed_chars: usize,
    /// Domain-agnostic terms that mark structurally important sections.
    pub keyword_lexicon: Vec<String>,
    /// Canonical high-value section titles.
    pub priority_titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of ranked sections emitted in the report.
    pub top_k_sections: usize,
    /// Number of top sections refined into subsection analysis.
    pub subsection_depth: usize,
    /// Cap on subsection entries in the report.
    pub max_subsections: usize,
    /// Refined text is truncated to this many characters.
    pub refined_text_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pdf-insight")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/M2V_base_output".to_string(),
            },
            classifier: ClassifierConfig {
                size_ratio_threshold: 1.15,
                acceptance_threshold: 0.35,
                size_band_weights: [0.5, 0.45, 0.4],
                bold_weight: 0.2,
                pattern_weight: 0.25,
                isolation_weight: 0.15,
                repeat_page_fraction: 0.5,
                max_heading_width_fraction: 0.85,
            },
            segmenter: SegmenterConfig {
                paragraph_gap_factor: 2.0,
                max_fallback_sections: 40,
                min_section_chars: 40,
            },
            scoring: ScoringConfig {
                embedding_weight: 1.0,
                length_weight: 0.10,
                keyword_weight: 0.08,
                structural_weight: 0.05,
                length_cap: 1500,
                max_embed_chars: 1000,
                keyword_lexicon: [
                    "results",
                    "findings",
                    "conclusion",
                    "methods",
                    "analysis",
                    "summary",
                    "recommendations",
                    "overview",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                priority_titles: [
                    "abstract",
                    "introduction",
                    "conclusion",
                    "results",
                    "summary",
                    "executive summary",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            ranking: RankingConfig {
                top_k_sections: 10,
                subsection_depth: 5,
                max_subsections: 15,
                refined_text_chars: 500,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                PdfInsightError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            PdfInsightError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("pdf-insight")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn embedding_model_path(&self) -> PathBuf {
        let local = self.models.models_dir.join(&self.models.embedding_model);
        if local.exists() {
            local
        } else {
            PathBuf::from(&self.models.embedding_model)
        }
    }
}
