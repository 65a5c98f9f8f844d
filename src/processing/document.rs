//! Document structures shared across the pipeline

use serde::{Deserialize, Serialize};

/// Bounding box in page coordinates. The y axis grows downward, so `y0` is
/// the top edge of the span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A contiguous run of text sharing font attributes and position, the atomic
/// unit extracted from a page. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub bbox: BBox,
    /// 1-based page number.
    pub page_number: u32,
}

/// Relative rank of structural importance, not an absolute font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadingLevel::H1 => write!(f, "H1"),
            HeadingLevel::H2 => write!(f, "H2"),
            HeadingLevel::H3 => write!(f, "H3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    pub page_number: u32,
}

/// One outline per document. `title` is empty when no page-one span
/// qualified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub headings: Vec<Heading>,
}

/// A heading-bounded text unit. Boundaries are contiguous and
/// non-overlapping within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub document_id: String,
    pub title: String,
    pub page_start: u32,
    pub page_end: u32,
    pub text: String,
}

/// The stated user role and task defining the relevance query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaQuery {
    pub persona: String,
    pub job: String,
}

impl PersonaQuery {
    pub fn new(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job: job.into(),
        }
    }

    /// Combined text fed to the embedding provider.
    pub fn query_text(&self) -> String {
        format!("{} {}", self.persona, self.job)
    }
}

/// A section with its composite relevance score, carrying the document's
/// position in the input order for deterministic tie-breaking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSection {
    pub section: Section,
    pub relevance_score: f32,
    pub document_order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    pub section: Section,
    pub relevance_score: f32,
    /// Unique, 1-based. Lower is more relevant.
    pub importance_rank: usize,
}

/// Paragraph-level refinement of a top-ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionEntry {
    pub document_id: String,
    pub refined_text: String,
    pub page_number: u32,
    pub relevance_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_display() {
        assert_eq!(HeadingLevel::H1.to_string(), "H1");
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }

    #[test]
    fn test_query_text_concatenates_persona_and_job() {
        let query = PersonaQuery::new("Travel Planner", "Plan a trip");
        assert_eq!(query.query_text(), "Travel Planner Plan a trip");
    }

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 110.0, 32.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 12.0);
    }
}
