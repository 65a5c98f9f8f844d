//! Section segmentation
//!
//! Splits a document's spans into contiguous, non-overlapping sections.
//! Outline headings are the primary boundaries; documents with no classified
//! headings fall back to paragraph segmentation on vertical gaps.

use crate::config::SegmenterConfig;
use crate::processing::document::{Heading, Outline, Section, TextSpan};

pub struct SectionSegmenter {
    config: SegmenterConfig,
}

impl SectionSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment one document's spans into ordered sections.
    ///
    /// Sections whose text falls below the minimum character threshold are
    /// dropped as noise (stray captions, folios) rather than emitted empty.
    pub fn segment(&self, document_id: &str, spans: &[TextSpan], outline: &Outline) -> Vec<Section> {
        if spans.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<&TextSpan> =
            spans.iter().filter(|s| !s.text.trim().is_empty()).collect();
        ordered.sort_by(|a, b| {
            a.page_number
                .cmp(&b.page_number)
                .then(a.bbox.y0.partial_cmp(&b.bbox.y0).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(std::cmp::Ordering::Equal))
        });

        let sections = if outline.headings.is_empty() {
            self.segment_by_paragraphs(document_id, &ordered)
        } else {
            self.segment_by_headings(document_id, &ordered, &outline.headings)
        };

        sections
            .into_iter()
            .filter(|s| s.text.chars().count() >= self.config.min_section_chars)
            .collect()
    }

    /// Each heading opens a section that runs until the next heading of
    /// equal-or-higher level or document end. Text ahead of the first heading
    /// becomes an untitled preamble section.
    fn segment_by_headings(
        &self,
        document_id: &str,
        ordered: &[&TextSpan],
        headings: &[Heading],
    ) -> Vec<Section> {
        // Locate each heading's first span in reading order.
        let mut boundaries: Vec<(usize, &Heading)> = Vec::new();
        let mut cursor = 0;
        for heading in headings {
            let found = ordered[cursor..].iter().position(|s| {
                s.page_number == heading.page_number
                    && heading.text.starts_with(s.text.trim())
            });
            if let Some(offset) = found {
                boundaries.push((cursor + offset, heading));
                cursor += offset;
            }
        }

        let mut sections = Vec::new();

        if let Some(&(first_start, _)) = boundaries.first() {
            if first_start > 0 {
                if let Some(section) =
                    self.build_section(document_id, "Introduction", &ordered[..first_start])
                {
                    sections.push(section);
                }
            }
        } else {
            // Headings classified but none matched back to spans; treat the
            // whole document as one section.
            if let Some(section) = self.build_section(document_id, "Introduction", ordered) {
                sections.push(section);
            }
            return sections;
        }

        for (i, &(start, heading)) in boundaries.iter().enumerate() {
            // A section closes at the next heading of equal or higher level.
            let end = boundaries[i + 1..]
                .iter()
                .find(|(_, h)| h.level <= heading.level)
                .map(|&(idx, _)| idx)
                .unwrap_or(ordered.len());

            // Body spans exclude the heading's own span.
            let body = &ordered[start + 1..end.max(start + 1)];
            if let Some(section) = self.build_section(document_id, &heading.text, body) {
                sections.push(section);
            }
        }

        sections
    }

    /// Fallback: break on vertical gaps exceeding a multiple of the median
    /// line gap, capped to avoid excessive fragmentation.
    fn segment_by_paragraphs(&self, document_id: &str, ordered: &[&TextSpan]) -> Vec<Section> {
        let mut gaps: Vec<f32> = ordered
            .windows(2)
            .filter(|w| w[0].page_number == w[1].page_number)
            .map(|w| w[1].bbox.y0 - w[0].bbox.y1)
            .filter(|g| *g > 0.0)
            .collect();
        gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median_gap = if gaps.is_empty() {
            0.0
        } else {
            gaps[gaps.len() / 2]
        };
        let break_gap = (median_gap * self.config.paragraph_gap_factor).max(1.0);

        let mut groups: Vec<Vec<&TextSpan>> = Vec::new();
        let mut current: Vec<&TextSpan> = Vec::new();
        for (i, &span) in ordered.iter().enumerate() {
            if i > 0 {
                let prev = ordered[i - 1];
                let breaks = prev.page_number != span.page_number
                    || span.bbox.y0 - prev.bbox.y1 > break_gap;
                if breaks && groups.len() + 1 < self.config.max_fallback_sections {
                    groups.push(std::mem::take(&mut current));
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        groups
            .iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let title = format!("Section {}", i + 1);
                self.build_section(document_id, &title, group)
            })
            .collect()
    }

    fn build_section(&self, document_id: &str, title: &str, spans: &[&TextSpan]) -> Option<Section> {
        if spans.is_empty() {
            return None;
        }
        let text = spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let page_start = spans.iter().map(|s| s.page_number).min()?;
        let page_end = spans.iter().map(|s| s.page_number).max()?;

        Some(Section {
            document_id: document_id.to_string(),
            title: title.to_string(),
            page_start,
            page_end,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::document::{BBox, HeadingLevel};

    fn span(text: &str, size: f32, page: u32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            font_size: size,
            font_name: "Helvetica".to_string(),
            is_bold: false,
            bbox: BBox::new(72.0, y, 400.0, y + size),
            page_number: page,
        }
    }

    fn heading(level: HeadingLevel, text: &str, page: u32) -> Heading {
        Heading {
            level,
            text: text.to_string(),
            page_number: page,
        }
    }

    fn segmenter() -> SectionSegmenter {
        SectionSegmenter::new(Config::default().segmenter)
    }

    #[test]
    fn test_headings_bound_sections() {
        let spans = vec![
            span("Methods", 16.0, 1, 100.0),
            span("We measured the response of forty participants over six weeks.", 11.0, 1, 130.0),
            span("Results", 16.0, 2, 100.0),
            span("Average accuracy improved by eleven percent across all cohorts.", 11.0, 2, 130.0),
        ];
        let outline = Outline {
            title: String::new(),
            headings: vec![
                heading(HeadingLevel::H1, "Methods", 1),
                heading(HeadingLevel::H1, "Results", 2),
            ],
        };

        let sections = segmenter().segment("study.pdf", &spans, &outline);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Methods");
        assert!(sections[0].text.contains("forty participants"));
        assert_eq!(sections[0].page_start, 1);
        assert_eq!(sections[1].title, "Results");
        assert_eq!(sections[1].page_start, 2);
    }

    #[test]
    fn test_subheadings_stay_inside_parent_until_equal_level() {
        let spans = vec![
            span("Methods", 16.0, 1, 100.0),
            span("Participants were recruited from three partner universities.", 11.0, 1, 130.0),
            span("Apparatus", 14.0, 1, 200.0),
            span("Recordings used a calibrated rig in a sound-isolated room.", 11.0, 1, 230.0),
            span("Results", 16.0, 2, 100.0),
            span("Average accuracy improved by eleven percent across cohorts.", 11.0, 2, 130.0),
        ];
        let outline = Outline {
            title: String::new(),
            headings: vec![
                heading(HeadingLevel::H1, "Methods", 1),
                heading(HeadingLevel::H2, "Apparatus", 1),
                heading(HeadingLevel::H1, "Results", 2),
            ],
        };

        let sections = segmenter().segment("study.pdf", &spans, &outline);
        let methods = sections.iter().find(|s| s.title == "Methods").unwrap();
        // The H1 section runs through its H2 child up to the next H1.
        assert!(methods.text.contains("partner universities"));
        assert!(methods.text.contains("calibrated rig"));
        assert_eq!(methods.page_end, 1);
        let apparatus = sections.iter().find(|s| s.title == "Apparatus").unwrap();
        assert!(apparatus.text.contains("calibrated rig"));
        assert!(!apparatus.text.contains("eleven percent"));
    }

    #[test]
    fn test_preamble_becomes_introduction() {
        let spans = vec![
            span("This report summarizes the annual survey of regional trends.", 11.0, 1, 80.0),
            span("Findings", 16.0, 1, 200.0),
            span("Participation rose for the third consecutive year in a row.", 11.0, 1, 230.0),
        ];
        let outline = Outline {
            title: String::new(),
            headings: vec![heading(HeadingLevel::H1, "Findings", 1)],
        };

        let sections = segmenter().segment("survey.pdf", &spans, &outline);
        assert_eq!(sections[0].title, "Introduction");
        assert!(sections[0].text.contains("annual survey"));
    }

    #[test]
    fn test_paragraph_fallback_without_headings() {
        let mut spans = Vec::new();
        // Two paragraphs separated by a large vertical gap.
        for i in 0..4 {
            spans.push(span(
                "first paragraph line with enough words to pass the noise floor",
                11.0,
                1,
                100.0 + i as f32 * 14.0,
            ));
        }
        for i in 0..4 {
            spans.push(span(
                "second paragraph line with enough words to pass the noise floor",
                11.0,
                1,
                300.0 + i as f32 * 14.0,
            ));
        }

        let sections = segmenter().segment("notes.pdf", &spans, &Outline::default());
        assert_eq!(sections.len(), 2);
        assert!(sections[0].text.contains("first paragraph"));
        assert!(sections[1].text.contains("second paragraph"));
    }

    #[test]
    fn test_short_noise_sections_are_dropped() {
        let mut spans = Vec::new();
        for i in 0..4 {
            spans.push(span(
                "a block of explanatory prose that clearly exceeds the minimum length",
                11.0,
                1,
                100.0 + i as f32 * 14.0,
            ));
        }
        // A stray caption far below the paragraph.
        spans.push(span("Fig. 3", 11.0, 1, 400.0));

        let sections = segmenter().segment("figs.pdf", &spans, &Outline::default());
        assert_eq!(sections.len(), 1);
        assert!(sections[0].text.contains("explanatory prose"));
        assert!(!sections[0].text.contains("Fig. 3"));
    }

    #[test]
    fn test_empty_document_yields_no_sections() {
        let sections = segmenter().segment("empty.pdf", &[], &Outline::default());
        assert!(sections.is_empty());
    }
}
