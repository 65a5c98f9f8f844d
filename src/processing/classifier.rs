//! Layout-aware heading classification
//!
//! Derives a document title and an H1/H2/H3 outline from span-level font and
//! position metadata. Thresholds are adaptive: the body text size is the mode
//! of the font size distribution (by character mass), and heading level bands
//! are the distinct sizes materially larger than it. Acceptance is decided by
//! a composite score summed from a closed set of tagged rules.

use crate::config::ClassifierConfig;
use crate::processing::document::{BBox, Heading, HeadingLevel, Outline, TextSpan};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Half-point buckets keep float font sizes comparable.
fn size_bucket(size: f32) -> i32 {
    (size * 2.0).round() as i32
}

/// A merged visual line with page-local layout context.
#[derive(Debug, Clone)]
struct Line {
    text: String,
    font_size: f32,
    is_bold: bool,
    bbox: BBox,
    page_number: u32,
    /// Vertical gaps to the previous and next line on the same page, if any.
    gap_above: Option<f32>,
    gap_below: Option<f32>,
    page_width: f32,
}

impl Line {
    fn width_fraction(&self) -> f32 {
        if self.page_width > 0.0 {
            self.bbox.width() / self.page_width
        } else {
            1.0
        }
    }
}

pub struct HeadingClassifier {
    config: ClassifierConfig,
    heading_patterns: Vec<Regex>,
}

impl HeadingClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let heading_patterns = [
            r"^\d+(\.\d+)*\.?\s+",          // 1.  1.1  1.1.1
            r"^[A-Z]\.\s+",                 // A. B. C.
            r"^[IVXLC]+\.\s+",              // I. II. III.
            r"(?i)^(chapter|section|part|appendix)\s+[\dIVXLC]+", // Chapter 1, Part IV
        ]
        .iter()
        .map(|p| Regex::new(p).expect("heading pattern is valid"))
        .collect();

        Self {
            config,
            heading_patterns,
        }
    }

    /// Classify a document's spans into a title and an ordered outline.
    ///
    /// Zero spans yield an empty outline, never an error. Output depends only
    /// on reading order; composite-score ties break by earlier position.
    pub fn classify(&self, spans: &[TextSpan]) -> Outline {
        if spans.is_empty() {
            return Outline::default();
        }

        let lines = self.merge_into_lines(spans);
        let page_count = lines.iter().map(|l| l.page_number).max().unwrap_or(1);
        let repeated = self.repeated_line_keys(&lines, page_count);

        let lines: Vec<Line> = lines
            .into_iter()
            .filter(|l| !repeated.contains(&line_key(l)))
            .collect();
        if lines.is_empty() {
            return Outline::default();
        }

        let body_bucket = body_size_bucket(&lines);
        let max_bucket = lines
            .iter()
            .map(|l| size_bucket(l.font_size))
            .max()
            .unwrap_or(body_bucket);

        let (title, title_index) = self.select_title(&lines, max_bucket);

        // Level bands come from candidate sizes with the title line excluded,
        // so a one-off oversized title does not consume the H1 band.
        let candidate_threshold = (body_bucket as f32) * self.config.size_ratio_threshold;
        let mut candidate_buckets: Vec<i32> = lines
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != title_index)
            .map(|(_, l)| size_bucket(l.font_size))
            .filter(|&b| (b as f32) > candidate_threshold)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        candidate_buckets.sort_unstable_by(|a, b| b.cmp(a));
        candidate_buckets.truncate(3);

        let bands: HashMap<i32, (HeadingLevel, usize)> = candidate_buckets
            .iter()
            .enumerate()
            .map(|(rank, &bucket)| {
                let level = match rank {
                    0 => HeadingLevel::H1,
                    1 => HeadingLevel::H2,
                    _ => HeadingLevel::H3,
                };
                (bucket, (level, rank))
            })
            .collect();

        let mut headings = Vec::new();
        let mut seen: HashSet<(String, HeadingLevel)> = HashSet::new();

        for (i, line) in lines.iter().enumerate() {
            if Some(i) == title_index {
                continue;
            }
            let Some(&(level, band_rank)) = bands.get(&size_bucket(line.font_size)) else {
                continue;
            };
            if !plausible_heading_text(&line.text) {
                continue;
            }

            let score = self.composite_score(line, Some(band_rank));
            if score <= self.config.acceptance_threshold {
                continue;
            }

            let text = normalize_whitespace(&line.text);
            let key = (text.to_lowercase(), level);
            if !seen.insert(key) {
                continue;
            }

            headings.push(Heading {
                level,
                text,
                page_number: line.page_number,
            });
        }

        Outline { title, headings }
    }

    /// Sum of the tagged scoring rules for one line.
    fn composite_score(&self, line: &Line, band_rank: Option<usize>) -> f32 {
        let mut score = 0.0;

        if let Some(rank) = band_rank {
            score += self.config.size_band_weights[rank.min(2)];
        }
        if line.is_bold {
            score += self.config.bold_weight;
        }
        if self.matches_heading_pattern(&line.text) {
            score += self.config.pattern_weight;
        }
        if self.is_isolated(line) {
            score += self.config.isolation_weight;
        }

        // Penalties keep body-width prose out of the outline even at large
        // font sizes (pull quotes, drop-cap paragraphs).
        if line.width_fraction() > self.config.max_heading_width_fraction {
            score -= 0.35;
        }
        if line.text.trim_end().ends_with(['.', ',', ';'])
            && !self.matches_heading_pattern(&line.text)
        {
            score -= 0.15;
        }

        score
    }

    fn matches_heading_pattern(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        self.heading_patterns.iter().any(|p| p.is_match(trimmed))
    }

    /// Surrounded by vertical whitespace exceeding the local line spacing and
    /// not spanning the full text column.
    fn is_isolated(&self, line: &Line) -> bool {
        let spacing = line.font_size.max(1.0) * 1.5;
        let above = line.gap_above.map(|g| g > spacing).unwrap_or(true);
        let below = line.gap_below.map(|g| g > spacing).unwrap_or(true);
        above && below && line.width_fraction() < 0.7
    }

    /// The highest-scoring page-one line at the document's maximum font size.
    /// Returns the empty string when nothing qualifies.
    fn select_title(&self, lines: &[Line], max_bucket: i32) -> (String, Option<usize>) {
        let mut best: Option<(f32, usize)> = None;

        for (i, line) in lines.iter().enumerate() {
            if line.page_number != 1 || size_bucket(line.font_size) != max_bucket {
                continue;
            }
            if !plausible_heading_text(&line.text) {
                continue;
            }
            let score = self.composite_score(line, Some(0));
            if score <= self.config.acceptance_threshold {
                continue;
            }
            // Strictly greater keeps the earlier line on ties.
            if best.map(|(s, _)| score > s).unwrap_or(true) {
                best = Some((score, i));
            }
        }

        match best {
            Some((_, i)) => (normalize_whitespace(&lines[i].text), Some(i)),
            None => (String::new(), None),
        }
    }

    /// Merge adjacent spans on the same visual line with matching font
    /// attributes, then attach per-page gap and width context.
    fn merge_into_lines(&self, spans: &[TextSpan]) -> Vec<Line> {
        let mut ordered: Vec<&TextSpan> = spans.iter().filter(|s| !s.text.trim().is_empty()).collect();
        ordered.sort_by(|a, b| {
            a.page_number
                .cmp(&b.page_number)
                .then(a.bbox.y0.partial_cmp(&b.bbox.y0).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut lines: Vec<Line> = Vec::new();
        for span in ordered {
            match lines.last_mut() {
                Some(prev)
                    if prev.page_number == span.page_number
                        && (prev.bbox.y0 - span.bbox.y0).abs() < span.font_size * 0.5
                        && size_bucket(prev.font_size) == size_bucket(span.font_size)
                        && prev.is_bold == span.is_bold
                        && span.bbox.x0 - prev.bbox.x1 < span.font_size * 2.0 =>
                {
                    prev.text.push(' ');
                    prev.text.push_str(span.text.trim());
                    prev.bbox.x1 = prev.bbox.x1.max(span.bbox.x1);
                    prev.bbox.y1 = prev.bbox.y1.max(span.bbox.y1);
                }
                _ => lines.push(Line {
                    text: span.text.trim().to_string(),
                    font_size: span.font_size,
                    is_bold: span.is_bold,
                    bbox: span.bbox,
                    page_number: span.page_number,
                    gap_above: None,
                    gap_below: None,
                    page_width: 0.0,
                }),
            }
        }

        // Per-page layout context: vertical gaps and an approximate text
        // column width.
        let mut by_page: HashMap<u32, Vec<usize>> = HashMap::new();
        for (i, line) in lines.iter().enumerate() {
            by_page.entry(line.page_number).or_default().push(i);
        }
        for indices in by_page.values() {
            let page_width = indices
                .iter()
                .map(|&i| lines[i].bbox.x1)
                .fold(0.0_f32, f32::max);
            for window in indices.windows(2) {
                let gap = lines[window[1]].bbox.y0 - lines[window[0]].bbox.y1;
                lines[window[0]].gap_below = Some(gap);
                lines[window[1]].gap_above = Some(gap);
            }
            for &i in indices {
                lines[i].page_width = page_width;
            }
        }

        lines
    }

    /// Identical text recurring at the same vertical position on more than
    /// the configured fraction of pages marks a running header or footer.
    fn repeated_line_keys(&self, lines: &[Line], page_count: u32) -> HashSet<(String, i32)> {
        if page_count <= 2 {
            return HashSet::new();
        }
        let mut pages_per_key: HashMap<(String, i32), HashSet<u32>> = HashMap::new();
        for line in lines {
            pages_per_key
                .entry(line_key(line))
                .or_default()
                .insert(line.page_number);
        }
        let cutoff = (page_count as f32) * self.config.repeat_page_fraction;
        pages_per_key
            .into_iter()
            .filter(|(_, pages)| (pages.len() as f32) > cutoff)
            .map(|(key, _)| key)
            .collect()
    }
}

fn line_key(line: &Line) -> (String, i32) {
    (
        normalize_whitespace(&line.text).to_lowercase(),
        (line.bbox.y0 / 4.0).round() as i32,
    )
}

/// Body text size: the half-point bucket covering the largest total
/// character count. Ties resolve to the smaller size.
fn body_size_bucket(lines: &[Line]) -> i32 {
    let mut mass: HashMap<i32, usize> = HashMap::new();
    for line in lines {
        *mass.entry(size_bucket(line.font_size)).or_insert(0) += line.text.chars().count();
    }
    mass.into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(bucket, _)| bucket)
        .unwrap_or(24) // 12pt default
}

/// Very short fragments and bare numbers (page folios) are never headings.
fn plausible_heading_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= 2 && !trimmed.chars().all(|c| c.is_ascii_digit())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
