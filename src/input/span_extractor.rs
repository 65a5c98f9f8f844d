//! Span extraction from PDF files
//!
//! Walks each page's content stream and yields text spans carrying the font
//! and position metadata the heading classifier depends on. Extraction is
//! best effort: the classifier downstream tolerates imprecise boxes, and a
//! document that cannot be parsed at all surfaces as an `Extraction` error
//! the batch layer can isolate.

use crate::error::{PdfInsightError, Result};
use crate::processing::document::{BBox, TextSpan};
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::path::Path;

/// Yields, per document, an ordered sequence of text spans with font size,
/// style and position metadata.
pub trait SpanExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<TextSpan>>;
}

pub struct LopdfSpanExtractor;

impl SpanExtractor for LopdfSpanExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<TextSpan>> {
        let doc = Document::load(path)
            .map_err(|e| PdfInsightError::Extraction(format!("Failed to load PDF: {}", e)))?;

        let mut spans = Vec::new();
        for (page_number, page_id) in doc.get_pages() {
            let page_height = page_height(&doc, page_id).unwrap_or(792.0);
            let content_bytes = match doc.get_page_content(page_id) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Skipping unreadable page {}: {}", page_number, e);
                    continue;
                }
            };
            let content = Content::decode(&content_bytes).map_err(|e| {
                PdfInsightError::Extraction(format!(
                    "Failed to decode page {} content: {}",
                    page_number, e
                ))
            })?;

            let bold_fonts = bold_font_resources(&doc, page_id);
            collect_page_spans(
                &content,
                page_number,
                page_height,
                &bold_fonts,
                &mut spans,
            );
        }

        spans.sort_by(|a, b| {
            a.page_number
                .cmp(&b.page_number)
                .then(a.bbox.y0.partial_cmp(&b.bbox.y0).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(std::cmp::Ordering::Equal))
        });
        Ok(spans)
    }
}

/// Font resource names whose BaseFont marks a bold face.
fn bold_font_resources(doc: &Document, page_id: (u32, u16)) -> Vec<(String, String)> {
    let mut fonts = Vec::new();
    for (resource_name, font_dict) in doc.get_page_fonts(page_id) {
        let base_font = font_dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_default();
        fonts.push((String::from_utf8_lossy(&resource_name).to_string(), base_font));
    }
    fonts
}

fn is_bold_face(base_font: &str) -> bool {
    let lower = base_font.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

/// Minimal text-state walk: tracks the active font, size and text position
/// through BT/ET blocks and emits one span per shown string.
fn collect_page_spans(
    content: &Content,
    page_number: u32,
    page_height: f32,
    fonts: &[(String, String)],
    spans: &mut Vec<TextSpan>,
) {
    let mut font_name = String::new();
    let mut font_size = 0.0_f32;
    let mut scale = 1.0_f32;
    let mut x = 0.0_f32;
    let mut y = 0.0_f32;
    let mut leading = 0.0_f32;

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
                scale = 1.0;
            }
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1))
                {
                    font_name = String::from_utf8_lossy(name).to_string();
                    font_size = as_f32(size).unwrap_or(font_size);
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (operands.first(), operands.get(1)) {
                    x += as_f32(tx).unwrap_or(0.0);
                    y += as_f32(ty).unwrap_or(0.0);
                    if operation.operator == "TD" {
                        leading = -as_f32(ty).unwrap_or(0.0);
                    }
                }
            }
            "TL" => {
                if let Some(l) = operands.first() {
                    leading = as_f32(l).unwrap_or(leading);
                }
            }
            "T*" => {
                y -= leading;
            }
            "Tm" => {
                if operands.len() == 6 {
                    scale = as_f32(&operands[3]).unwrap_or(1.0).abs().max(0.01);
                    x = as_f32(&operands[4]).unwrap_or(0.0);
                    y = as_f32(&operands[5]).unwrap_or(0.0);
                }
            }
            "Tj" | "'" => {
                if operation.operator == "'" {
                    y -= leading;
                }
                if let Some(Object::String(bytes, _)) = operands.first() {
                    emit_span(
                        bytes, font_size, scale, &font_name, fonts, x, y, page_height,
                        page_number, spans,
                    );
                    x += advance_width(bytes.len(), font_size * scale);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text_bytes = Vec::new();
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            text_bytes.extend_from_slice(bytes);
                        }
                    }
                    emit_span(
                        &text_bytes, font_size, scale, &font_name, fonts, x, y, page_height,
                        page_number, spans,
                    );
                    x += advance_width(text_bytes.len(), font_size * scale);
                }
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_span(
    bytes: &[u8],
    font_size: f32,
    scale: f32,
    font_resource: &str,
    fonts: &[(String, String)],
    x: f32,
    y: f32,
    page_height: f32,
    page_number: u32,
    spans: &mut Vec<TextSpan>,
) {
    let text = decode_pdf_string(bytes);
    if text.trim().is_empty() {
        return;
    }

    let effective_size = (font_size * scale).max(1.0);
    let base_font = fonts
        .iter()
        .find(|(resource, _)| resource == font_resource)
        .map(|(_, base)| base.as_str())
        .unwrap_or("");

    // Flip to a top-down y axis so reading order sorts naturally.
    let top = page_height - y - effective_size;
    let width = advance_width(bytes.len(), effective_size);

    spans.push(TextSpan {
        text,
        font_size: effective_size,
        font_name: base_font.to_string(),
        is_bold: is_bold_face(base_font),
        bbox: BBox::new(x, top, x + width, top + effective_size),
        page_number,
    });
}

/// Rough advance estimate; exact glyph metrics are not needed for layout
/// heuristics.
fn advance_width(byte_len: usize, size: f32) -> f32 {
    byte_len as f32 * size * 0.5
}

/// Best-effort string decoding: UTF-16BE when the BOM is present, otherwise
/// a byte-per-char fallback that covers the common single-byte encodings.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn as_f32(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn page_height(doc: &Document, page_id: (u32, u16)) -> Option<f32> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    let media_box = page.get(b"MediaBox").ok()?.as_array().ok()?;
    let y0 = as_f32(media_box.get(1)?)?;
    let y1 = as_f32(media_box.get(3)?)?;
    Some((y1 - y0).abs())
}
