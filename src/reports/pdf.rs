//! PDF backend
//!
//! Serializes finalized page descriptors with `printpdf`. Layout coordinates
//! are points from the top-left corner; printpdf works in millimetres from the
//! bottom-left, so every coordinate is flipped and converted here.

use std::f32::consts::PI;
use std::io::BufWriter;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use super::layout::{DrawOp, FontWeight, Page, PageGeometry, RenderedDocument};
use super::{ReportError, ReportResult};

/// Helvetica ascent as a fraction of the font size
const ASCENT: f32 = 0.718;
const STROKE_WIDTH: f32 = 0.75;
const CIRCLE_SEGMENTS: usize = 32;
const CORNER_SEGMENTS: usize = 6;

// ============================================================================
// Helpers
// ============================================================================

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

/// The builtin fonts use WinAnsi; keep to printable ASCII
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Outline of a rectangle, corners rounded by `radius`, in layout points
fn rect_outline(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Vec<(f32, f32)> {
    if radius <= 0.0 {
        return vec![(x, y), (x + width, y), (x + width, y + height), (x, y + height)];
    }

    // corner centres with the angle each quarter arc starts at (y down)
    let corners = [
        (x + width - radius, y + radius, -PI / 2.0),
        (x + width - radius, y + height - radius, 0.0),
        (x + radius, y + height - radius, PI / 2.0),
        (x + radius, y + radius, PI),
    ];

    let mut points = Vec::with_capacity(corners.len() * (CORNER_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for step in 0..=CORNER_SEGMENTS {
            let angle = start + (PI / 2.0) * step as f32 / CORNER_SEGMENTS as f32;
            points.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
        }
    }
    points
}

fn circle_outline(cx: f32, cy: f32, radius: f32) -> Vec<(f32, f32)> {
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / CIRCLE_SEGMENTS as f32;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

// ============================================================================
// Page rendering
// ============================================================================

struct PageWriter<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    height: f32,
}

impl PageWriter<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(pt_to_mm(x), pt_to_mm(self.height - y))
    }

    fn shape(&self, outline: &[(f32, f32)], fill: Option<(u8, u8, u8)>, stroke: Option<(u8, u8, u8)>) {
        let mode = match (fill, stroke) {
            (Some(_), Some(_)) => PaintMode::FillStroke,
            (Some(_), None) => PaintMode::Fill,
            (None, Some(_)) => PaintMode::Stroke,
            (None, None) => return,
        };
        if let Some(color) = fill {
            self.layer.set_fill_color(rgb_to_printpdf(color));
        }
        if let Some(color) = stroke {
            self.layer.set_outline_color(rgb_to_printpdf(color));
            self.layer.set_outline_thickness(STROKE_WIDTH);
        }

        let ring = outline.iter().map(|&(x, y)| (self.point(x, y), false)).collect();
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn draw(&self, op: &DrawOp) {
        match op {
            DrawOp::Rect { x, y, width, height, radius, fill, stroke } => {
                self.shape(&rect_outline(*x, *y, *width, *height, *radius), *fill, *stroke);
            }
            DrawOp::Circle { cx, cy, radius, fill } => {
                self.shape(&circle_outline(*cx, *cy, *radius), Some(*fill), None);
            }
            DrawOp::Text { x, y, text, style } => {
                let baseline = y + style.size * ASCENT;
                self.layer.set_fill_color(rgb_to_printpdf(style.color));
                self.layer.use_text(
                    pdf_safe(text),
                    style.size,
                    pt_to_mm(*x),
                    pt_to_mm(self.height - baseline),
                    self.fonts.get(style.weight),
                );
            }
        }
    }

    fn draw_page(&self, page: &Page) {
        for op in page.ops.iter().chain(&page.footer) {
            self.draw(op);
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Serialize a finished document to PDF bytes
pub fn write_pdf(document: &RenderedDocument, title: &str) -> ReportResult<Vec<u8>> {
    let PageGeometry { width, height, .. } = document.geometry;
    let (page_w, page_h) = (pt_to_mm(width), pt_to_mm(height));

    let (doc, first_page, first_layer) = PdfDocument::new(title, page_w, page_h, "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(format!("font error: {}", e)))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(format!("font error: {}", e)))?,
    };

    for (i, page) in document.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(page_w, page_h, "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        PageWriter { layer, fonts: &fonts, height }.draw_page(page);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Render(format!("save error: {}", e)))?;
    buf.into_inner()
        .map_err(|e| ReportError::Render(format!("buffer error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::layout::{RenderState, TextStyle, COLOR_PRIMARY, COLOR_TEXT};
    use crate::reports::sections::finalize;

    #[test]
    fn test_pdf_safe_replaces_non_ascii() {
        assert_eq!(pdf_safe("Temp 98.6°F"), "Temp 98.6?F");
        assert_eq!(pdf_safe("plain"), "plain");
    }

    #[test]
    fn test_rect_outline() {
        assert_eq!(rect_outline(0.0, 0.0, 10.0, 5.0, 0.0).len(), 4);
        let rounded = rect_outline(0.0, 0.0, 100.0, 80.0, 5.0);
        assert_eq!(rounded.len(), 4 * (CORNER_SEGMENTS + 1));
        for (x, y) in rounded {
            assert!((-0.01..=100.01).contains(&x));
            assert!((-0.01..=80.01).contains(&y));
        }
    }

    #[test]
    fn test_write_pdf_produces_document_with_all_pages() {
        let mut state = RenderState::default();
        state.rect(50.0, 50.0, 100.0, 20.0, Some(COLOR_PRIMARY), None);
        state.rounded_rect(50.0, 80.0, 100.0, 80.0, 5.0, None, Some(COLOR_TEXT));
        state.circle(100.0, 200.0, 20.0, COLOR_PRIMARY);
        state.text(60.0, 60.0, "Patient Medical Report", TextStyle::regular(11.0, COLOR_TEXT));
        state.new_page();
        state.text(60.0, 60.0, "Second page", TextStyle::bold(11.0, COLOR_TEXT));
        let doc = finalize(state);

        let bytes = write_pdf(&doc, "Test Report").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
