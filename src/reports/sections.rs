//! Section builders
//!
//! Each builder draws one visual block at the cursor, runs the page-break
//! policy for its own height first, and leaves the cursor below the block.

use chrono::{DateTime, Utc};

use super::format::format_generated_at;
use super::layout::*;
use super::metrics::{fit_text, text_width, wrap_text};

const BRAND: &str = "MoviLabs";
const BRAND_SUBTITLE: &str = "Healthcare Management System";
const FOOTER_TEXT: &str = "Karur Gastro Foundation | Confidential Medical Report";

const HEADER_HEIGHT: f32 = 120.0;
const HEADER_CURSOR: f32 = 140.0;

const SECTION_BAR_HEIGHT: f32 = 35.0;
const SECTION_ADVANCE: f32 = 45.0;

const ROW_ADVANCE: f32 = 20.0;
const ROW_LABEL_X: f32 = 60.0;
const ROW_VALUE_X: f32 = 210.0;

const LIST_ADVANCE: f32 = 18.0;
const PARAGRAPH_LINE_HEIGHT: f32 = 15.0;

const DEFAULT_ROW_HEIGHT: f32 = 30.0;
const TABLE_GAP: f32 = 20.0;
const CELL_PADDING: f32 = 5.0;

const CARD_HEIGHT: f32 = 80.0;
const CARD_ADVANCE: f32 = 100.0;

const BODY: TextStyle = TextStyle::regular(11.0, COLOR_TEXT);
const LABEL: TextStyle = TextStyle::regular(11.0, COLOR_MUTED);

/// Badge shown left of a section title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionIcon {
    Patient,
    Doctor,
    Vitals,
    History,
    Allergy,
    Calendar,
    Statistics,
    Metrics,
    Patients,
    Summary,
}

impl SectionIcon {
    fn color(self) -> Rgb {
        match self {
            SectionIcon::Patient | SectionIcon::Patients => COLOR_PRIMARY,
            SectionIcon::Doctor => COLOR_SECONDARY,
            SectionIcon::Vitals | SectionIcon::Allergy => COLOR_DANGER,
            SectionIcon::History | SectionIcon::Summary => COLOR_ACCENT,
            SectionIcon::Calendar => COLOR_WARNING,
            SectionIcon::Statistics | SectionIcon::Metrics => COLOR_SUCCESS,
        }
    }
}

// ============================================================================
// Header / footer
// ============================================================================

/// Brand banner across the top of the first page; cursor := 140
pub fn add_header(state: &mut RenderState, title: &str, generated_at: DateTime<Utc>) {
    let width = state.geometry().width;

    state.rect(0.0, 0.0, width, HEADER_HEIGHT, Some(COLOR_PRIMARY), None);
    state.text(50.0, 30.0, BRAND, TextStyle::bold(28.0, COLOR_WHITE));
    state.text(50.0, 65.0, BRAND_SUBTITLE, TextStyle::regular(12.0, COLOR_WHITE));
    state.text(50.0, 85.0, title, TextStyle::bold(20.0, COLOR_WHITE));
    state.text(
        width - 250.0,
        40.0,
        format!("Generated on: {}", format_generated_at(generated_at)),
        TextStyle::regular(10.0, COLOR_WHITE),
    );

    state.advance_to(HEADER_CURSOR);
}

/// Footer lines for one page, centered below the bottom limit
pub fn footer(geometry: &PageGeometry, page: usize, total: usize) -> Vec<DrawOp> {
    let style = TextStyle::regular(9.0, COLOR_MUTED);
    let centered = |y: f32, text: String| DrawOp::Text {
        x: (geometry.width - text_width(&text, style.size, style.weight)) / 2.0,
        y,
        text,
        style,
    };

    vec![
        centered(geometry.height - 50.0, FOOTER_TEXT.to_string()),
        centered(geometry.height - 35.0, format!("Page {} of {}", page, total)),
    ]
}

/// Stamp footers and close the document
pub fn finalize(state: RenderState) -> RenderedDocument {
    state.finish(footer)
}

// ============================================================================
// Text blocks
// ============================================================================

/// Light-gray title bar with an icon badge; cursor += 45.
///
/// Also reserves room for one row so a title is never orphaned at the bottom.
pub fn add_section_header(state: &mut RenderState, title: &str, icon: SectionIcon) {
    state.check_page_break(SECTION_ADVANCE + ROW_ADVANCE);

    let g = *state.geometry();
    let y = state.y();
    state.rect(g.margin_left, y, g.content_width(), SECTION_BAR_HEIGHT, Some(COLOR_LIGHT_GRAY), None);
    state.circle(g.margin_left + 17.0, y + SECTION_BAR_HEIGHT / 2.0, 7.0, icon.color());
    state.text(g.margin_left + 32.0, y + 10.0, title, TextStyle::bold(14.0, COLOR_PRIMARY));

    state.advance(SECTION_ADVANCE);
}

/// Column placement for [`add_info_row_with`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfoRowLayout {
    pub label_x: f32,
    pub value_x: f32,
}

impl Default for InfoRowLayout {
    fn default() -> Self {
        Self { label_x: ROW_LABEL_X, value_x: ROW_VALUE_X }
    }
}

/// `label:` / value pair; absent or blank values render `N/A`
pub fn add_info_row(state: &mut RenderState, label: &str, value: Option<&str>) {
    add_info_row_with(state, label, value, InfoRowLayout::default());
}

pub fn add_info_row_with(state: &mut RenderState, label: &str, value: Option<&str>, layout: InfoRowLayout) {
    state.check_page_break(ROW_ADVANCE);

    let g = *state.geometry();
    let y = state.y();
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("N/A");

    let label_width = layout.value_x - layout.label_x - 10.0;
    let value_width = g.width - layout.value_x - ROW_LABEL_X;

    state.text(layout.label_x, y, fit_text(&format!("{}:", label), LABEL.size, LABEL.weight, label_width), LABEL);
    state.text(layout.value_x, y, fit_text(value, BODY.size, BODY.weight, value_width), BODY);

    state.advance(ROW_ADVANCE);
}

/// `n. text` on its own line
pub fn add_list_item(state: &mut RenderState, index: usize, text: &str, color: Rgb) {
    state.check_page_break(LIST_ADVANCE);

    let g = *state.geometry();
    let style = TextStyle::regular(11.0, color);
    let max_width = g.width - ROW_LABEL_X - g.margin_right;
    let line = format!("{}. {}", index, text);
    state.text(ROW_LABEL_X, state.y(), fit_text(&line, style.size, style.weight, max_width), style);

    state.advance(LIST_ADVANCE);
}

/// Word-wrapped body text across the content width
pub fn add_paragraph(state: &mut RenderState, text: &str) {
    let g = *state.geometry();
    let max_width = g.width - ROW_LABEL_X - g.margin_right;
    let lines = wrap_text(text, BODY.size, BODY.weight, max_width);

    let height = lines.len() as f32 * PARAGRAPH_LINE_HEIGHT;
    state.check_page_break(height.min(g.usable_height()));

    for line in lines {
        state.check_page_break(PARAGRAPH_LINE_HEIGHT);
        state.text(ROW_LABEL_X, state.y(), line, BODY);
        state.advance(PARAGRAPH_LINE_HEIGHT);
    }
}

/// Single muted line, used for empty-state notes
pub fn add_message(state: &mut RenderState, text: &str) {
    state.check_page_break(ROW_ADVANCE);

    let g = *state.geometry();
    let style = TextStyle::regular(11.0, COLOR_MUTED);
    let max_width = g.width - ROW_LABEL_X - g.margin_right;
    state.text(ROW_LABEL_X, state.y(), fit_text(text, style.size, style.weight, max_width), style);

    state.advance(ROW_ADVANCE);
}

pub fn add_spacing(state: &mut RenderState, dy: f32) {
    state.advance(dy);
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOptions {
    /// Must match the header count; otherwise columns share the width equally
    pub column_widths: Option<Vec<f32>>,
    pub row_height: Option<f32>,
}

/// Header row plus alternating body rows.
///
/// The whole table's height is checked before the header is drawn. Tables
/// taller than a page continue on following pages with the header repeated.
pub fn add_table(state: &mut RenderState, headers: &[&str], rows: &[Vec<String>], options: &TableOptions) {
    if headers.is_empty() {
        return;
    }

    let g = *state.geometry();
    let start_x = g.margin_left;
    let table_width = g.content_width();
    let row_height = options.row_height.unwrap_or(DEFAULT_ROW_HEIGHT);
    let widths = match &options.column_widths {
        Some(widths) if widths.len() == headers.len() => widths.clone(),
        _ => vec![table_width / headers.len() as f32; headers.len()],
    };

    // A table that cannot fit on any page only needs its header and first row
    let full_height = (rows.len() + 1) as f32 * row_height;
    let required = if full_height <= g.usable_height() { full_height } else { 2.0 * row_height };
    state.check_page_break(required);

    let mut segment_top = state.y();
    draw_header_row(state, headers, &widths, start_x, segment_top, row_height);
    let mut y = segment_top + row_height;

    for (i, row) in rows.iter().enumerate() {
        if y + row_height > g.bottom_limit() {
            state.rect(start_x, segment_top, table_width, y - segment_top, None, Some(COLOR_BORDER));
            state.new_page();
            segment_top = state.y();
            draw_header_row(state, headers, &widths, start_x, segment_top, row_height);
            y = segment_top + row_height;
        }

        let fill = if i % 2 == 0 { COLOR_WHITE } else { COLOR_LIGHT_GRAY };
        state.rect(start_x, y, table_width, row_height, Some(fill), None);

        let style = TextStyle::regular(10.0, COLOR_TEXT);
        let mut x = start_x;
        for (cell, width) in row.iter().zip(&widths) {
            let text = fit_text(cell, style.size, style.weight, width - 2.0 * CELL_PADDING);
            state.text(x + CELL_PADDING, y + 8.0, text, style);
            x += width;
        }

        y += row_height;
    }

    state.rect(start_x, segment_top, table_width, y - segment_top, None, Some(COLOR_BORDER));
    state.advance_to(y + TABLE_GAP);
}

fn draw_header_row(state: &mut RenderState, headers: &[&str], widths: &[f32], start_x: f32, y: f32, row_height: f32) {
    let table_width: f32 = state.geometry().content_width();
    state.rect(start_x, y, table_width, row_height, Some(COLOR_PRIMARY), None);

    let style = TextStyle::bold(11.0, COLOR_WHITE);
    let mut x = start_x;
    for (header, width) in headers.iter().zip(widths) {
        let text = fit_text(header, style.size, style.weight, width - 2.0 * CELL_PADDING);
        state.text(x + CELL_PADDING, y + 8.0, text, style);
        x += width;
    }
}

// ============================================================================
// Stats cards
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self { label: label.into(), value: value.to_string() }
    }
}

/// One row of equal-width cards; cursor += 100
pub fn add_stats_cards(state: &mut RenderState, cards: &[StatCard]) {
    if cards.is_empty() {
        return;
    }
    state.check_page_break(CARD_ADVANCE);

    let g = *state.geometry();
    let y = state.y();
    let card_width = (g.width - 140.0) / cards.len() as f32;
    let value_style = TextStyle::bold(24.0, COLOR_PRIMARY);
    let label_style = TextStyle::regular(10.0, COLOR_MUTED);

    let mut x = g.margin_left;
    for card in cards {
        let inner = card_width - 10.0;
        state.rounded_rect(x, y, inner, CARD_HEIGHT, 5.0, Some(COLOR_WHITE), Some(COLOR_BORDER));
        state.circle(x + inner / 2.0, y + 29.0, 22.0, COLOR_BADGE);

        let value = fit_text(&card.value, value_style.size, value_style.weight, inner - 10.0);
        let value_w = text_width(&value, value_style.size, value_style.weight);
        state.text(x + (inner - value_w) / 2.0, y + 15.0, value, value_style);

        let label = fit_text(&card.label, label_style.size, label_style.weight, inner - 10.0);
        let label_w = text_width(&label, label_style.size, label_style.weight);
        state.text(x + (inner - label_w) / 2.0, y + 58.0, label, label_style);

        x += card_width;
    }

    state.advance(CARD_ADVANCE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn started() -> RenderState {
        let mut state = RenderState::default();
        add_header(&mut state, "Patient Medical Report", Utc.with_ymd_and_hms(2026, 10, 7, 9, 30, 0).unwrap());
        state
    }

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n).map(|i| vec![format!("row {}", i), "x".to_string()]).collect()
    }

    fn assert_within_bottom_limit(doc: &RenderedDocument) {
        let limit = doc.geometry.bottom_limit();
        for (i, page) in doc.pages.iter().enumerate() {
            assert!(page.content_bottom() <= limit + 0.01, "page {} overflows: {}", i, page.content_bottom());
        }
    }

    #[test]
    fn test_header_moves_cursor_to_140() {
        let state = started();
        assert_eq!(state.y(), 140.0);
        let texts: Vec<&str> = state.pages()[0].texts().collect();
        assert_eq!(texts[0], "MoviLabs");
        assert!(texts.contains(&"Generated on: October 7, 2026 at 09:30 AM"));
    }

    #[test]
    fn test_info_row_renders_na_for_missing_values() {
        let mut state = started();
        add_info_row(&mut state, "Blood Group", None);
        add_info_row(&mut state, "Phone", Some("   "));
        add_info_row(&mut state, "Gender", Some("Male"));
        assert_eq!(state.y(), 200.0);

        let texts: Vec<&str> = state.pages()[0].texts().collect();
        assert_eq!(texts.iter().filter(|t| **t == "N/A").count(), 2);
        assert!(texts.contains(&"Blood Group:"));
        assert!(texts.contains(&"Male"));
    }

    #[test]
    fn test_info_row_truncates_long_value() {
        let mut state = started();
        add_info_row(&mut state, "Address", Some(&"12 Gandhi Road, ".repeat(10)));
        let value = state.pages()[0].texts().last().unwrap().to_string();
        assert!(value.ends_with("..."));
    }

    #[test]
    fn test_section_header_advances_45() {
        let mut state = started();
        add_section_header(&mut state, "Patient Information", SectionIcon::Patient);
        assert_eq!(state.y(), 185.0);
        assert!(state.pages()[0].texts().any(|t| t == "Patient Information"));
    }

    #[test]
    fn test_table_checks_full_height_before_header() {
        let mut state = started();
        state.advance_to(600.0);
        // 5 rows + header at 30pt = 180pt, which does not fit above 761.89
        add_table(&mut state, &["A", "B"], &rows(5), &TableOptions::default());
        assert_eq!(state.page_count(), 2);
        assert!(state.pages()[1].texts().any(|t| t == "A"));
        assert!(!state.pages()[0].texts().any(|t| t == "A"));
        assert_eq!(state.y(), 50.0 + 180.0 + 20.0);
    }

    #[test]
    fn test_long_table_repeats_header_and_stays_above_bottom_limit() {
        let mut state = started();
        add_table(&mut state, &["A", "B"], &rows(60), &TableOptions::default());
        let doc = finalize(state);

        assert!(doc.page_count() >= 3);
        for page in &doc.pages {
            assert!(page.texts().any(|t| t == "A"));
        }
        assert_eq!(doc.texts().iter().filter(|t| t.starts_with("row ")).count(), 60);
        assert_within_bottom_limit(&doc);
    }

    #[test]
    fn test_table_uses_equal_widths_when_widths_mismatch() {
        let mut state = started();
        let options = TableOptions { column_widths: Some(vec![100.0]), row_height: Some(25.0) };
        add_table(&mut state, &["A", "B"], &rows(1), &options);

        let xs: Vec<f32> = state.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, text, .. } if text == "B" => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![50.0 + (595.28 - 100.0) / 2.0 + 5.0]);
        assert_eq!(state.y(), 140.0 + 50.0 + 20.0);
    }

    #[test]
    fn test_list_items_break_pages_individually() {
        let mut state = started();
        for i in 1..=60 {
            add_list_item(&mut state, i, "Penicillin", COLOR_DANGER);
        }
        let doc = finalize(state);
        assert_eq!(doc.page_count(), 2);
        assert!(doc.contains_text("60. Penicillin"));
        assert_within_bottom_limit(&doc);
    }

    #[test]
    fn test_stats_cards_advance_100() {
        let mut state = started();
        let cards = [StatCard::new("Total Patients", 12), StatCard::new("This Week", 4)];
        add_stats_cards(&mut state, &cards);
        assert_eq!(state.y(), 240.0);
        assert!(state.pages()[0].texts().any(|t| t == "12"));
    }

    #[test]
    fn test_paragraph_wraps_within_content() {
        let mut state = started();
        add_paragraph(&mut state, &"The doctor maintains a steady completion rate. ".repeat(8));
        let lines = state.pages()[0].texts().count() - 4;
        assert!(lines > 1);
        assert_eq!(state.y(), 140.0 + lines as f32 * 15.0);
    }

    #[test]
    fn test_finalize_numbers_every_page() {
        let mut state = started();
        for i in 1..=100 {
            add_info_row(&mut state, "Row", Some(&i.to_string()));
        }
        let doc = finalize(state);
        let total = doc.page_count();
        assert!(total > 1);
        for (i, page) in doc.pages.iter().enumerate() {
            let stamped: Vec<&str> = page.footer.iter().filter_map(DrawOp::text).collect();
            assert_eq!(stamped[0], FOOTER_TEXT);
            assert_eq!(stamped[1], format!("Page {} of {}", i + 1, total));
        }
        assert_within_bottom_limit(&doc);
    }
}
