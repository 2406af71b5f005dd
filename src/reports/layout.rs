//! Buffered page model and layout primitives
//!
//! Coordinates are PDF points with the origin at the top-left corner and y
//! growing downward. Drawing appends operations to the current page; nothing
//! touches the PDF backend until the document is finished and serialized, so
//! page counts are known when footers are stamped.

/// RGB color triple
pub type Rgb = (u8, u8, u8);

// ============================================================================
// Palette
// ============================================================================

pub const COLOR_PRIMARY: Rgb = (37, 99, 235);
pub const COLOR_SECONDARY: Rgb = (30, 64, 175);
pub const COLOR_ACCENT: Rgb = (59, 130, 246);
pub const COLOR_TEXT: Rgb = (31, 41, 55);
pub const COLOR_LIGHT_GRAY: Rgb = (243, 244, 246);
pub const COLOR_BORDER: Rgb = (229, 231, 235);
pub const COLOR_MUTED: Rgb = (107, 114, 128);
pub const COLOR_DANGER: Rgb = (220, 38, 38);
pub const COLOR_SUCCESS: Rgb = (22, 163, 74);
pub const COLOR_WARNING: Rgb = (217, 119, 6);
pub const COLOR_BADGE: Rgb = (219, 234, 254);
pub const COLOR_WHITE: Rgb = (255, 255, 255);

// ============================================================================
// Geometry
// ============================================================================

/// Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Cursor position after a page break
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Distance from the bottom edge that content must not cross
    pub margin_bottom: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin_top: 50.0,
        margin_left: 50.0,
        margin_right: 50.0,
        margin_bottom: 80.0,
    };

    /// Lowest y any body content may reach
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin_bottom
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Vertical room on a freshly broken page
    pub fn usable_height(&self) -> f32 {
        self.bottom_limit() - self.margin_top
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

// ============================================================================
// Draw operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Text style: size in points, color, weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub weight: FontWeight,
}

impl TextStyle {
    pub const fn regular(size: f32, color: Rgb) -> Self {
        Self { size, color, weight: FontWeight::Regular }
    }

    pub const fn bold(size: f32, color: Rgb) -> Self {
        Self { size, color, weight: FontWeight::Bold }
    }
}

/// One buffered drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Corner radius; zero for square corners
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        fill: Rgb,
    },
    /// `y` is the top of the text line
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

impl DrawOp {
    /// Lowest y this operation paints
    pub fn bottom(&self) -> f32 {
        match self {
            DrawOp::Rect { y, height, .. } => y + height,
            DrawOp::Circle { cy, radius, .. } => cy + radius,
            DrawOp::Text { y, style, .. } => y + style.size,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Everything drawn on one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    /// Footer lines, stamped at finalization below the bottom limit
    pub footer: Vec<DrawOp>,
}

impl Page {
    /// Body text in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }

    /// Lowest y reached by body content
    pub fn content_bottom(&self) -> f32 {
        self.ops.iter().map(DrawOp::bottom).fold(0.0, f32::max)
    }
}

// ============================================================================
// Render state
// ============================================================================

/// Mutable layout state for one report
///
/// Pages are only ever appended, so the current page is always the last one.
#[derive(Debug, Clone)]
pub struct RenderState {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl RenderState {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin_top,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Current cursor position
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Zero-based index of the page being drawn on
    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Move the cursor down by `dy`
    pub fn advance(&mut self, dy: f32) {
        self.y += dy.max(0.0);
    }

    /// Move the cursor down to `y`; the cursor never moves up within a page
    pub fn advance_to(&mut self, y: f32) {
        self.y = self.y.max(y);
    }

    /// Room left above the bottom limit
    pub fn remaining(&self) -> f32 {
        self.geometry.bottom_limit() - self.y
    }

    /// Start a new page if `required` points do not fit below the cursor.
    ///
    /// Returns whether a page was added. Nothing is added while the cursor is
    /// still at the top of a fresh page, so oversized requests cannot produce
    /// blank pages.
    pub fn check_page_break(&mut self, required: f32) -> bool {
        if required <= self.remaining() {
            return false;
        }
        if self.at_page_top() {
            return false;
        }
        self.new_page();
        true
    }

    /// Append a page and reset the cursor to the top margin
    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin_top;
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.geometry.margin_top
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Option<Rgb>, stroke: Option<Rgb>) {
        self.push(DrawOp::Rect { x, y, width, height, radius: 0.0, fill, stroke });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    ) {
        let radius = radius.clamp(0.0, width.min(height) / 2.0);
        self.push(DrawOp::Rect { x, y, width, height, radius, fill, stroke });
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32, fill: Rgb) {
        self.push(DrawOp::Circle { cx, cy, radius, fill });
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, style: TextStyle) {
        self.push(DrawOp::Text { x, y, text: text.into(), style });
    }

    /// Close the layout: stamp footers on every page and hand back the pages
    pub fn finish<F>(self, mut footer: F) -> RenderedDocument
    where
        F: FnMut(&PageGeometry, usize, usize) -> Vec<DrawOp>,
    {
        let total = self.pages.len();
        let geometry = self.geometry;
        let pages = self
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, mut page)| {
                page.footer = footer(&geometry, i + 1, total);
                page
            })
            .collect();

        RenderedDocument { geometry, pages }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(PageGeometry::A4)
    }
}

// ============================================================================
// Finished document
// ============================================================================

/// Finalized page descriptors, ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All body text, page by page
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().flat_map(Page::texts).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Index of the first page whose body contains `needle`
    pub fn page_of(&self, needle: &str) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.texts().any(|t| t.contains(needle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: TextStyle = TextStyle::regular(11.0, COLOR_TEXT);

    #[test]
    fn test_new_state_starts_at_top_margin() {
        let state = RenderState::default();
        assert_eq!(state.y(), 50.0);
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.geometry().bottom_limit(), 841.89 - 80.0);
    }

    #[test]
    fn test_primitives_do_not_move_cursor() {
        let mut state = RenderState::default();
        state.rect(50.0, 60.0, 100.0, 20.0, Some(COLOR_LIGHT_GRAY), None);
        state.circle(70.0, 70.0, 5.0, COLOR_PRIMARY);
        state.text(60.0, 62.0, "Hello", BODY);
        assert_eq!(state.y(), 50.0);
        assert_eq!(state.pages()[0].ops.len(), 3);
    }

    #[test]
    fn test_page_break_when_block_does_not_fit() {
        let mut state = RenderState::default();
        state.advance(700.0);
        assert!((state.remaining() - 11.89).abs() < 0.01);
        assert!(!state.check_page_break(10.0));
        assert!(state.check_page_break(20.0));
        assert_eq!(state.page_count(), 2);
        assert_eq!(state.page_index(), 1);
        assert_eq!(state.y(), 50.0);
    }

    #[test]
    fn test_oversized_request_on_fresh_page_adds_no_blank_page() {
        let mut state = RenderState::default();
        state.advance(400.0);
        assert!(state.check_page_break(2000.0));
        assert!(!state.check_page_break(2000.0));
        assert_eq!(state.page_count(), 2);
    }

    #[test]
    fn test_advance_to_never_moves_up() {
        let mut state = RenderState::default();
        state.advance_to(140.0);
        state.advance_to(100.0);
        assert_eq!(state.y(), 140.0);
    }

    #[test]
    fn test_finish_stamps_footer_with_totals() {
        let mut state = RenderState::default();
        state.text(60.0, 60.0, "first", BODY);
        state.new_page();
        state.text(60.0, 60.0, "second", BODY);

        let doc = state.finish(|g, page, total| {
            vec![DrawOp::Text {
                x: 0.0,
                y: g.height - 35.0,
                text: format!("Page {} of {}", page, total),
                style: BODY,
            }]
        });

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[1].footer[0].text(), Some("Page 2 of 2"));
        assert_eq!(doc.texts(), vec!["first", "second"]);
        assert_eq!(doc.page_of("second"), Some(1));
    }
}
