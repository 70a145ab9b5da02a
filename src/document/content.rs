//! Content-stream builder with a top-down vertical cursor.

use crate::error::{Error, Result};

use super::escape::escape_text;
use super::options::PageGeometry;

/// Fonts available in every page's resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Every font, in resource order.
    pub const ALL: [Font; 2] = [Font::Regular, Font::Bold];

    /// Resource name used by the `Tf` operator.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// Standard 14 base font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

const RULE_WIDTH: f32 = 0.5;

/// Accumulates drawing operators for one page.
///
/// Each line is placed at the current cursor and then moves the cursor down
/// by its pitch, so the cursor only ever decreases.
#[derive(Debug)]
pub struct ContentBuilder {
    page: u32,
    geometry: PageGeometry,
    cursor: f32,
    lowest: f32,
    ops: String,
    lines: usize,
}

impl ContentBuilder {
    /// Start a page with the cursor at the top margin.
    pub fn new(page: u32, geometry: PageGeometry) -> Self {
        let top = geometry.top();
        Self {
            page,
            geometry,
            cursor: top,
            lowest: top,
            ops: String::new(),
            lines: 0,
        }
    }

    /// Current baseline position.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Number of lines (text and rules) placed so far.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Draw one line of text at `indent` from the left margin.
    ///
    /// `text` is escaped here; callers pass it unescaped. The line is never
    /// wrapped or clipped: text wider than the space between the margins
    /// runs past the right margin. Only the vertical extent is checked, in
    /// [`finish`](Self::finish).
    pub fn text(&mut self, font: Font, size: f32, indent: f32, text: &str, pitch: f32) {
        let y = self.place(pitch);
        let x = self.geometry.margin_left + indent;
        self.ops.push_str(&format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            font.resource_name(),
            num(size),
            num(x),
            num(y),
            escape_text(text)
        ));
    }

    /// Draw a horizontal ruled line from `indent` to the right margin.
    pub fn rule(&mut self, indent: f32, pitch: f32) {
        let y = self.place(pitch);
        let x = self.geometry.margin_left + indent;
        self.ops.push_str(&format!(
            "{} w {} {} m {} {} l S\n",
            num(RULE_WIDTH),
            num(x),
            num(y),
            num(self.geometry.right()),
            num(y)
        ));
    }

    /// Move the cursor down without drawing.
    pub fn gap(&mut self, amount: f32) {
        self.cursor -= amount.max(0.0);
    }

    /// Finish the page and return the stream payload.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.lowest < self.geometry.bottom() {
            return Err(Error::PageOverflow {
                page: self.page,
                required: self.geometry.top() - self.lowest,
                available: self.geometry.usable_height(),
            });
        }
        Ok(self.ops.into_bytes())
    }

    fn place(&mut self, pitch: f32) -> f32 {
        let y = self.cursor;
        self.lowest = self.lowest.min(y);
        self.cursor -= pitch.max(0.0);
        self.lines += 1;
        y
    }
}

/// Format a coordinate with at most two decimals and no exponent.
pub(crate) fn num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
