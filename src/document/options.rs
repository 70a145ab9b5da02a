//! Export options and page configuration.

/// Options for exporting a quiz document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Draw ruled answer lines after each question
    pub answer_lines: bool,

    /// Append a trailing "ANSWER KEY" page
    pub answer_key: bool,

    /// Page size and margins
    pub geometry: PageGeometry,

    /// Font sizes and line pitches
    pub metrics: LayoutMetrics,

    /// Emit a document info dictionary (title, creation date)
    pub metadata: bool,

    /// NFC-normalize text and flatten embedded whitespace
    pub normalize_text: bool,

    /// Tighten per-question pitches when the page would overflow
    pub fit_to_page: bool,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the single "include answers" toggle onto the two export modes.
    ///
    /// `false` gives a question sheet with ruled answer lines; `true` gives
    /// the question sheet without lines plus a trailing answer key page.
    pub fn from_include_answers(include_answers: bool) -> Self {
        Self::default()
            .with_answer_lines(!include_answers)
            .with_answer_key(include_answers)
    }

    /// Enable or disable ruled answer lines.
    pub fn with_answer_lines(mut self, enabled: bool) -> Self {
        self.answer_lines = enabled;
        self
    }

    /// Enable or disable the answer key page.
    pub fn with_answer_key(mut self, enabled: bool) -> Self {
        self.answer_key = enabled;
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the layout metrics.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Enable or disable the info dictionary.
    pub fn with_metadata(mut self, enabled: bool) -> Self {
        self.metadata = enabled;
        self
    }

    /// Enable or disable text normalization.
    pub fn with_normalize_text(mut self, enabled: bool) -> Self {
        self.normalize_text = enabled;
        self
    }

    /// Enable or disable shrinking question pitches to fit the page.
    pub fn with_fit_to_page(mut self, enabled: bool) -> Self {
        self.fit_to_page = enabled;
        self
    }

    /// Number of pages the document will have.
    pub fn page_count(&self) -> u32 {
        if self.answer_key {
            2
        } else {
            1
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            answer_lines: true,
            answer_key: false,
            geometry: PageGeometry::default(),
            metrics: LayoutMetrics::default(),
            metadata: true,
            normalize_text: true,
            fit_to_page: true,
        }
    }
}

/// Fixed page size and margins, in points (1 point = 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageGeometry {
    /// Page with uniform margins.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin_top: margin,
            margin_bottom: margin,
            margin_left: margin,
            margin_right: margin,
        }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0, 54.0) // 8.5 * 72, 11 * 72
    }

    /// A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0, 54.0) // 210mm * 2.834, 297mm * 2.834
    }

    /// Baseline of the first line.
    pub fn top(&self) -> f32 {
        self.height - self.margin_top
    }

    /// Lowest allowed baseline.
    pub fn bottom(&self) -> f32 {
        self.margin_bottom
    }

    /// Vertical space between the margins.
    pub fn usable_height(&self) -> f32 {
        self.top() - self.bottom()
    }

    /// Right edge of the text area.
    pub fn right(&self) -> f32 {
        self.width - self.margin_right
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Smallest spacing between ruled answer lines when fitting a page.
pub const MIN_RULE_PITCH: f32 = 8.0;

/// Font sizes and vertical advances.
///
/// Every drawn line advances the cursor by its pitch; pitches are always
/// at least the font size so consecutive lines never overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub title_size: f32,
    pub title_pitch: f32,
    pub body_size: f32,
    pub body_pitch: f32,
    /// Extra space after the header block
    pub header_gap: f32,
    pub question_pitch: f32,
    /// Ruled lines drawn after each question
    pub rules_per_question: u32,
    pub rule_pitch: f32,
    /// Left indent of ruled lines
    pub rule_indent: f32,
    /// Extra space after each question block
    pub question_gap: f32,
    pub answer_pitch: f32,
}

impl LayoutMetrics {
    /// Tighter pitches for longer quizzes.
    pub fn compact() -> Self {
        Self {
            title_size: 16.0,
            title_pitch: 22.0,
            body_size: 10.0,
            body_pitch: 14.0,
            header_gap: 8.0,
            question_pitch: 14.0,
            rules_per_question: 3,
            rule_pitch: 13.0,
            rule_indent: 14.0,
            question_gap: 4.0,
            answer_pitch: 13.0,
        }
    }

    /// Scale the per-question pitches and gap by `factor` (clamped to 0..=1).
    ///
    /// Text pitches never drop below the body size. Ruled lines carry no
    /// glyphs and stop at [`MIN_RULE_PITCH`]. Header pitches are unchanged.
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let text = |pitch: f32| Self::pitch_for(self.body_size, pitch * factor);
        Self {
            question_pitch: text(self.question_pitch),
            answer_pitch: text(self.answer_pitch),
            rule_pitch: (self.rule_pitch * factor).max(MIN_RULE_PITCH.min(self.rule_pitch)),
            question_gap: self.question_gap * factor,
            ..*self
        }
    }

    /// Size the text with the given pitch, never below the font size.
    pub(crate) fn pitch_for(size: f32, pitch: f32) -> f32 {
        pitch.max(size)
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            title_size: 18.0,
            title_pitch: 26.0,
            body_size: 11.0,
            body_pitch: 16.0,
            header_gap: 12.0,
            question_pitch: 18.0,
            rules_per_question: 3,
            rule_pitch: 16.0,
            rule_indent: 18.0,
            question_gap: 6.0,
            answer_pitch: 16.0,
        }
    }
}
