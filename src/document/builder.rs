//! Quiz to object graph.

use crate::error::{Error, Result};
use crate::model::{Question, Quiz};

use super::content::{num, ContentBuilder, Font};
use super::escape::{escape_text, normalize_text};
use super::options::{ExportOptions, LayoutMetrics};
use super::{reference, DocumentObject, ObjectGraph, ObjectKind};

const CATALOG: u32 = 1;
const PAGE_TREE: u32 = 2;
const QUESTION_PAGE: u32 = 3;
const QUESTION_STREAM: u32 = 4;
const ANSWER_PAGE: u32 = 5;
const ANSWER_STREAM: u32 = 6;

/// Bisection steps when searching for the loosest layout that fits.
const FIT_STEPS: u32 = 16;

const PRODUCER: &str = "quizdoc";
const ANSWER_KEY_TITLE: &str = "ANSWER KEY";

/// Build the object graph for a quiz.
///
/// `questions` must already be in `order_index` order; the n-th question is
/// numbered `n` on both pages.
pub fn build(quiz: &Quiz, questions: &[Question], options: &ExportOptions) -> Result<ObjectGraph> {
    let layout = Layout { options };

    let mut kids = vec![QUESTION_PAGE];
    if options.answer_key {
        kids.push(ANSWER_PAGE);
    }

    let mut objects = vec![
        DocumentObject::dictionary(
            CATALOG,
            ObjectKind::Catalog,
            format!("<< /Type /Catalog /Pages {} >>", reference(PAGE_TREE)),
        ),
        DocumentObject::dictionary(
            PAGE_TREE,
            ObjectKind::PageTree,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.iter()
                    .map(|&k| reference(k))
                    .collect::<Vec<_>>()
                    .join(" "),
                kids.len()
            ),
        ),
        layout.page_object(QUESTION_PAGE, QUESTION_STREAM),
        DocumentObject::stream(
            QUESTION_STREAM,
            layout.fit(|m| layout.question_sheet(m, quiz, questions))?,
        ),
    ];

    if options.answer_key {
        objects.push(layout.page_object(ANSWER_PAGE, ANSWER_STREAM));
        objects.push(DocumentObject::stream(
            ANSWER_STREAM,
            layout.fit(|m| layout.answer_key(m, questions))?,
        ));
    }

    let info = if options.metadata {
        let number = objects.len() as u32 + 1;
        objects.push(DocumentObject::dictionary(
            number,
            ObjectKind::Info,
            layout.info_dictionary(quiz),
        ));
        Some(number)
    } else {
        None
    };

    log::debug!(
        "Built quiz {} graph: {} objects, {} pages, {} questions",
        quiz.id,
        objects.len(),
        kids.len(),
        questions.len()
    );

    Ok(ObjectGraph {
        objects,
        root: CATALOG,
        info,
    })
}

struct Layout<'a> {
    options: &'a ExportOptions,
}

impl Layout<'_> {
    /// Render with the configured metrics, tightening the per-question
    /// pitches if that overflows. Fails only when even the tightest pitches
    /// overflow.
    fn fit<F>(&self, render: F) -> Result<Vec<u8>>
    where
        F: Fn(&LayoutMetrics) -> Result<Vec<u8>>,
    {
        let base = &self.options.metrics;
        match render(base) {
            Err(Error::PageOverflow { .. }) if self.options.fit_to_page => {}
            other => return other,
        }

        let mut best = render(&base.scaled(0.0))?;
        let (mut low, mut high) = (0.0f32, 1.0f32);
        for _ in 0..FIT_STEPS {
            let factor = (low + high) / 2.0;
            match render(&base.scaled(factor)) {
                Ok(payload) => {
                    best = payload;
                    low = factor;
                }
                Err(Error::PageOverflow { .. }) => high = factor,
                Err(e) => return Err(e),
            }
        }

        log::debug!("Scaled question pitches by {:.3} to fit the page", low);
        Ok(best)
    }

    fn prepare(&self, text: &str) -> String {
        if self.options.normalize_text {
            normalize_text(text)
        } else {
            text.to_string()
        }
    }

    fn page_object(&self, number: u32, contents: u32) -> DocumentObject {
        let geometry = &self.options.geometry;
        let fonts = Font::ALL
            .iter()
            .map(|f| {
                format!(
                    "/{} << /Type /Font /Subtype /Type1 /BaseFont /{} >>",
                    f.resource_name(),
                    f.base_font()
                )
            })
            .collect::<Vec<_>>()
            .join(" ");

        DocumentObject::dictionary(
            number,
            ObjectKind::Page,
            format!(
                "<< /Type /Page /Parent {} /MediaBox [0 0 {} {}] /Resources << /Font << {} >> >> /Contents {} >>",
                reference(PAGE_TREE),
                num(geometry.width),
                num(geometry.height),
                fonts,
                reference(contents)
            ),
        )
    }

    fn question_sheet(
        &self,
        m: &LayoutMetrics,
        quiz: &Quiz,
        questions: &[Question],
    ) -> Result<Vec<u8>> {
        let body_pitch = LayoutMetrics::pitch_for(m.body_size, m.body_pitch);
        let mut page = ContentBuilder::new(1, self.options.geometry);

        page.text(
            Font::Bold,
            m.title_size,
            0.0,
            &self.prepare(&quiz.title),
            LayoutMetrics::pitch_for(m.title_size, m.title_pitch),
        );
        if let Some(description) = quiz.description.as_deref() {
            let description = self.prepare(description);
            if !description.is_empty() {
                page.text(Font::Regular, m.body_size, 0.0, &description, body_pitch);
            }
        }
        page.text(
            Font::Regular,
            m.body_size,
            0.0,
            &format!("Total Questions: {}", questions.len()),
            body_pitch,
        );
        let instructions = if self.options.answer_lines {
            "Instructions: Answer each question in the space provided."
        } else {
            "Instructions: Answer each question."
        };
        page.text(Font::Regular, m.body_size, 0.0, instructions, body_pitch);
        page.gap(m.header_gap);

        let question_pitch = LayoutMetrics::pitch_for(m.body_size, m.question_pitch);
        for (number, question) in (1..).zip(questions) {
            page.text(
                Font::Regular,
                m.body_size,
                0.0,
                &format!("{}. {}", number, self.prepare(&question.text)),
                question_pitch,
            );
            if self.options.answer_lines {
                for _ in 0..m.rules_per_question {
                    page.rule(m.rule_indent, m.rule_pitch);
                }
            }
            page.gap(m.question_gap);
        }

        page.finish()
    }

    fn answer_key(&self, m: &LayoutMetrics, questions: &[Question]) -> Result<Vec<u8>> {
        let mut page = ContentBuilder::new(2, self.options.geometry);

        page.text(
            Font::Bold,
            m.title_size,
            0.0,
            ANSWER_KEY_TITLE,
            LayoutMetrics::pitch_for(m.title_size, m.title_pitch),
        );
        page.gap(m.header_gap);

        let answer_pitch = LayoutMetrics::pitch_for(m.body_size, m.answer_pitch);
        for (number, question) in (1..).zip(questions) {
            page.text(
                Font::Regular,
                m.body_size,
                0.0,
                &format!("{}. {}", number, self.prepare(&question.answer)),
                answer_pitch,
            );
        }

        page.finish()
    }

    fn info_dictionary(&self, quiz: &Quiz) -> String {
        let mut entries = vec![format!("/Title ({})", escape_text(&self.prepare(&quiz.title)))];
        if let Some(description) = quiz.description.as_deref() {
            entries.push(format!(
                "/Subject ({})",
                escape_text(&self.prepare(description))
            ));
        }
        entries.push(format!("/Producer ({})", PRODUCER));
        entries.push(format!(
            "/CreationDate ({})",
            quiz.created_at.format("D:%Y%m%d%H%M%SZ")
        ));
        format!("<< {} >>", entries.join(" "))
    }
}
