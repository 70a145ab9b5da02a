//! # quizdoc
//!
//! Quiz composition and PDF export for question banks.
//!
//! This library draws a random, filtered set of questions from a question
//! pool, persists it as an ordered quiz, and encodes that quiz into a
//! minimal, byte-exact PDF with a correct cross-reference index.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quizdoc::{compose_quiz, export_quiz, ComposeRequest, MemoryStore};
//!
//! fn main() -> quizdoc::Result<()> {
//!     let store = MemoryStore::open("bank.json")?;
//!
//!     // Draw three questions from subject 1, topic 1
//!     let request = ComposeRequest::new("Mechanics Quiz", 3).with_subject(1).with_topic(1);
//!     let composed = compose_quiz(&store, &store, &request)?;
//!
//!     // Question sheet with ruled answer lines
//!     let pdf = export_quiz(&store, composed.quiz.id, false)?;
//!     std::fs::write("quiz.pdf", pdf)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! QuizComposer -> (Quiz, Questions) -> document::build -> ObjectGraph -> serialize -> bytes
//! ```
//!
//! Every stage is a plain synchronous function of the previous stage's
//! output. Independent exports share nothing but the store.

pub mod compose;
pub mod document;
pub mod error;
pub mod inspect;
pub mod model;
pub mod serialize;
pub mod store;

// Re-export commonly used types
pub use compose::{ComposeOptions, ComposeRequest, ComposedQuiz, CompositionWarning, QuizComposer};
pub use document::{ExportOptions, LayoutMetrics, ObjectGraph, PageGeometry};
pub use error::{Error, Result};
pub use inspect::{inspect, DocumentReport};
pub use model::{Question, QuestionFilter, QuestionType, Quiz, QuizQuestionLink};
pub use store::{MemoryStore, QuestionBank, QuestionPool, QuizStore};

use rayon::prelude::*;

/// Compose a quiz with default options.
///
/// # Example
///
/// ```no_run
/// use quizdoc::{compose_quiz, ComposeRequest, MemoryStore};
///
/// let store = MemoryStore::open("bank.json").unwrap();
/// let composed = compose_quiz(&store, &store, &ComposeRequest::new("Review", 10)).unwrap();
/// for warning in &composed.warnings {
///     eprintln!("warning: {}", warning);
/// }
/// ```
pub fn compose_quiz(
    pool: &dyn QuestionPool,
    store: &dyn QuizStore,
    request: &ComposeRequest,
) -> Result<ComposedQuiz> {
    QuizComposer::new(pool, store).compose(request)
}

/// Export a stored quiz.
///
/// `include_answers = false` produces a question sheet with ruled answer
/// lines; `true` produces the sheet plus a trailing answer key page.
///
/// # Example
///
/// ```no_run
/// use quizdoc::{export_quiz, MemoryStore};
///
/// let store = MemoryStore::open("bank.json").unwrap();
/// let pdf = export_quiz(&store, 1, true).unwrap();
/// std::fs::write("quiz-with-key.pdf", pdf).unwrap();
/// ```
pub fn export_quiz(store: &dyn QuizStore, quiz_id: i64, include_answers: bool) -> Result<Vec<u8>> {
    export_quiz_with_options(
        store,
        quiz_id,
        &ExportOptions::from_include_answers(include_answers),
    )
}

/// Export a stored quiz with custom options.
pub fn export_quiz_with_options(
    store: &dyn QuizStore,
    quiz_id: i64,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let (quiz, questions) = load_quiz(store, quiz_id)?;
    let graph = document::build(&quiz, &questions, options)?;
    serialize::serialize(&graph)
}

/// Export several quizzes in parallel.
///
/// Results are returned in the order of `quiz_ids`; one failed export does
/// not affect the others.
pub fn export_quizzes<S>(
    store: &S,
    quiz_ids: &[i64],
    options: &ExportOptions,
) -> Vec<Result<Vec<u8>>>
where
    S: QuizStore,
{
    quiz_ids
        .par_iter()
        .map(|&id| export_quiz_with_options(store, id, options))
        .collect()
}

/// Fetch a quiz and its questions in `order_index` order.
fn load_quiz(store: &dyn QuizStore, quiz_id: i64) -> Result<(Quiz, Vec<Question>)> {
    let questions = store.quiz_questions(quiz_id)?;
    if questions.is_empty() {
        return Err(Error::QuizNotFound(quiz_id));
    }
    let quiz = store.quiz(quiz_id)?.ok_or(Error::QuizNotFound(quiz_id))?;
    Ok((quiz, questions))
}

/// Builder bundling compose and export options.
///
/// # Example
///
/// ```no_run
/// use quizdoc::{ComposeRequest, MemoryStore, QuizDoc};
///
/// let store = MemoryStore::open("bank.json")?;
/// let pdf = QuizDoc::new()
///     .with_seed(7)
///     .with_answer_key(true)
///     .compose_and_export(&store, &store, &ComposeRequest::new("Review", 5))?;
/// # Ok::<(), quizdoc::Error>(())
/// ```
pub struct QuizDoc {
    compose_options: ComposeOptions,
    export_options: ExportOptions,
}

impl QuizDoc {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            compose_options: ComposeOptions::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Use a fixed RNG seed when composing.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.compose_options = self.compose_options.with_seed(seed);
        self
    }

    /// Reject requests the pool cannot fill.
    pub fn strict(mut self) -> Self {
        self.compose_options = self.compose_options.with_underfill(false);
        self
    }

    /// Enable or disable ruled answer lines.
    pub fn with_answer_lines(mut self, enabled: bool) -> Self {
        self.export_options = self.export_options.with_answer_lines(enabled);
        self
    }

    /// Enable or disable the answer key page.
    pub fn with_answer_key(mut self, enabled: bool) -> Self {
        self.export_options = self.export_options.with_answer_key(enabled);
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.export_options = self.export_options.with_geometry(geometry);
        self
    }

    /// Set the layout metrics.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.export_options = self.export_options.with_metrics(metrics);
        self
    }

    /// Compose a quiz.
    pub fn compose(
        &self,
        pool: &dyn QuestionPool,
        store: &dyn QuizStore,
        request: &ComposeRequest,
    ) -> Result<ComposedQuiz> {
        QuizComposer::with_options(pool, store, self.compose_options.clone()).compose(request)
    }

    /// Export a stored quiz.
    pub fn export(&self, store: &dyn QuizStore, quiz_id: i64) -> Result<Vec<u8>> {
        export_quiz_with_options(store, quiz_id, &self.export_options)
    }

    /// Compose a quiz and export it straight away.
    pub fn compose_and_export(
        &self,
        pool: &dyn QuestionPool,
        store: &dyn QuizStore,
        request: &ComposeRequest,
    ) -> Result<Vec<u8>> {
        let composed = self.compose(pool, store, request)?;
        self.export(store, composed.quiz.id)
    }

    /// Export options in effect.
    pub fn export_options(&self) -> &ExportOptions {
        &self.export_options
    }
}

impl Default for QuizDoc {
    fn default() -> Self {
        Self::new()
    }
}
