//! # Storage Layer
//!
//! The question pool and the quiz table live outside this crate. This module
//! defines the two seams the composer and the exporter talk to:
//!
//! - [`QuestionPool`]: read access to validated question records.
//! - [`QuizStore`]: persistence of quizzes and their ordered question links.
//!
//! ## Consistency
//!
//! [`QuizStore::create_quiz`] is all-or-nothing: either the quiz row and
//! every link row are written, or nothing is. A quiz without links is never
//! observable.
//!
//! ## Implementations
//!
//! - [`MemoryStore`]: thread-safe in-memory store, optionally loaded from and
//!   saved to a JSON [`QuestionBank`] file.

mod bank;
mod memory;

pub use bank::QuestionBank;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::{NewQuiz, Question, QuestionFilter, Quiz, QuizQuestionLink, Topic};

/// Read access to the question pool.
pub trait QuestionPool: Send + Sync {
    /// Return every question satisfying all supplied filters, in a stable order.
    fn questions_matching(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Look up a topic by id.
    fn topic(&self, topic_id: i64) -> Result<Option<Topic>>;
}

/// Persistence for quizzes and their question links.
pub trait QuizStore: Send + Sync {
    /// Persist a quiz and one link per question id, in the given order.
    ///
    /// Implementations must write both or neither.
    fn create_quiz(
        &self,
        draft: NewQuiz,
        question_ids: &[i64],
    ) -> Result<(Quiz, Vec<QuizQuestionLink>)>;

    /// Get a quiz by id.
    fn quiz(&self, quiz_id: i64) -> Result<Option<Quiz>>;

    /// Get the links of a quiz, sorted by `order_index`.
    fn quiz_links(&self, quiz_id: i64) -> Result<Vec<QuizQuestionLink>>;

    /// Get the questions of a quiz, in `order_index` order.
    fn quiz_questions(&self, quiz_id: i64) -> Result<Vec<Question>>;
}
