//! Record types shared by the composer, the store and the exporter.
//!
//! Questions, subjects and topics are owned by the question pool. Quizzes
//! and their ordered links are created by the composer and persisted by
//! the quiz store.

mod question;
mod quiz;

pub use question::{Question, QuestionFilter, QuestionType, Subject, Topic};
pub use quiz::{is_dense_ordering, links_for, NewQuiz, Quiz, QuizQuestionLink};
