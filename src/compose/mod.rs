//! Quiz composition: filter the question pool, draw a random subset and
//! persist it as an ordered quiz.
//!
//! # Example
//!
//! ```no_run
//! use quizdoc::compose::{ComposeRequest, QuizComposer};
//! use quizdoc::store::MemoryStore;
//!
//! fn main() -> quizdoc::Result<()> {
//!     let store = MemoryStore::open("bank.json")?;
//!     let composer = QuizComposer::new(&store, &store);
//!
//!     let request = ComposeRequest::new("Mechanics", 3).with_subject(1).with_topic(1);
//!     let composed = composer.compose(&request)?;
//!     println!("quiz {} has {} questions", composed.quiz.id, composed.links.len());
//!     Ok(())
//! }
//! ```

mod sample;

pub use sample::sample_without_replacement;

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::model::{NewQuiz, Question, QuestionFilter, QuestionType, Quiz, QuizQuestionLink};
use crate::store::{QuestionPool, QuizStore};

/// A request to generate a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeRequest {
    /// Quiz title
    pub title: String,

    /// Optional quiz description
    pub description: Option<String>,

    /// Pool filters
    pub filter: QuestionFilter,

    /// Number of questions wanted
    pub question_count: usize,
}

impl ComposeRequest {
    /// Create a request over the whole pool.
    pub fn new(title: impl Into<String>, question_count: usize) -> Self {
        Self {
            title: title.into(),
            description: None,
            filter: QuestionFilter::default(),
            question_count,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict to one subject.
    pub fn with_subject(mut self, subject_id: i64) -> Self {
        self.filter.subject_id = Some(subject_id);
        self
    }

    /// Restrict to one topic.
    pub fn with_topic(mut self, topic_id: i64) -> Self {
        self.filter.topic_id = Some(topic_id);
        self
    }

    /// Restrict to a set of question types.
    pub fn with_types(mut self, types: impl IntoIterator<Item = QuestionType>) -> Self {
        self.filter.question_types = types.into_iter().collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidRequest("quiz title is empty".into()));
        }
        if self.question_count == 0 {
            return Err(Error::InvalidRequest(
                "question count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Options controlling composition.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Accept fewer questions than requested when the pool is small
    pub allow_underfill: bool,

    /// Seed for a reproducible draw (thread RNG when unset)
    pub seed: Option<u64>,
}

impl ComposeOptions {
    /// Create new compose options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable under-fill.
    pub fn with_underfill(mut self, allow: bool) -> Self {
        self.allow_underfill = allow;
        self
    }

    /// Use a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            allow_underfill: true,
            seed: None,
        }
    }
}

/// Non-fatal conditions met while composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionWarning {
    /// Fewer candidates than requested; every candidate was drawn.
    Underfilled {
        /// Questions asked for
        requested: usize,
        /// Questions available (and drawn)
        available: usize,
    },
}

impl fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionWarning::Underfilled {
                requested,
                available,
            } => write!(
                f,
                "requested {} questions but only {} match; using all {}",
                requested, available, available
            ),
        }
    }
}

/// Result of a successful composition.
#[derive(Debug, Clone)]
pub struct ComposedQuiz {
    /// The persisted quiz
    pub quiz: Quiz,

    /// Persisted links, `order_index` 1..=n
    pub links: Vec<QuizQuestionLink>,

    /// Drawn questions, in link order
    pub questions: Vec<Question>,

    /// Non-fatal conditions
    pub warnings: Vec<CompositionWarning>,
}

impl ComposedQuiz {
    /// Number of questions in the quiz.
    pub fn question_count(&self) -> usize {
        self.links.len()
    }

    /// Check if any warning was raised.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Draws questions from a pool and persists quizzes.
pub struct QuizComposer<'a> {
    pool: &'a dyn QuestionPool,
    store: &'a dyn QuizStore,
    options: ComposeOptions,
}

impl<'a> QuizComposer<'a> {
    /// Create a composer with default options.
    pub fn new(pool: &'a dyn QuestionPool, store: &'a dyn QuizStore) -> Self {
        Self::with_options(pool, store, ComposeOptions::default())
    }

    /// Create a composer with custom options.
    pub fn with_options(
        pool: &'a dyn QuestionPool,
        store: &'a dyn QuizStore,
        options: ComposeOptions,
    ) -> Self {
        Self {
            pool,
            store,
            options,
        }
    }

    /// Validate the request, draw the questions and persist the quiz.
    pub fn compose(&self, request: &ComposeRequest) -> Result<ComposedQuiz> {
        request.validate()?;
        self.check_subject_topic(&request.filter)?;

        let candidates = self.pool.questions_matching(&request.filter)?;
        if candidates.is_empty() {
            return Err(Error::NoMatchingQuestions {
                filter: request.filter.to_string(),
            });
        }

        let mut warnings = Vec::new();
        if request.question_count > candidates.len() {
            let warning = CompositionWarning::Underfilled {
                requested: request.question_count,
                available: candidates.len(),
            };
            if !self.options.allow_underfill {
                return Err(Error::InvalidRequest(warning.to_string()));
            }
            log::warn!("Quiz \"{}\": {}", request.title, warning);
            warnings.push(warning);
        }

        let questions = match self.options.seed {
            Some(seed) => sample_without_replacement(
                &candidates,
                request.question_count,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => sample_without_replacement(
                &candidates,
                request.question_count,
                &mut rand::thread_rng(),
            ),
        };

        log::debug!(
            "Drew {} of {} candidates matching {}",
            questions.len(),
            candidates.len(),
            request.filter
        );

        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let draft = NewQuiz::new(request.title.trim(), request.description.clone());
        let (quiz, links) = self.store.create_quiz(draft, &ids)?;

        Ok(ComposedQuiz {
            quiz,
            links,
            questions,
            warnings,
        })
    }

    fn check_subject_topic(&self, filter: &QuestionFilter) -> Result<()> {
        let (Some(subject_id), Some(topic_id)) = (filter.subject_id, filter.topic_id) else {
            return Ok(());
        };

        // An unknown topic simply yields an empty candidate set.
        match self.pool.topic(topic_id)? {
            Some(topic) if topic.subject_id != subject_id => Err(Error::SubjectTopicMismatch {
                subject_id,
                topic_id,
                actual_subject_id: topic.subject_id,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::is_dense_ordering;
    use crate::store::MemoryStore;

    fn store_with(count: i64) -> MemoryStore {
        let mut store = MemoryStore::new()
            .with_subject(1, "Physics")
            .with_subject(2, "Chemistry")
            .with_topic(1, 1, "Mechanics")
            .with_topic(2, 2, "Bonds");
        for id in 1..=count {
            store = store.with_question(Question::new(
                id,
                format!("Question {}", id),
                format!("Answer {}", id),
                1,
                1,
            ));
        }
        store
    }

    #[test]
    fn test_compose_draws_requested_count() {
        let store = store_with(5);
        let composer = QuizComposer::new(&store, &store);
        let request = ComposeRequest::new("Mechanics", 3)
            .with_subject(1)
            .with_topic(1);

        let composed = composer.compose(&request).unwrap();
        assert_eq!(composed.question_count(), 3);
        assert!(!composed.has_warnings());
        assert!(is_dense_ordering(&composed.links));

        let order: Vec<u32> = composed.links.iter().map(|l| l.order_index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_compose_underfill_warns() {
        let store = store_with(5);
        let composer = QuizComposer::new(&store, &store);
        let composed = composer.compose(&ComposeRequest::new("All", 10)).unwrap();

        assert_eq!(composed.question_count(), 5);
        assert_eq!(
            composed.warnings,
            vec![CompositionWarning::Underfilled {
                requested: 10,
                available: 5
            }]
        );
    }

    #[test]
    fn test_compose_underfill_rejected_when_disabled() {
        let store = store_with(2);
        let options = ComposeOptions::new().with_underfill(false);
        let composer = QuizComposer::with_options(&store, &store, options);
        let result = composer.compose(&ComposeRequest::new("All", 3));

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert!(store.quizzes().unwrap().is_empty());
    }

    #[test]
    fn test_compose_empty_pool_creates_nothing() {
        let store = store_with(3);
        let composer = QuizComposer::new(&store, &store);
        let request = ComposeRequest::new("Bonds", 1).with_subject(2).with_topic(2);

        let err = composer.compose(&request).unwrap_err();
        assert!(matches!(err, Error::NoMatchingQuestions { .. }));
        assert_eq!(err.to_string(), "0 questions match subject 2 / topic 2");
        assert!(store.quizzes().unwrap().is_empty());
    }

    #[test]
    fn test_compose_subject_topic_mismatch() {
        let store = store_with(3);
        let composer = QuizComposer::new(&store, &store);
        let request = ComposeRequest::new("Mixed", 1).with_subject(1).with_topic(2);

        let result = composer.compose(&request);
        assert!(matches!(
            result,
            Err(Error::SubjectTopicMismatch {
                subject_id: 1,
                topic_id: 2,
                actual_subject_id: 2
            })
        ));
    }

    #[test]
    fn test_compose_rejects_invalid_requests() {
        let store = store_with(3);
        let composer = QuizComposer::new(&store, &store);

        assert!(matches!(
            composer.compose(&ComposeRequest::new("  ", 1)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            composer.compose(&ComposeRequest::new("Zero", 0)),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_compose_seeded_is_reproducible() {
        let store_a = store_with(20);
        let store_b = store_with(20);
        let options = ComposeOptions::new().with_seed(99);
        let request = ComposeRequest::new("Seeded", 5);

        let a = QuizComposer::with_options(&store_a, &store_a, options.clone())
            .compose(&request)
            .unwrap();
        let b = QuizComposer::with_options(&store_b, &store_b, options)
            .compose(&request)
            .unwrap();

        let ids = |c: &ComposedQuiz| c.questions.iter().map(|q| q.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_links_follow_draw_order() {
        let store = store_with(8);
        let composer = QuizComposer::new(&store, &store);
        let composed = composer.compose(&ComposeRequest::new("Order", 4)).unwrap();

        for (link, question) in composed.links.iter().zip(&composed.questions) {
            assert_eq!(link.question_id, question.id);
        }
        let stored = store.quiz_questions(composed.quiz.id).unwrap();
        assert_eq!(stored, composed.questions);
    }
}
