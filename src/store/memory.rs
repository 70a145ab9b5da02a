//! In-memory store guarded by a read/write lock.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::model::{
    links_for, NewQuiz, Question, QuestionFilter, Quiz, QuizQuestionLink, Subject, Topic,
};

use super::{QuestionBank, QuestionPool, QuizStore};

/// Thread-safe in-memory question pool and quiz store.
///
/// Readers share the lock; [`QuizStore::create_quiz`] validates under the
/// write lock before mutating anything, so a failed call leaves no trace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bank: RwLock<QuestionBank>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the contents of a bank.
    pub fn from_bank(bank: QuestionBank) -> Self {
        Self {
            bank: RwLock::new(bank),
        }
    }

    /// Load a store from a bank file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_bank(QuestionBank::load(path)?))
    }

    /// Write the current contents to a bank file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.read()?.save(path)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<QuestionBank> {
        Ok(self.read()?.clone())
    }

    /// Add a subject.
    pub fn with_subject(self, id: i64, name: impl Into<String>) -> Self {
        self.mutate(|bank| {
            bank.subjects.push(Subject {
                id,
                name: name.into(),
            })
        })
    }

    /// Add a topic.
    pub fn with_topic(self, id: i64, subject_id: i64, name: impl Into<String>) -> Self {
        self.mutate(|bank| {
            bank.topics.push(Topic {
                id,
                subject_id,
                name: name.into(),
            })
        })
    }

    /// Add a question.
    pub fn with_question(self, question: Question) -> Self {
        self.mutate(|bank| bank.questions.push(question))
    }

    /// Every quiz, in creation order.
    pub fn quizzes(&self) -> Result<Vec<Quiz>> {
        Ok(self.read()?.quizzes.clone())
    }

    fn mutate(self, f: impl FnOnce(&mut QuestionBank)) -> Self {
        let mut bank = match self.bank.into_inner() {
            Ok(bank) => bank,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut bank);
        Self::from_bank(bank)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, QuestionBank>> {
        self.bank
            .read()
            .map_err(|_| Error::Store("question bank lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, QuestionBank>> {
        self.bank
            .write()
            .map_err(|_| Error::Store("question bank lock poisoned".into()))
    }
}

impl QuestionPool for MemoryStore {
    fn questions_matching(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let bank = self.read()?;
        Ok(bank
            .questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }

    fn topic(&self, topic_id: i64) -> Result<Option<Topic>> {
        let bank = self.read()?;
        Ok(bank.topics.iter().find(|t| t.id == topic_id).cloned())
    }
}

impl QuizStore for MemoryStore {
    fn create_quiz(
        &self,
        draft: NewQuiz,
        question_ids: &[i64],
    ) -> Result<(Quiz, Vec<QuizQuestionLink>)> {
        let mut bank = self.write()?;

        let known: HashSet<i64> = bank.questions.iter().map(|q| q.id).collect();
        let mut seen = HashSet::with_capacity(question_ids.len());
        for id in question_ids {
            if !known.contains(id) {
                return Err(Error::Store(format!("question {} does not exist", id)));
            }
            if !seen.insert(*id) {
                return Err(Error::Store(format!("question {} linked twice", id)));
            }
        }

        let quiz = draft.into_quiz(bank.next_quiz_id());
        let links = links_for(quiz.id, question_ids);

        bank.quizzes.push(quiz.clone());
        bank.links.extend_from_slice(&links);

        log::debug!(
            "Stored quiz {} with {} linked questions",
            quiz.id,
            links.len()
        );

        Ok((quiz, links))
    }

    fn quiz(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        let bank = self.read()?;
        Ok(bank.quizzes.iter().find(|q| q.id == quiz_id).cloned())
    }

    fn quiz_links(&self, quiz_id: i64) -> Result<Vec<QuizQuestionLink>> {
        let bank = self.read()?;
        let mut links: Vec<QuizQuestionLink> = bank
            .links
            .iter()
            .filter(|l| l.quiz_id == quiz_id)
            .copied()
            .collect();
        links.sort_by_key(|l| l.order_index);
        Ok(links)
    }

    fn quiz_questions(&self, quiz_id: i64) -> Result<Vec<Question>> {
        let links = self.quiz_links(quiz_id)?;
        let bank = self.read()?;

        links
            .iter()
            .map(|link| {
                bank.questions
                    .iter()
                    .find(|q| q.id == link.question_id)
                    .cloned()
                    .ok_or_else(|| {
                        Error::Store(format!(
                            "quiz {} links missing question {}",
                            quiz_id, link.question_id
                        ))
                    })
            })
            .collect()
    }
}
