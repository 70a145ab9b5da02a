//! JSON question bank file.

use crate::error::Result;
use crate::model::{Question, Quiz, QuizQuestionLink, Subject, Topic};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a [`MemoryStore`](super::MemoryStore) holds, in file form.
///
/// ```json
/// {
///   "subjects": [{ "id": 1, "name": "Physics" }],
///   "topics": [{ "id": 1, "subjectId": 1, "name": "Mechanics" }],
///   "questions": [{ "id": 1, "text": "...", "answer": "...",
///                   "subjectId": 1, "topicId": 1, "type": "short_answer" }],
///   "quizzes": [],
///   "links": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub links: Vec<QuizQuestionLink>,
}

impl QuestionBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a bank from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the bank as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a bank file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the bank to a file, replacing it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Next unused quiz id.
    pub(crate) fn next_quiz_id(&self) -> i64 {
        self.quizzes.iter().map(|q| q.id).max().unwrap_or(0) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults_missing_tables() {
        let bank = QuestionBank::from_json(r#"{ "subjects": [{ "id": 1, "name": "Math" }] }"#)
            .unwrap();
        assert_eq!(bank.subjects.len(), 1);
        assert!(bank.questions.is_empty());
        assert!(bank.links.is_empty());
    }

    #[test]
    fn test_question_type_defaults_when_absent() {
        let bank = QuestionBank::from_json(
            r#"{ "questions": [{ "id": 3, "text": "Q", "answer": "A", "subjectId": 1, "topicId": 2 }] }"#,
        )
        .unwrap();
        assert_eq!(bank.questions[0].question_type, Default::default());
    }

    #[test]
    fn test_next_quiz_id() {
        let bank = QuestionBank::new();
        assert_eq!(bank.next_quiz_id(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");

        let mut bank = QuestionBank::new();
        bank.questions
            .push(Question::new(1, "Define inertia (Newton)", "Resistance to change", 1, 1));
        bank.save(&path).unwrap();

        let loaded = QuestionBank::load(&path).unwrap();
        assert_eq!(loaded, bank);
    }
}
