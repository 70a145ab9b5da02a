//! Question bank records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of question stored in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Free-text short answer
    #[default]
    ShortAnswer,
    /// Pick one of several choices
    MultipleChoice,
    /// True or false
    TrueFalse,
    /// Long-form written answer
    Essay,
}

impl QuestionType {
    /// All question types, in declaration order.
    pub const ALL: [QuestionType; 4] = [
        QuestionType::ShortAnswer,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Essay,
    ];

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Essay => "essay",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown question type: {}", s))
    }
}

/// A single question owned by the question pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question id
    pub id: i64,

    /// Prompt shown to the student
    pub text: String,

    /// Stored answer, shown on the answer key page
    pub answer: String,

    /// Owning subject
    pub subject_id: i64,

    /// Owning topic (belongs to `subject_id`)
    pub topic_id: i64,

    /// Question kind
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
}

impl Question {
    /// Create a short-answer question.
    pub fn new(
        id: i64,
        text: impl Into<String>,
        answer: impl Into<String>,
        subject_id: i64,
        topic_id: i64,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            answer: answer.into(),
            subject_id,
            topic_id,
            question_type: QuestionType::default(),
        }
    }

    /// Set the question type.
    pub fn with_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }
}

/// A subject groups topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// A topic within a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
}

/// Conjunction of optional filters over the question pool.
///
/// An unset dimension matches every question. An empty `question_types`
/// list is treated the same as an unset one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    pub subject_id: Option<i64>,
    pub topic_id: Option<i64>,
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
}

impl QuestionFilter {
    /// Create a filter that matches every question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one subject.
    pub fn with_subject(mut self, subject_id: i64) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    /// Restrict to one topic.
    pub fn with_topic(mut self, topic_id: i64) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    /// Restrict to a set of question types.
    pub fn with_types(mut self, types: impl IntoIterator<Item = QuestionType>) -> Self {
        self.question_types = types.into_iter().collect();
        self
    }

    /// Check whether a question satisfies every supplied filter.
    pub fn matches(&self, question: &Question) -> bool {
        self.subject_id.map_or(true, |id| question.subject_id == id)
            && self.topic_id.map_or(true, |id| question.topic_id == id)
            && (self.question_types.is_empty()
                || self.question_types.contains(&question.question_type))
    }

    /// Check whether no dimension is restricted.
    pub fn is_unrestricted(&self) -> bool {
        self.subject_id.is_none() && self.topic_id.is_none() && self.question_types.is_empty()
    }
}

impl fmt::Display for QuestionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrestricted() {
            return f.write_str("an unfiltered pool");
        }

        let mut parts = Vec::new();
        if let Some(id) = self.subject_id {
            parts.push(format!("subject {}", id));
        }
        if let Some(id) = self.topic_id {
            parts.push(format!("topic {}", id));
        }
        if !self.question_types.is_empty() {
            let types: Vec<&str> = self.question_types.iter().map(|t| t.as_str()).collect();
            parts.push(format!("types [{}]", types.join(", ")));
        }
        f.write_str(&parts.join(" / "))
    }
}
