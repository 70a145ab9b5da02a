//! Error types for quizdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for quizdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while composing or exporting a quiz.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Question bank file could not be read or written as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The candidate set for a composition request is empty.
    #[error("0 questions match {filter}")]
    NoMatchingQuestions {
        /// Human-readable description of the applied filters
        filter: String,
    },

    /// An explicit topic does not belong to the explicit subject.
    #[error("Topic {topic_id} belongs to subject {actual_subject_id}, not subject {subject_id}")]
    SubjectTopicMismatch {
        /// Subject requested by the caller
        subject_id: i64,
        /// Topic requested by the caller
        topic_id: i64,
        /// Subject the topic actually belongs to
        actual_subject_id: i64,
    },

    /// The quiz id does not resolve to any linked questions.
    #[error("Quiz {0} not found")]
    QuizNotFound(i64),

    /// The request itself is malformed (empty title, zero question count, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Laid-out content does not fit on its page.
    #[error("Page {page} content needs {required:.1}pt but only {available:.1}pt are available")]
    PageOverflow {
        /// Page number (1-indexed)
        page: u32,
        /// Vertical space the content needs
        required: f32,
        /// Vertical space between the margins
        available: f32,
    },

    /// The encoder produced (or was handed) something that would yield a
    /// malformed document. Always a bug.
    #[error("Encoding invariant violated: {0}")]
    EncodingInvariant(String),

    /// A document handed to the inspector is not well formed.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// The backing store failed or is inconsistent.
    #[error("Store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::QuizNotFound(42);
        assert_eq!(err.to_string(), "Quiz 42 not found");

        let err = Error::NoMatchingQuestions {
            filter: "subject 1 / topic 7".to_string(),
        };
        assert_eq!(err.to_string(), "0 questions match subject 1 / topic 7");
    }

    #[test]
    fn test_mismatch_display() {
        let err = Error::SubjectTopicMismatch {
            subject_id: 1,
            topic_id: 9,
            actual_subject_id: 3,
        };
        assert_eq!(
            err.to_string(),
            "Topic 9 belongs to subject 3, not subject 1"
        );
    }

    #[test]
    fn test_page_overflow_display() {
        let err = Error::PageOverflow {
            page: 1,
            required: 812.0,
            available: 648.0,
        };
        assert_eq!(
            err.to_string(),
            "Page 1 content needs 812.0pt but only 648.0pt are available"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
