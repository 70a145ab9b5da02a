//! Quiz records and their ordered question links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Quiz id, assigned by the store
    pub id: i64,

    /// Quiz title
    pub title: String,

    /// Optional description shown under the title
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A quiz before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewQuiz {
    /// Create a draft stamped with the current time.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
            created_at: Utc::now(),
        }
    }

    /// Attach the store-assigned id.
    pub fn into_quiz(self, id: i64) -> Quiz {
        Quiz {
            id,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

/// Position of one question inside a quiz.
///
/// `order_index` is 1-based and dense within a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionLink {
    pub quiz_id: i64,
    pub question_id: i64,
    pub order_index: u32,
}

/// Build the links for a quiz from question ids in draw order.
pub fn links_for(quiz_id: i64, question_ids: &[i64]) -> Vec<QuizQuestionLink> {
    question_ids
        .iter()
        .zip(1u32..)
        .map(|(&question_id, order_index)| QuizQuestionLink {
            quiz_id,
            question_id,
            order_index,
        })
        .collect()
}

/// Check that links form the contiguous range `1..=n` with no repeated question.
pub fn is_dense_ordering(links: &[QuizQuestionLink]) -> bool {
    let mut indices: Vec<u32> = links.iter().map(|l| l.order_index).collect();
    indices.sort_unstable();
    let contiguous = indices.iter().zip(1u32..).all(|(&got, want)| got == want);

    let mut ids: Vec<i64> = links.iter().map(|l| l.question_id).collect();
    ids.sort_unstable();
    ids.dedup();

    contiguous && ids.len() == links.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_for_assigns_draw_order() {
        let links = links_for(7, &[30, 10, 20]);
        let order: Vec<(i64, u32)> = links.iter().map(|l| (l.question_id, l.order_index)).collect();
        assert_eq!(order, vec![(30, 1), (10, 2), (20, 3)]);
        assert!(links.iter().all(|l| l.quiz_id == 7));
        assert!(is_dense_ordering(&links));
    }

    #[test]
    fn test_dense_ordering_rejects_gaps_and_duplicates() {
        let mut links = links_for(1, &[1, 2, 3]);
        links[2].order_index = 4;
        assert!(!is_dense_ordering(&links));

        let links = links_for(1, &[5, 5]);
        assert!(!is_dense_ordering(&links));
    }

    #[test]
    fn test_empty_links_are_dense() {
        assert!(is_dense_ordering(&[]));
    }
}
