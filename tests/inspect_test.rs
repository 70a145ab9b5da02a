//! Integration tests for reading exported documents back.

use quizdoc::inspect::{inspect, is_document, read_startxref, read_xref};
use quizdoc::{compose_quiz, export_quiz, ComposeRequest, Error, MemoryStore, Question};

fn exported(include_answers: bool) -> Vec<u8> {
    let store = MemoryStore::new()
        .with_subject(1, "History")
        .with_topic(1, 1, "Antiquity")
        .with_question(Question::new(1, "Who built the pyramids?", "Egyptians", 1, 1))
        .with_question(Question::new(2, "When did Rome fall?", "476", 1, 1));
    let request = ComposeRequest::new("Antiquity", 2).with_description("Short review");
    let id = compose_quiz(&store, &store, &request).unwrap().quiz.id;
    export_quiz(&store, id, include_answers).unwrap()
}

#[test]
fn test_inspect_question_sheet() {
    let pdf = exported(false);
    let report = inspect(&pdf).unwrap();

    assert_eq!(report.version, "1.4");
    // catalog, pages, page, stream, info
    assert_eq!(report.object_count(), 5);
    assert_eq!(report.streams.len(), 1);
    assert!(report.streams[0].content.contains("(Short review) Tj"));
}

#[test]
fn test_inspect_with_answer_key() {
    let pdf = exported(true);
    let report = inspect(&pdf).unwrap();

    assert_eq!(report.object_count(), 7);
    assert_eq!(report.streams.len(), 2);
    assert_eq!(report.streams[0].object, 4);
    assert_eq!(report.streams[1].object, 6);
    assert!(report.streams[1].content.starts_with("BT\n/F2 18 Tf\n"));
}

#[test]
fn test_trailer_references_info() {
    let pdf = exported(true);
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("trailer\n<< /Size 8 /Root 1 0 R /Info 7 0 R >>\nstartxref\n"));
    assert!(text.contains("/Producer (quizdoc)"));
}

#[test]
fn test_xref_table_from_startxref() {
    let pdf = exported(false);
    let offset = read_startxref(&pdf).unwrap();
    let entries = read_xref(&pdf, offset).unwrap();

    assert_eq!(entries.len(), 6);
    assert!(!entries[0].in_use);
    assert!(entries[1..].iter().all(|e| e.in_use));
    assert!(entries.windows(2).skip(1).all(|w| w[0].byte_offset < w[1].byte_offset));
}

#[test]
fn test_truncated_document_is_rejected() {
    let pdf = exported(false);
    let truncated = &pdf[..pdf.len() - 10];
    assert!(is_document(truncated));
    assert!(matches!(inspect(truncated), Err(Error::Malformed(_))));
}

#[test]
fn test_shifted_body_is_rejected() {
    let pdf = exported(false);
    let mut shifted = b"%PDF-1.4\n%extra\n".to_vec();
    shifted.extend_from_slice(&pdf[9..]);
    assert!(inspect(&shifted).is_err());
}
