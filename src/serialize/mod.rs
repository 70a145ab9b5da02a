//! Document serializer: object graph to bytes.
//!
//! Output layout:
//!
//! ```text
//! %PDF-1.4
//! 1 0 obj
//! << ... >>
//! endobj
//!
//! 4 0 obj
//! << /Length 123 >>
//! stream
//! ...payload...
//! endstream
//! endobj
//!
//! xref
//! 0 5
//! 0000000000 65535 f
//! 0000000009 00000 n
//! ...
//! trailer
//! << /Size 5 /Root 1 0 R >>
//! startxref
//! 512
//! %%EOF
//! ```
//!
//! Offsets are taken from a byte counter that every write goes through, at
//! the moment each object header is written.

mod xref;

pub use xref::{CrossReferenceEntry, ENTRY_LEN, FREE_HEAD_GENERATION};

use std::io::Write;

use crate::document::{reference, DocumentObject, ObjectBody, ObjectGraph, ObjectKind};
use crate::error::{Error, Result};

/// File header line.
pub const HEADER: &[u8] = b"%PDF-1.4\n";

/// End-of-file marker.
pub const EOF_MARKER: &[u8] = b"%%EOF\n";

/// A serialized document and the index computed while writing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedDocument {
    /// The complete file
    pub bytes: Vec<u8>,

    /// Cross-reference entries, free head first
    pub xref: Vec<CrossReferenceEntry>,

    /// Offset of the `xref` keyword
    pub startxref: usize,
}

/// Serialize a graph into a byte buffer.
pub fn serialize(graph: &ObjectGraph) -> Result<Vec<u8>> {
    Ok(serialize_document(graph)?.bytes)
}

/// Serialize a graph, keeping the computed cross-reference index.
pub fn serialize_document(graph: &ObjectGraph) -> Result<SerializedDocument> {
    let mut bytes = Vec::new();
    let (xref, startxref) = write_graph(graph, &mut OffsetWriter::new(&mut bytes))?;
    log::debug!(
        "Serialized {} objects into {} bytes (xref at {})",
        graph.len(),
        bytes.len(),
        startxref
    );
    Ok(SerializedDocument {
        bytes,
        xref,
        startxref,
    })
}

/// Serialize a graph into any writer. Returns the number of bytes written.
///
/// The graph is fully validated before the first byte is written, so an
/// invalid graph leaves the writer untouched. Failures after that point (a
/// write error, or an object offset too wide for a cross-reference entry)
/// can leave partial output; write to a buffer with [`serialize`] when
/// that matters.
pub fn serialize_to<W: Write>(graph: &ObjectGraph, writer: W) -> Result<usize> {
    let mut counter = OffsetWriter::new(writer);
    write_graph(graph, &mut counter)?;
    Ok(counter.offset())
}

fn write_graph<W: Write>(
    graph: &ObjectGraph,
    out: &mut OffsetWriter<W>,
) -> Result<(Vec<CrossReferenceEntry>, usize)> {
    validate(graph)?;

    out.write(HEADER)?;

    let mut xref = Vec::with_capacity(graph.len() + 1);
    xref.push(CrossReferenceEntry::free_head());
    for object in &graph.objects {
        xref.push(CrossReferenceEntry::in_use(out.offset(), object.generation));
        write_object(out, object)?;
    }

    let startxref = out.offset();
    out.write_str(&format!("xref\n0 {}\n", xref.len()))?;
    for entry in &xref {
        out.write_str(&entry.to_line()?)?;
    }

    let mut trailer = format!(
        "trailer\n<< /Size {} /Root {}",
        xref.len(),
        reference(graph.root)
    );
    if let Some(info) = graph.info {
        trailer.push_str(&format!(" /Info {}", reference(info)));
    }
    trailer.push_str(&format!(" >>\nstartxref\n{}\n", startxref));
    out.write_str(&trailer)?;
    out.write(EOF_MARKER)?;

    Ok((xref, startxref))
}

fn write_object<W: Write>(out: &mut OffsetWriter<W>, object: &DocumentObject) -> Result<()> {
    out.write_str(&format!("{} {} obj\n", object.number, object.generation))?;
    match &object.body {
        ObjectBody::Dictionary(dict) => out.write_str(dict)?,
        ObjectBody::Stream(Some(payload)) => {
            out.write_str(&format!("<< /Length {} >>\nstream\n", payload.len()))?;
            out.write(payload)?;
            out.write(b"\nendstream")?;
        }
        ObjectBody::Stream(None) => return Err(unfinalized(object.number)),
    }
    out.write(b"\nendobj\n\n")
}

/// Reject graphs that would serialize into a malformed file.
fn validate(graph: &ObjectGraph) -> Result<()> {
    if graph.is_empty() {
        return Err(Error::EncodingInvariant("object graph is empty".into()));
    }

    for (object, expected) in graph.objects.iter().zip(1u32..) {
        if object.number != expected {
            return Err(Error::EncodingInvariant(format!(
                "object {} found where object {} was expected",
                object.number, expected
            )));
        }
        if object.generation != 0 {
            return Err(Error::EncodingInvariant(format!(
                "object {} has generation {}",
                object.number, object.generation
            )));
        }
        match &object.body {
            ObjectBody::Stream(None) => return Err(unfinalized(object.number)),
            ObjectBody::Stream(Some(payload)) if contains(payload, b"endstream") => {
                return Err(Error::EncodingInvariant(format!(
                    "stream {} payload contains the endstream keyword",
                    object.number
                )));
            }
            _ => {}
        }
    }

    match graph.get(graph.root) {
        Some(root) if root.kind == ObjectKind::Catalog => {}
        _ => {
            return Err(Error::EncodingInvariant(format!(
                "root object {} is not a catalog",
                graph.root
            )))
        }
    }
    if let Some(info) = graph.info {
        if graph.get(info).map(|o| o.kind) != Some(ObjectKind::Info) {
            return Err(Error::EncodingInvariant(format!(
                "info object {} is not an info dictionary",
                info
            )));
        }
    }

    Ok(())
}

fn unfinalized(number: u32) -> Error {
    Error::EncodingInvariant(format!("stream {} has no finalized payload", number))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Writer wrapper that counts every byte passed through it.
struct OffsetWriter<W> {
    inner: W,
    offset: usize,
}

impl<W: Write> OffsetWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, data: &str) -> Result<()> {
        self.write(data.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_graph(payload: Option<Vec<u8>>) -> ObjectGraph {
        ObjectGraph {
            objects: vec![
                DocumentObject::dictionary(
                    1,
                    ObjectKind::Catalog,
                    "<< /Type /Catalog /Pages 2 0 R >>",
                ),
                DocumentObject::dictionary(
                    2,
                    ObjectKind::PageTree,
                    "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
                ),
                DocumentObject::dictionary(
                    3,
                    ObjectKind::Page,
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
                ),
                DocumentObject {
                    number: 4,
                    generation: 0,
                    kind: ObjectKind::ContentStream,
                    body: ObjectBody::Stream(payload),
                },
            ],
            root: 1,
            info: None,
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap()
    }

    #[test]
    fn test_header_and_eof() {
        let bytes = serialize(&minimal_graph(Some(b"BT ET".to_vec()))).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_offsets_point_at_headers() {
        let doc = serialize_document(&minimal_graph(Some(b"BT ET".to_vec()))).unwrap();
        assert_eq!(doc.xref.len(), 5);
        assert_eq!(doc.xref[0], CrossReferenceEntry::free_head());
        assert_eq!(doc.xref[1].byte_offset, HEADER.len());

        for (number, entry) in doc.xref.iter().enumerate().skip(1) {
            let header = format!("{} 0 obj\n", number);
            assert!(doc.bytes[entry.byte_offset..].starts_with(header.as_bytes()));
        }
    }

    #[test]
    fn test_startxref_points_at_keyword() {
        let doc = serialize_document(&minimal_graph(Some(b"BT ET".to_vec()))).unwrap();
        assert!(doc.bytes[doc.startxref..].starts_with(b"xref\n0 5\n"));
        let tail = format!("startxref\n{}\n%%EOF\n", doc.startxref);
        assert!(doc.bytes.ends_with(tail.as_bytes()));
    }

    #[test]
    fn test_stream_length_is_payload_bytes() {
        // "é" is two bytes in UTF-8.
        let payload = "BT (caf\u{e9}) Tj ET".as_bytes().to_vec();
        let bytes = serialize(&minimal_graph(Some(payload.clone()))).unwrap();

        let declared = format!("<< /Length {} >>\nstream\n", payload.len());
        let start = find(&bytes, declared.as_bytes()) + declared.len();
        assert_eq!(&bytes[start..start + payload.len()], payload.as_slice());
        assert!(bytes[start + payload.len()..].starts_with(b"\nendstream"));
    }

    #[test]
    fn test_object_framing() {
        let bytes = serialize(&minimal_graph(Some(Vec::new()))).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\n2 0 obj\n"));
        assert!(text.contains("4 0 obj\n<< /Length 0 >>\nstream\n\nendstream\nendobj\n\nxref\n"));
        assert!(text.contains("trailer\n<< /Size 5 /Root 1 0 R >>\nstartxref\n"));
    }

    #[test]
    fn test_unfinalized_stream_fails() {
        let result = serialize(&minimal_graph(None));
        assert!(matches!(result, Err(Error::EncodingInvariant(_))));
    }

    #[test]
    fn test_out_of_order_objects_fail() {
        let mut graph = minimal_graph(Some(Vec::new()));
        graph.objects.swap(1, 2);
        assert!(matches!(serialize(&graph), Err(Error::EncodingInvariant(_))));
    }

    #[test]
    fn test_endstream_in_payload_fails() {
        let graph = minimal_graph(Some(b"BT endstream ET".to_vec()));
        assert!(matches!(serialize(&graph), Err(Error::EncodingInvariant(_))));
    }

    #[test]
    fn test_root_must_be_catalog() {
        let mut graph = minimal_graph(Some(Vec::new()));
        graph.root = 2;
        assert!(matches!(serialize(&graph), Err(Error::EncodingInvariant(_))));
    }

    #[test]
    fn test_serialize_to_writer_matches_buffer() {
        let graph = minimal_graph(Some(b"BT ET".to_vec()));
        let mut out = Vec::new();
        let written = serialize_to(&graph, &mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(out, serialize(&graph).unwrap());
    }

    /// Accepts `limit` bytes, then fails every write.
    struct FailingWriter {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_failure_is_reported() {
        let mut writer = FailingWriter {
            written: Vec::new(),
            limit: 64,
        };
        let result = serialize_to(&minimal_graph(Some(b"BT ET".to_vec())), &mut writer);

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(writer.written.starts_with(HEADER));
    }

    #[test]
    fn test_invalid_graph_writes_nothing() {
        let mut out = Vec::new();
        assert!(serialize_to(&minimal_graph(None), &mut out).is_err());
        assert!(out.is_empty());
    }
}
