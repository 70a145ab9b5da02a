//! Read-back checks for serialized documents.
//!
//! The inspector reads a document the way a direct-access reader would:
//! `startxref` first, then the cross-reference table, then each object at
//! its recorded offset. It only understands the classic (uncompressed)
//! table layout the serializer writes.

use regex::bytes::Regex;

use crate::error::{Error, Result};
use crate::serialize::{CrossReferenceEntry, ENTRY_LEN};

/// Magic prefix of the header line.
const MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.4"

/// What the inspector found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// Header version (e.g., "1.4")
    pub version: String,

    /// Offset of the `xref` keyword
    pub startxref: usize,

    /// Cross-reference entries, free head first
    pub entries: Vec<CrossReferenceEntry>,

    /// Every stream found, in file order
    pub streams: Vec<StreamReport>,
}

impl DocumentReport {
    /// Number of in-use objects.
    pub fn object_count(&self) -> usize {
        self.entries.iter().filter(|e| e.in_use).count()
    }
}

/// A stream and its declared length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    /// Owning object number
    pub object: u32,

    /// Value of `/Length`
    pub declared_length: usize,

    /// Decoded payload (lossy UTF-8)
    pub content: String,
}

/// Read the header version.
pub fn detect_version(data: &[u8]) -> Result<String> {
    if data.len() < MAGIC.len() + VERSION_LEN || !data.starts_with(MAGIC) {
        return Err(Error::Malformed("missing %PDF- header".into()));
    }

    let version = &data[MAGIC.len()..MAGIC.len() + VERSION_LEN];
    if !(version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit()) {
        return Err(Error::Malformed(format!(
            "invalid header version {:?}",
            String::from_utf8_lossy(version)
        )));
    }
    Ok(String::from_utf8_lossy(version).into_owned())
}

/// Find the `startxref` value at the end of the file.
pub fn read_startxref(data: &[u8]) -> Result<usize> {
    let re = compile(r"startxref\n(\d+)\n%%EOF\n?\z")?;
    let caps = re
        .captures(data)
        .ok_or_else(|| Error::Malformed("missing startxref trailer".into()))?;
    parse_number(&caps[1])
}

/// Parse the cross-reference table starting at `offset`.
pub fn read_xref(data: &[u8], offset: usize) -> Result<Vec<CrossReferenceEntry>> {
    let section = data
        .get(offset..)
        .ok_or_else(|| Error::Malformed(format!("startxref {} is past the end", offset)))?;

    let re = compile(r"\Axref\n0 (\d+)\n")?;
    let caps = re
        .captures(section)
        .ok_or_else(|| Error::Malformed(format!("no xref keyword at offset {}", offset)))?;
    let count = parse_number(&caps[1])?;
    let table = &section[caps[0].len()..];

    (0..count)
        .map(|i| {
            table
                .get(i * ENTRY_LEN..(i + 1) * ENTRY_LEN)
                .and_then(CrossReferenceEntry::parse_line)
                .ok_or_else(|| Error::Malformed(format!("bad xref entry {}", i)))
        })
        .collect()
}

/// Inspect a document and verify its index.
///
/// Fails if any in-use entry does not land on its own `"<n> 0 obj"` header,
/// or if any stream's `/Length` disagrees with its payload.
pub fn inspect(data: &[u8]) -> Result<DocumentReport> {
    let version = detect_version(data)?;
    let startxref = read_startxref(data)?;
    let entries = read_xref(data, startxref)?;

    match entries.first() {
        Some(head) if !head.in_use => {}
        _ => return Err(Error::Malformed("xref does not start with a free entry".into())),
    }

    for (number, entry) in entries.iter().enumerate().skip(1) {
        if !entry.in_use {
            continue;
        }
        let header = format!("{} {} obj", number, entry.generation);
        let at = data.get(entry.byte_offset..).unwrap_or_default();
        if !at.starts_with(header.as_bytes()) {
            return Err(Error::Malformed(format!(
                "xref entry {} points at offset {}, which is not \"{}\"",
                number, entry.byte_offset, header
            )));
        }
    }

    let streams = read_streams(data)?;

    Ok(DocumentReport {
        version,
        startxref,
        entries,
        streams,
    })
}

/// Check that bytes look like a document without full verification.
pub fn is_document(data: &[u8]) -> bool {
    detect_version(data).is_ok()
}

fn read_streams(data: &[u8]) -> Result<Vec<StreamReport>> {
    let re = compile(r"(\d+) 0 obj\n<< /Length (\d+) >>\nstream\n")?;

    re.captures_iter(data)
        .map(|caps| {
            let object = parse_number(&caps[1])?;
            let object = u32::try_from(object)
                .map_err(|_| Error::Malformed(format!("object number {} is too large", object)))?;
            let declared_length = parse_number(&caps[2])?;
            let start = caps.get(0).map_or(0, |m| m.end());

            let payload = start
                .checked_add(declared_length)
                .and_then(|end| data.get(start..end))
                .ok_or_else(|| {
                    Error::Malformed(format!("stream {} runs past the end of the file", object))
                })?;
            let end = start + payload.len();
            let after = data.get(end..).unwrap_or_default();
            if !after.starts_with(b"\nendstream") {
                return Err(Error::Malformed(format!(
                    "stream {} declares /Length {} but endstream is elsewhere",
                    object, declared_length
                )));
            }

            Ok(StreamReport {
                object,
                declared_length,
                content: String::from_utf8_lossy(payload).into_owned(),
            })
        })
        .collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Malformed(format!("inspector pattern: {}", e)))
}

fn parse_number(bytes: &[u8]) -> Result<usize> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Malformed(format!("bad number {:?}", String::from_utf8_lossy(bytes))))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n\n2 0 obj\n<< /Length 5 >>\nstream\nBT ET\nendstream\nendobj\n\nxref\n0 3\n0000000000 65535 f \n0000000009 00000 n \n0000000046 00000 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\nstartxref\n101\n%%EOF\n";

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(b"%PDF-1.7\n").unwrap(), "1.7");
        assert!(detect_version(b"%PDF").is_err());
        assert!(detect_version(b"<!DOCTYPE html>").is_err());
        assert!(detect_version(b"%PDF-x.y\n").is_err());
        assert!(is_document(b"%PDF-2.0\n"));
    }

    #[test]
    fn test_inspect_sample() {
        let report = inspect(SAMPLE).unwrap();
        assert_eq!(report.version, "1.4");
        assert_eq!(report.startxref, 101);
        assert_eq!(report.object_count(), 2);
        assert_eq!(report.streams.len(), 1);
        assert_eq!(report.streams[0].object, 2);
        assert_eq!(report.streams[0].content, "BT ET");
    }

    #[test]
    fn test_inspect_detects_wrong_offset() {
        let broken = String::from_utf8(SAMPLE.to_vec())
            .unwrap()
            .replace("0000000046 00000 n", "0000000047 00000 n");
        let err = inspect(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_inspect_detects_wrong_length() {
        let broken = String::from_utf8(SAMPLE.to_vec())
            .unwrap()
            .replace("/Length 5", "/Length 4");
        assert!(inspect(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_streams_reject_huge_length() {
        let data = format!(
            "4 0 obj\n<< /Length {} >>\nstream\nBT ET\nendstream\nendobj\n",
            usize::MAX
        );
        let err = read_streams(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));

        let past_end = b"4 0 obj\n<< /Length 500 >>\nstream\nBT ET\nendstream\nendobj\n";
        assert!(read_streams(past_end).is_err());
    }

    #[test]
    fn test_inspect_rejects_multibyte_xref_entry() {
        let broken = String::from_utf8(SAMPLE.to_vec())
            .unwrap()
            .replace("0000000009 00000 n \n", "000000000\u{e9} 0000 n \n");
        let err = inspect(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_missing_trailer() {
        assert!(read_startxref(b"%PDF-1.4\n").is_err());
    }
}
