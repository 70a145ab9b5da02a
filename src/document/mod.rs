//! Document model: the in-memory object graph of an exported quiz.
//!
//! A quiz becomes a small, fixed set of numbered objects:
//!
//! ```text
//! 1  Catalog            -> 2
//! 2  Pages              -> 3 [5]
//! 3  Page (questions)   -> 4
//! 4  Content stream
//! 5  Page (answer key)  -> 6      only with ExportOptions::answer_key
//! 6  Content stream
//! n  Info dictionary              only with ExportOptions::metadata
//! ```
//!
//! Object numbers are assigned in this order on every build, so the
//! references inside dictionaries are known before anything is written.

mod builder;
mod content;
mod escape;
mod options;

pub use builder::build;
pub use content::{ContentBuilder, Font};
pub use escape::{escape_text, normalize_text, unescape_text};
pub use options::{ExportOptions, LayoutMetrics, PageGeometry};

/// Role of an object in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Catalog,
    PageTree,
    Page,
    ContentStream,
    Info,
}

/// Body of a top-level object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// A complete dictionary, written verbatim
    Dictionary(String),

    /// A stream; `None` means the payload was never finalized
    Stream(Option<Vec<u8>>),
}

impl ObjectBody {
    /// Stream payload, if this is a finalized stream.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            ObjectBody::Stream(Some(payload)) => Some(payload),
            _ => None,
        }
    }
}

/// A numbered top-level object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentObject {
    /// Object number (1-based)
    pub number: u32,

    /// Generation number, always 0 for freshly built documents
    pub generation: u16,

    /// What the object is
    pub kind: ObjectKind,

    /// Object body
    pub body: ObjectBody,
}

impl DocumentObject {
    /// Create a dictionary object.
    pub fn dictionary(number: u32, kind: ObjectKind, dict: impl Into<String>) -> Self {
        Self {
            number,
            generation: 0,
            kind,
            body: ObjectBody::Dictionary(dict.into()),
        }
    }

    /// Create a content stream object.
    pub fn stream(number: u32, payload: Vec<u8>) -> Self {
        Self {
            number,
            generation: 0,
            kind: ObjectKind::ContentStream,
            body: ObjectBody::Stream(Some(payload)),
        }
    }

    /// Reference to this object (`"n 0 R"`).
    pub fn reference(&self) -> String {
        reference(self.number)
    }
}

/// Format an indirect reference.
pub fn reference(number: u32) -> String {
    format!("{} 0 R", number)
}

/// The complete object graph of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectGraph {
    /// Objects in object-number order
    pub objects: Vec<DocumentObject>,

    /// Number of the catalog object
    pub root: u32,

    /// Number of the info dictionary, if any
    pub info: Option<u32>,
}

impl ObjectGraph {
    /// Number of objects (excluding the free head entry).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the graph has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get an object by number (1-based).
    pub fn get(&self, number: u32) -> Option<&DocumentObject> {
        if number == 0 {
            return None;
        }
        self.objects
            .get((number - 1) as usize)
            .filter(|o| o.number == number)
    }

    /// Number of page objects.
    pub fn page_count(&self) -> usize {
        self.objects_of(ObjectKind::Page).count()
    }

    /// Iterate over objects of one kind, in number order.
    pub fn objects_of(&self, kind: ObjectKind) -> impl Iterator<Item = &DocumentObject> {
        self.objects.iter().filter(move |o| o.kind == kind)
    }

    /// Stream payloads in page order.
    pub fn content_streams(&self) -> Vec<&[u8]> {
        self.objects_of(ObjectKind::ContentStream)
            .filter_map(|o| o.body.payload())
            .collect()
    }
}
