//! Geometry and document-identity value types used pervasively by the
//! payload catalog. Purely structural; the only behavior is the range-order
//! check in [`Range::new`].

use parse_display::Display;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};


/// Zero-based position in a document. `character` counts UTF-16 code units,
/// not code points or bytes.
///
/// The derived ordering is lexicographic over (line, character).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[display("{line}:{character}")]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open span between two positions. A zero-width range denotes an
/// insertion point.
///
/// `start <= end` is a wire invariant, so deserialization goes through the
/// same order check as [`Range::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Fails with [`Error::ReversedRange`] when `start` comes after `end`.
    pub fn new(start: Position, end: Position) -> Result<Self> {
        if start > end {
            return Err(Error::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Wire form of [`Range`] before the order check has run.
#[derive(Deserialize)]
struct RawRange {
    start: Position,
    end: Position,
}

impl TryFrom<RawRange> for Range {
    type Error = Error;

    fn try_from(raw: RawRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

/// A range inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

/// Names an open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

/// Names a specific revision of an open document. `version` strictly
/// increases across edits, including undo and redo; the protocol defines no
/// wraparound or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    pub version: i64,
}

/// A document transferred in full: identity, language, revision, and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    pub language_id: String,
    pub version: i64,
    pub text: String,
}
