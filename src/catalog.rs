//! Representative payload catalog: the concrete parameter and result types
//! for the registered methods, as serde structs mirroring the wire protocol,
//! plus the [`Shape`] descriptors and the per-profile registry constructors.
//!
//! Wire unions are `#[serde(untagged)]` enums; closed integer code sets get
//! hand-written visitors so out-of-range codes fail to deserialize instead of
//! passing through.

use std::fmt;
use std::ops::RangeInclusive;

use serde::de::{self, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::registry::Registry;
use crate::shape::{Field, Shape};
use crate::types::{
    Location, Position, Range, TextDocumentIdentifier, TextDocumentItem,
    VersionedTextDocumentIdentifier,
};

#[cfg(test)]
mod tests;

/// JSON-RPC error codes used in reply error payloads.
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const SERVER_ERROR_START: i64 = -32000;
    pub const SERVER_ERROR_END: i64 = -32099;
    pub const REQUEST_CANCELLED: i64 = -32800;
}

/// Severity code of a [`Diagnostic`], wire values 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl DiagnosticSeverity {
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Information),
            4 => Some(Self::Hint),
            _ => None,
        }
    }
}

impl Serialize for DiagnosticSeverity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DiagnosticSeverity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeverityVisitor;

        impl Visitor<'_> for SeverityVisitor {
            type Value = DiagnosticSeverity;

            fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt.write_str("severity code 1..=4")
            }

            fn visit_u64<E: de::Error>(self, code: u64) -> std::result::Result<Self::Value, E> {
                DiagnosticSeverity::from_code(code)
                    .ok_or_else(|| E::custom(format!("severity code out of range: {code}")))
            }

            fn visit_i64<E: de::Error>(self, code: i64) -> std::result::Result<Self::Value, E> {
                u64::try_from(code)
                    .ok()
                    .and_then(DiagnosticSeverity::from_code)
                    .ok_or_else(|| E::custom(format!("severity code out of range: {code}")))
            }
        }

        deserializer.deserialize_u64(SeverityVisitor)
    }
}

/// Kind code of a [`CompletionItem`].
///
/// The typed enum covers the standard catalog's full 1..=25 set; the vendor
/// catalog accepts only 1..=18, which is enforced at the shape level by
/// [`Profile::completion_item_kinds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    Text = 1,
    Method = 2,
    Function = 3,
    Constructor = 4,
    Field = 5,
    Variable = 6,
    Class = 7,
    Interface = 8,
    Module = 9,
    Property = 10,
    Unit = 11,
    Value = 12,
    Enum = 13,
    Keyword = 14,
    Snippet = 15,
    Color = 16,
    File = 17,
    Reference = 18,
    Folder = 19,
    EnumMember = 20,
    Constant = 21,
    Struct = 22,
    Event = 23,
    Operator = 24,
    TypeParameter = 25,
}

impl CompletionItemKind {
    pub const fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            1 => Self::Text,
            2 => Self::Method,
            3 => Self::Function,
            4 => Self::Constructor,
            5 => Self::Field,
            6 => Self::Variable,
            7 => Self::Class,
            8 => Self::Interface,
            9 => Self::Module,
            10 => Self::Property,
            11 => Self::Unit,
            12 => Self::Value,
            13 => Self::Enum,
            14 => Self::Keyword,
            15 => Self::Snippet,
            16 => Self::Color,
            17 => Self::File,
            18 => Self::Reference,
            19 => Self::Folder,
            20 => Self::EnumMember,
            21 => Self::Constant,
            22 => Self::Struct,
            23 => Self::Event,
            24 => Self::Operator,
            25 => Self::TypeParameter,
            _ => return None,
        })
    }
}

impl Serialize for CompletionItemKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for CompletionItemKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = CompletionItemKind;

            fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt.write_str("completion item kind code 1..=25")
            }

            fn visit_u64<E: de::Error>(self, code: u64) -> std::result::Result<Self::Value, E> {
                CompletionItemKind::from_code(code)
                    .ok_or_else(|| E::custom(format!("completion item kind out of range: {code}")))
            }

            fn visit_i64<E: de::Error>(self, code: i64) -> std::result::Result<Self::Value, E> {
                u64::try_from(code)
                    .ok()
                    .and_then(CompletionItemKind::from_code)
                    .ok_or_else(|| E::custom(format!("completion item kind out of range: {code}")))
            }
        }

        deserializer.deserialize_u64(KindVisitor)
    }
}

/// Markup flavor of a [`MarkupContent`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Plaintext,
    Markdown,
}

/// Diagnostic code: an integer or a string, distinguished on the wire by the
/// JSON kind alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i64),
    String(String),
}

/// A reported problem in a document. Everything but the range and message is
/// optional and omitted from the wire when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<DiagnosticSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<NumberOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub message: String,
}

/// A plain string, or a code block tagged with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkedString {
    Plain(String),
    Tagged(LanguageString),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageString {
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hover {
    pub contents: MarkedString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// One definition site or several, distinguished on the wire by object vs
/// array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Definition {
    Single(Location),
    Many(Vec<Location>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupContent {
    pub kind: MarkupKind,
    pub value: String,
}

/// Documentation of a completion item: plain string or marked-up content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Documentation {
    Plain(String),
    Markup(MarkupContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CompletionItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    /// Opaque payload round-tripped back to the server on resolve; never
    /// interpreted here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionList {
    pub is_incomplete: bool,
    pub items: Vec<CompletionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenTextDocumentParams {
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeTextDocumentParams {
    pub text_document: VersionedTextDocumentIdentifier,
    pub content_changes: Vec<TextDocumentContentChangeEvent>,
}

/// One edit to a document's content. Without a range the text replaces the
/// whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentContentChangeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFormattingParams {
    pub text_document: TextDocumentIdentifier,
    pub options: FormattingOptions,
}

/// Which of the two co-evolving catalogs a registry is built for.
///
/// The catalogs overlap but diverge: the vendor variant predates the later
/// completion item kinds and supports only plain-string documentation. Each
/// profile freezes its own registry; their legal value sets are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "lowercase")]
pub enum Profile {
    Standard,
    Vendor,
}

impl Profile {
    /// Legal `CompletionItemKind` codes under this profile. Validation is
    /// strict: codes outside the profile's range fail decode.
    pub fn completion_item_kinds(self) -> RangeInclusive<i64> {
        match self {
            Self::Standard => 1..=25,
            Self::Vendor => 1..=18,
        }
    }

    /// Builds and freezes the registry for this profile.
    pub fn registry(self) -> Result<Registry> {
        Ok(Registry::builder()
            .notification("textDocument/didOpen", did_open_params())?
            .notification("textDocument/didChange", did_change_params())?
            .notification(
                "textDocument/publishDiagnostics",
                publish_diagnostics_params(),
            )?
            .request(
                "textDocument/hover",
                text_document_position_params(),
                Shape::nullable(hover()),
                response_error(),
            )?
            .request(
                "textDocument/definition",
                text_document_position_params(),
                Shape::nullable(definition()),
                response_error(),
            )?
            .request(
                "textDocument/completion",
                text_document_position_params(),
                self.completion_list(),
                response_error(),
            )?
            .request(
                "textDocument/formatting",
                document_formatting_params(),
                Shape::nullable(Shape::sequence(text_edit())),
                response_error(),
            )?
            .build())
    }

    fn completion_list(self) -> Shape {
        Shape::record([
            Field::required("isIncomplete", Shape::boolean()),
            Field::required("items", Shape::sequence(self.completion_item())),
        ])
    }

    fn completion_item(self) -> Shape {
        Shape::record([
            Field::required("label", Shape::string()),
            Field::optional("kind", Shape::IntRange(self.completion_item_kinds())),
            Field::optional("detail", Shape::string()),
            Field::optional("documentation", self.documentation()),
            Field::optional("insertText", Shape::string()),
            Field::optional("data", Shape::Opaque),
        ])
    }

    fn documentation(self) -> Shape {
        match self {
            Self::Standard => Shape::union([Shape::string(), markup_content()]),
            Self::Vendor => Shape::string(),
        }
    }
}

pub fn position() -> Shape {
    Shape::record([
        Field::required("line", Shape::uint()),
        Field::required("character", Shape::uint()),
    ])
}

pub fn range() -> Shape {
    Shape::refined(
        Shape::record([
            Field::required("start", position()),
            Field::required("end", position()),
        ]),
        "range with start <= end",
        |value| {
            let coordinates = |key: &str| {
                let p = &value[key];
                (p["line"].as_i64(), p["character"].as_i64())
            };
            coordinates("start") <= coordinates("end")
        },
    )
}

pub fn location() -> Shape {
    Shape::record([
        Field::required("uri", Shape::string()),
        Field::required("range", range()),
    ])
}

pub fn text_document_identifier() -> Shape {
    Shape::record([Field::required("uri", Shape::string())])
}

pub fn versioned_text_document_identifier() -> Shape {
    Shape::record([
        Field::required("uri", Shape::string()),
        Field::required("version", Shape::integer()),
    ])
}

pub fn text_document_item() -> Shape {
    Shape::record([
        Field::required("uri", Shape::string()),
        Field::required("languageId", Shape::string()),
        Field::required("version", Shape::integer()),
        Field::required("text", Shape::string()),
    ])
}

pub fn text_document_position_params() -> Shape {
    Shape::record([
        Field::required("textDocument", text_document_identifier()),
        Field::required("position", position()),
    ])
}

pub fn diagnostic() -> Shape {
    Shape::record([
        Field::required("range", range()),
        Field::optional("severity", Shape::IntRange(1..=4)),
        Field::optional("code", Shape::union([Shape::integer(), Shape::string()])),
        Field::optional("source", Shape::string()),
        Field::required("message", Shape::string()),
    ])
}

pub fn marked_string() -> Shape {
    Shape::union([
        Shape::string(),
        Shape::record([
            Field::required("language", Shape::string()),
            Field::required("value", Shape::string()),
        ]),
    ])
}

pub fn markup_content() -> Shape {
    Shape::record([
        Field::required("kind", Shape::StringEnum(&["plaintext", "markdown"])),
        Field::required("value", Shape::string()),
    ])
}

pub fn hover() -> Shape {
    Shape::record([
        Field::required("contents", marked_string()),
        Field::optional("range", range()),
    ])
}

pub fn definition() -> Shape {
    Shape::union([location(), Shape::sequence(location())])
}

pub fn text_edit() -> Shape {
    Shape::record([
        Field::required("range", range()),
        Field::required("newText", Shape::string()),
    ])
}

pub fn formatting_options() -> Shape {
    Shape::record([
        Field::required("tabSize", Shape::uint()),
        Field::required("insertSpaces", Shape::boolean()),
    ])
}

pub fn publish_diagnostics_params() -> Shape {
    Shape::record([
        Field::required("uri", Shape::string()),
        Field::required("diagnostics", Shape::sequence(diagnostic())),
    ])
}

pub fn did_open_params() -> Shape {
    Shape::record([Field::required("textDocument", text_document_item())])
}

pub fn did_change_params() -> Shape {
    Shape::record([
        Field::required("textDocument", versioned_text_document_identifier()),
        Field::required(
            "contentChanges",
            Shape::sequence(Shape::record([
                Field::optional("range", range()),
                Field::required("text", Shape::string()),
            ])),
        ),
    ])
}

pub fn document_formatting_params() -> Shape {
    Shape::record([
        Field::required("textDocument", text_document_identifier()),
        Field::required("options", formatting_options()),
    ])
}

/// The JSON-RPC error object every request's error payload conforms to.
/// Structurally distinct from every registered result shape, which is what
/// lets [`Registry::accept_result`] disambiguate replies.
pub fn response_error() -> Shape {
    Shape::record([
        Field::required("code", Shape::integer()),
        Field::required("message", Shape::string()),
        Field::optional("data", Shape::Opaque),
    ])
}
