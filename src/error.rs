//! Error types for building, reading and writing morphologies.
//!
//! The taxonomy separates fatal input problems ([RawDataError]) from
//! programmatic misuse ([MissingParentError], [SectionOutOfRange]),
//! unsupported files ([UnknownFileType]) and export failures ([WriterError]).
//! [MorphError] aggregates all of them for the file-level API.
//!
//! Non-fatal problems are not errors; see [crate::warning].

use crate::model::sample::Sample;
use crate::model::{SectionId, SectionType};
use crate::parser::{ByteParser, ByteSource};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =#========================================================================#=
// RAW DATA ERROR KIND
// =#========================================================================$=
/// Kinds of malformed input that abort a build.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum RawDataErrorKind {
    #[error("unable to parse line")]
    LineNonParsable,
    #[error("unsupported section type {0}")]
    UnsupportedSectionType(i32),
    #[error("sample {id} has parent {parent_id} which is not defined")]
    MissingParent { id: u32, parent_id: i32 },
    #[error("sample {id} is its own parent")]
    SelfParent { id: u32 },
    #[error("sample id {id} already defined on line {original_line}")]
    RepeatedId { id: u32, original_line: usize },
    #[error("multiple somata found (soma roots on lines {lines:?})")]
    MultipleSomata { lines: Vec<usize> },
    #[error("soma sample {id} bifurcates into soma samples {children:?}")]
    SomaBifurcation { id: u32, children: Vec<u32> },
    #[error("soma sample {id} has a neurite parent")]
    SomaWithNeuriteParent { id: u32 },
    #[error("soma samples found but the soma policy is undefined")]
    UndefinedSoma,
    #[error("samples {ids:?} are not reachable from any root (cycle)")]
    Cycle { ids: Vec<u32> },
    #[error("vector length mismatch: {points} points but {diameters} diameters")]
    VectorLengthMismatch { points: usize, diameters: usize },
    #[error("a soma (CellBody) is already defined")]
    SomaAlreadyDefined,
    #[error("unable to parse point {0:?}")]
    ParsingPoint(String),
    #[error("expected {expected} but found {found:?}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(String),
}

// =#========================================================================#=
// RAW DATA ERROR
// =#========================================================================$=
/// Malformed or inconsistent input data, with file and line context.
///
/// Raised by readers and by the repair pass; a build that returns this error
/// produces no partial tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataError {
    kind: RawDataErrorKind,
    uri: Option<String>,
    line: Option<usize>,
}

impl RawDataError {
    /// Creates an error of the given kind without file context.
    pub fn new(kind: RawDataErrorKind) -> Self {
        Self {
            kind,
            uri: None,
            line: None,
        }
    }

    /// Creates an error of the given kind at a line of the input.
    pub fn at_line(kind: RawDataErrorKind, line: usize) -> Self {
        Self {
            kind,
            uri: None,
            line: Some(line),
        }
    }

    /// Creates an error of the given kind at the parser's current line.
    pub fn from_parser<S: ByteSource>(kind: RawDataErrorKind, parser: &ByteParser<S>) -> Self {
        Self::at_line(kind, parser.line())
    }

    /// Attaches the file (or other source identifier) the error belongs to.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Convenience constructor for [RawDataErrorKind::MissingParent]
    pub fn missing_parent(sample: &Sample) -> Self {
        Self::at_line(
            RawDataErrorKind::MissingParent {
                id: sample.id,
                parent_id: sample.parent_id,
            },
            sample.line_number,
        )
    }

    /// Convenience constructor for [RawDataErrorKind::SelfParent]
    pub fn self_parent(sample: &Sample) -> Self {
        Self::at_line(RawDataErrorKind::SelfParent { id: sample.id }, sample.line_number)
    }

    /// Convenience constructor for [RawDataErrorKind::RepeatedId],
    /// reported at the line of the second occurrence.
    pub fn repeated_id(original: &Sample, repeated: &Sample) -> Self {
        Self::at_line(
            RawDataErrorKind::RepeatedId {
                id: repeated.id,
                original_line: original.line_number,
            },
            repeated.line_number,
        )
    }

    /// Convenience constructor for [RawDataErrorKind::MultipleSomata]
    pub fn multiple_somata(roots: &[&Sample]) -> Self {
        let lines = roots.iter().map(|s| s.line_number).collect();
        Self::new(RawDataErrorKind::MultipleSomata { lines })
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &RawDataErrorKind {
        &self.kind
    }

    /// Returns the source identifier, if known.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Returns the 1-based line number, if known.
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for RawDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.uri, self.line) {
            (Some(uri), Some(line)) => write!(f, "{uri}:{line}: ")?,
            (Some(uri), None) => write!(f, "{uri}: ")?,
            (None, Some(line)) => write!(f, "line {line}: ")?,
            (None, None) => {}
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for RawDataError {}

// =#========================================================================#=
// MISUSE ERRORS
// =#========================================================================$=
/// Returned when asking a root section for its parent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("section {section} is a root section and has no parent")]
pub struct MissingParentError {
    /// The root section that was queried
    pub section: SectionId,
}

/// Returned when a section id does not exist in the property store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("section id {id} out of range (morphology has {count} sections)")]
pub struct SectionOutOfRange {
    /// The requested id
    pub id: SectionId,
    /// Number of sections in the store
    pub count: usize,
}

/// Returned when a path's extension does not name a supported format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown file type for {path:?}: {reason}")]
pub struct UnknownFileType {
    /// The offending path
    pub path: PathBuf,
    /// Why it was rejected
    pub reason: String,
}

/// Errors raised while exporting a morphology.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("cannot write a file without soma points")]
    NoSoma,
    #[error("section {0} has no points")]
    EmptySection(SectionId),
    #[error("section type {0:?} cannot be written in this format")]
    UnsupportedSectionType(SectionType),
    #[error("I/O error while writing: {0}")]
    Io(#[from] std::io::Error),
}

// =#========================================================================#=
// MORPH ERROR
// =#========================================================================$=
/// Any error of the file-level API.
#[derive(Error, Debug)]
pub enum MorphError {
    #[error(transparent)]
    RawData(#[from] RawDataError),
    #[error(transparent)]
    MissingParent(#[from] MissingParentError),
    #[error(transparent)]
    SectionOutOfRange(#[from] SectionOutOfRange),
    #[error(transparent)]
    UnknownFileType(#[from] UnknownFileType),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error("no {0} backend is available in this build")]
    UnsupportedBackend(&'static str),
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MorphError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MorphError::Io {
            path: path.into(),
            source,
        }
    }
}
