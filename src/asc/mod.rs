//! Neurolucida ASC format reader and writer.
//!
//! ASC files are nested parenthesized lists:
//! ```text
//! ("CellBody"
//!   (Color Red)
//!   (CellBody)
//!   (0 0 0 2)
//! )
//!
//! ( (Color Red)
//!   (Dendrite)
//!   (0 0 0 2)
//!   (0 5 0 2)
//!   (
//!     (-5 5 0 3)
//!   |
//!     (6 5 0 3)
//!   )
//! )
//! ```
//! * a point is `(x y z diameter)`
//! * `(Axon)`, `(Dendrite)` and `(Apical)` mark the type of a neurite block
//! * a group of child branches is a list of branches separated by `|`
//! * `;` starts a comment; blocks of other kinds (markers, spines, image
//!   data) are skipped
//!
//! The soma is read as a contour and averaged into one point
//! ([SomaType::Contour]).
//!
//! # Quick API
//! * [`parse_str`] / [`parse_file`] - default [BuildOptions]
//! * [`parse_str_with`] / [`parse_file_with`] - explicit [BuildOptions]
//! * [`read_samples`] - raw samples without building a tree
//! * [`to_asc`] / [`write_asc_file`] - export

mod defs;
pub mod reader;
pub mod writer;

pub use reader::AscReader;
pub use writer::{to_asc, write_asc_file};

use crate::error::{MorphError, RawDataError};
use crate::model::{BuildOptions, Morphology, Sample, SampleTreeBuilder, SomaType};
use crate::parser::{ByteParser, ByteSource};
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Reads the samples of an ASC string without building a tree.
pub fn read_samples<S: AsRef<str>>(asc: S) -> Result<Vec<Sample>, RawDataError> {
    AscReader::new(ByteParser::from_str(asc.as_ref())).read_samples()
}

/// Parses an ASC string with default [BuildOptions].
pub fn parse_str<S: AsRef<str>>(asc: S) -> Result<Morphology, RawDataError> {
    parse_str_with(asc, BuildOptions::default())
}

/// Parses an ASC string with the given options.
pub fn parse_str_with<S: AsRef<str>>(asc: S, options: BuildOptions) -> Result<Morphology, RawDataError> {
    build(ByteParser::from_str(asc.as_ref()), options)
}

/// Parses an ASC file with default [BuildOptions].
///
/// # Errors
/// [MorphError::Io] if the file cannot be read, [MorphError::RawData] if its
/// content is invalid.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Morphology, MorphError> {
    parse_file_with(path, BuildOptions::default())
}

/// Parses an ASC file with the given options; the path names the source
/// unless `options` already does.
pub fn parse_file_with<P: AsRef<Path>>(path: P, options: BuildOptions) -> Result<Morphology, MorphError> {
    let path = path.as_ref();
    let options = match options.uri() {
        Some(_) => options,
        None => options.with_uri(path.display().to_string()),
    };
    tracing::debug!(path = %path.display(), "loading ASC file");

    let parser = ByteParser::from_file(path).map_err(|err| MorphError::io(path, err))?;
    Ok(build(parser, options)?)
}

fn build<S: ByteSource>(parser: ByteParser<S>, options: BuildOptions) -> Result<Morphology, RawDataError> {
    let samples = AscReader::new(parser)
        .read_samples()
        .map_err(|err| match options.uri() {
            Some(uri) => err.with_uri(uri),
            None => err,
        })?;
    SampleTreeBuilder::new(options)
        .with_soma_policy(SomaType::Contour)
        .build(&samples)
}
