//! SWC format reader and writer.
//!
//! An SWC file lists one sample per line:
//! ```text
//! # id type x y z radius parent
//! 1 1 0 0 0 1 -1
//! 2 3 0 0 0 1 1
//! ```
//! * `#` starts a comment, empty lines are ignored
//! * `type` is a [SectionType](crate::model::SectionType) code (`1` soma,
//!   `2` axon, `3` basal dendrite, `4` apical dendrite, `5..=19` custom)
//! * `parent` is the id of the parent sample or `-1`
//!
//! # Quick API
//! * [`parse_str`] / [`parse_file`] - default [BuildOptions]
//! * [`parse_str_with`] / [`parse_file_with`] - explicit [BuildOptions]
//! * [`read_samples`] - raw samples without building a tree
//! * [`to_swc`] / [`write_swc_file`] - export

mod defs;
pub mod reader;
pub mod writer;

pub use reader::{SwcReader, soma_policy};
pub use writer::{to_swc, write_swc_file};

use crate::error::{MorphError, RawDataError};
use crate::model::{BuildOptions, Morphology, Sample, SampleTreeBuilder};
use crate::parser::{ByteParser, ByteSource};
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Reads the samples of an SWC string without building a tree.
pub fn read_samples<S: AsRef<str>>(swc: S) -> Result<Vec<Sample>, RawDataError> {
    SwcReader::new(ByteParser::from_str(swc.as_ref())).read_samples()
}

/// Parses an SWC string with default [BuildOptions].
///
/// # Example
/// ```
/// use neuromorph::swc;
///
/// let morphology = swc::parse_str(
///     "1 1 0 0 0 1 -1\n\
///      2 3 0 0 1 0.5 1\n\
///      3 3 0 0 2 0.5 2\n\
///      4 3 1 0 2 0.5 3\n\
///      5 3 -1 0 2 0.5 3\n",
/// )?;
/// assert_eq!(morphology.num_sections(), 3);
/// assert_eq!(morphology.children(0), &[1, 2]);
/// # Ok::<(), neuromorph::error::RawDataError>(())
/// ```
pub fn parse_str<S: AsRef<str>>(swc: S) -> Result<Morphology, RawDataError> {
    parse_str_with(swc, BuildOptions::default())
}

/// Parses an SWC string with the given options.
pub fn parse_str_with<S: AsRef<str>>(swc: S, options: BuildOptions) -> Result<Morphology, RawDataError> {
    build(ByteParser::from_str(swc.as_ref()), options)
}

/// Parses an SWC file with default [BuildOptions].
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///
/// # Errors
/// [MorphError::Io] if the file cannot be read, [MorphError::RawData] if its
/// content is invalid.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Morphology, MorphError> {
    parse_file_with(path, BuildOptions::default())
}

/// Parses an SWC file with the given options.
///
/// The path is used as source name for diagnostics unless `options` already
/// names one.
pub fn parse_file_with<P: AsRef<Path>>(path: P, options: BuildOptions) -> Result<Morphology, MorphError> {
    let path = path.as_ref();
    let options = match options.uri() {
        Some(_) => options,
        None => options.with_uri(path.display().to_string()),
    };
    tracing::debug!(path = %path.display(), "loading SWC file");

    let parser = ByteParser::from_file(path).map_err(|err| MorphError::io(path, err))?;
    Ok(build(parser, options)?)
}

fn build<S: ByteSource>(parser: ByteParser<S>, options: BuildOptions) -> Result<Morphology, RawDataError> {
    let samples = SwcReader::new(parser)
        .read_samples()
        .map_err(|err| match options.uri() {
            Some(uri) => err.with_uri(uri),
            None => err,
        })?;
    SampleTreeBuilder::new(options)
        .with_soma_policy(soma_policy(&samples))
        .build(&samples)
}
