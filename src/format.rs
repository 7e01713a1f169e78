//! File format selection by extension.
//!
//! [Format] is resolved from a path before any file is touched; the
//! extension comparison is case-insensitive (`cell.SWC` is SWC).

use crate::asc;
use crate::error::{MorphError, UnknownFileType, WriterError};
use crate::model::{BuildOptions, Morphology};
use crate::swc;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Supported morphology file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Swc,
    Asc,
    H5,
}

impl Format {
    /// Determines the format from the extension of `path`.
    ///
    /// # Errors
    /// [UnknownFileType] if the path has no extension or an unsupported one.
    ///
    /// # Example
    /// ```
    /// use neuromorph::format::Format;
    ///
    /// assert_eq!(Format::from_path("cells/neuron.Asc").unwrap(), Format::Asc);
    /// assert!(Format::from_path("cells/neuron.txt").is_err());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, UnknownFileType> {
        let path = path.as_ref();
        let unknown = |reason: &str| UnknownFileType {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| unknown("missing file extension"))?;
        match extension.to_ascii_lowercase().as_str() {
            "swc" => Ok(Format::Swc),
            "asc" => Ok(Format::Asc),
            "h5" => Ok(Format::H5),
            other => Err(unknown(&format!("unsupported extension \"{other}\""))),
        }
    }

    /// Lowercase file extension of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Swc => "swc",
            Format::Asc => "asc",
            Format::H5 => "h5",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Swc => "SWC",
            Format::Asc => "ASC",
            Format::H5 => "H5",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// LOAD / WRITE (pub)
// ============================================================================
/// Loads a morphology file, choosing the reader by extension.
///
/// # Errors
/// * [MorphError::UnknownFileType] before the file is opened
/// * [MorphError::UnsupportedBackend] for `.h5` files
/// * [MorphError::Io] / [MorphError::RawData] from the reader
pub fn load<P: AsRef<Path>>(path: P, options: &BuildOptions) -> Result<Morphology, MorphError> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Swc => swc::parse_file_with(path, options.clone()),
        Format::Asc => asc::parse_file_with(path, options.clone()),
        Format::H5 => Err(MorphError::UnsupportedBackend("HDF5")),
    }
}

/// Writes a morphology to `path`, choosing the writer by extension.
///
/// An existing file is overwritten.
///
/// # Errors
/// * [MorphError::UnknownFileType] before the file is created
/// * [MorphError::UnsupportedBackend] for `.h5` files
/// * [MorphError::Io] if the file cannot be created
/// * [MorphError::Writer] from the writer
pub fn write<P: AsRef<Path>>(morphology: &Morphology, path: P) -> Result<(), MorphError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let writer: fn(File, &Morphology) -> Result<(), WriterError> = match format {
        Format::Swc => swc::write_swc_file,
        Format::Asc => asc::write_asc_file,
        Format::H5 => return Err(MorphError::UnsupportedBackend("HDF5")),
    };

    let file = File::create(path).map_err(|err| MorphError::io(path, err))?;
    writer(file, morphology)?;
    tracing::debug!(path = %path.display(), %format, "wrote morphology");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path("a.swc").unwrap(), Format::Swc);
        assert_eq!(Format::from_path("dir/a.SWC").unwrap(), Format::Swc);
        assert_eq!(Format::from_path("a.b.asc").unwrap(), Format::Asc);
        assert_eq!(Format::from_path("a.H5").unwrap(), Format::H5);
        assert_eq!(Format::from_path("a.H5").unwrap().extension(), "h5");
    }

    #[test]
    fn test_unknown_extensions() {
        let err = Format::from_path("neuron").unwrap_err();
        assert_eq!(err.reason, "missing file extension");
        let err = Format::from_path("neuron.txt").unwrap_err();
        assert_eq!(err.path, Path::new("neuron.txt"));
    }

    #[test]
    fn test_h5_backend_unsupported() {
        let err = load("missing.h5", &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, MorphError::UnsupportedBackend("HDF5")));
    }

    #[test]
    fn test_unknown_type_before_io() {
        let err = load("does/not/exist.obj", &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, MorphError::UnknownFileType(_)));
    }
}
