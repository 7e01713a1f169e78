//! Neuromorph is a library to read, repair, traverse and write neuronal
//! morphologies.
//!
//! A morphology is a tree of sections (unbranched runs of points with
//! diameters) hanging off a soma. This crate builds that tree from the flat
//! sample lists of reconstruction files and exposes it without copying.
//! Core functionality provided:
//! - Readers: SWC ([crate::swc]) and Neurolucida ASC ([crate::asc]) files
//!   produce raw [Sample](model::Sample)s.
//! - Repair pass: the [SampleTreeBuilder](model::SampleTreeBuilder) validates
//!   the samples (ids, parents, soma, cycles), segments them into sections,
//!   inserts the duplicate first point of every child section and reports
//!   non-fatal issues as [Warning](warning::Warning)s.
//! - Model: [Morphology] shares one flat property store between all
//!   [Section](model::Section) views, which are plain `(id, &store)` handles.
//! - Traversal: depth-first, breadth-first and upstream iterators.
//! - Writers: SWC, ASC and the H5 table layout ([crate::h5]).
//! - Vascular networks: [crate::vasculature] models sections with several
//!   predecessors.
//!
//! Limitations:
//! - No HDF5 container backend; [h5::Tables] only lays out the data
//! - No geometry (lengths, areas, transforms)
//!
//! # Usage patterns
//! 1. Quick functions with default settings: [load_file], [write_file],
//!    [parse_swc_str], or the quick API of [crate::swc] and [crate::asc].
//! 2. Configure the build with [BuildOptions](model::BuildOptions), for
//!    single-child merging and warning handling, and pass it to
//!    [format::load] or the `*_with` functions of the format modules.
//!
//! ## Example Default Configuration
//! ```
//! use neuromorph::parse_swc_str;
//!
//! let morphology = parse_swc_str(
//!     "# soma and one bifurcating dendrite\n\
//!      1 1 0 0 0 1 -1\n\
//!      2 3 0 0 1 0.5 1\n\
//!      3 3 0 0 2 0.5 2\n\
//!      4 3 1 0 2 0.5 3\n\
//!      5 3 -1 0 2 0.5 3\n",
//! )?;
//! assert_eq!(morphology.num_sections(), 3);
//! for section in morphology.depth_first() {
//!     println!("{section}");
//! }
//! # Ok::<(), neuromorph::error::RawDataError>(())
//! ```
//!
//! ## Example Build Configuration
//! ```no_run
//! use neuromorph::format;
//! use neuromorph::model::BuildOptions;
//! use neuromorph::warning::{WarningConfig, WarningKind};
//!
//! let options = BuildOptions::default()
//!     .with_single_child_merge()
//!     .with_warnings(WarningConfig::default().ignore(WarningKind::OnlyChild));
//! let morphology = format::load("neuron.asc", &options)?;
//! println!("{} warnings", morphology.warnings().len());
//! # Ok::<(), neuromorph::error::MorphError>(())
//! ```

pub mod asc;
pub mod batch;
pub mod error;
pub mod format;
pub mod h5;
pub mod model;
pub mod parser;
pub mod swc;
pub mod vasculature;
pub mod warning;

pub use crate::error::MorphError;
pub use crate::format::Format;
pub use crate::model::Morphology;
pub use crate::vasculature::Vasculature;

use crate::error::RawDataError;
use crate::model::BuildOptions;
use std::path::Path;

// ============================================================================
// Quick file API
// ============================================================================
/// Loads an SWC or ASC file with default settings.
///
/// See [`format::load`] for full documentation.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Morphology, MorphError> {
    format::load(path, &BuildOptions::default())
}

/// Writes a morphology as SWC or ASC, chosen by the extension of `path`.
///
/// See [`format::write`] for full documentation.
pub fn write_file<P: AsRef<Path>>(morphology: &Morphology, path: P) -> Result<(), MorphError> {
    format::write(morphology, path)
}

// ============================================================================
// Quick SWC API
// ============================================================================
/// Parses an SWC string using default settings.
///
/// See [`swc::parse_str`] for full documentation.
pub fn parse_swc_str<S: AsRef<str>>(swc: S) -> Result<Morphology, RawDataError> {
    swc::parse_str(swc)
}
