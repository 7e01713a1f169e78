//! Parallel loading of many morphology files.

use crate::error::MorphError;
use crate::format;
use crate::model::{BuildOptions, Morphology};
use rayon::prelude::*;
use std::path::Path;

/// Loads all files in parallel, choosing each reader by extension.
///
/// Every file is built with a copy of `options` named after its path.
/// Results are returned in the order of `paths`.
///
/// # Errors
/// The first error in input order; no morphologies are returned then.
///
/// # Example
/// ```no_run
/// use neuromorph::batch::load_all;
/// use neuromorph::model::BuildOptions;
///
/// let cells = load_all(&["a.swc", "b.asc"], &BuildOptions::default())?;
/// assert_eq!(cells.len(), 2);
/// # Ok::<(), neuromorph::error::MorphError>(())
/// ```
pub fn load_all<P>(paths: &[P], options: &BuildOptions) -> Result<Vec<Morphology>, MorphError>
where
    P: AsRef<Path> + Sync,
{
    tracing::debug!(files = paths.len(), "loading batch");
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let options = options.clone().with_uri(path.display().to_string());
            format::load(path, &options)
        })
        .collect()
}
