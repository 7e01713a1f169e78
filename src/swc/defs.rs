//! Constants of the SWC format.

/// Starts a comment running to the end of the line
pub(crate) const COMMENT_MARKER: u8 = b'#';

/// Columns per sample line: id, type, x, y, z, radius, parent
pub(crate) const NUM_COLUMNS: usize = 7;

/// Header line written on top of every exported file
pub(crate) const HEADER: &str = "# index type X Y Z radius parent";
