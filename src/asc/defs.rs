//! Constants of the Neurolucida ASC format.

use crate::model::SectionType;

/// Starts a comment running to the end of the line
pub(crate) const COMMENT_MARKER: u8 = b';';

/// Bytes that end an unquoted token
pub(crate) const TOKEN_DELIMITERS: &[u8] = b"()|\";,<>";

/// Bytes skipped between tokens besides whitespace
pub(crate) const SEPARATORS: &[u8] = b",<>";

/// Name of the soma block, either as leading string or as marker list
pub(crate) const CELL_BODY: &str = "CellBody";

/// Minimum number of values of a point list: x, y, z, diameter
pub(crate) const POINT_VALUES: usize = 4;

/// Maps a neurite marker (`(Axon)`, `(Dendrite)`, `(Apical)`) onto its type.
pub(crate) fn neurite_type(marker: &str) -> Option<SectionType> {
    if marker.eq_ignore_ascii_case("Axon") {
        Some(SectionType::Axon)
    } else if marker.eq_ignore_ascii_case("Dendrite") {
        Some(SectionType::BasalDendrite)
    } else if marker.eq_ignore_ascii_case("Apical") {
        Some(SectionType::ApicalDendrite)
    } else {
        None
    }
}

/// Opening lines of a neurite block written for a section type.
pub(crate) fn neurite_header(section_type: SectionType) -> Option<&'static str> {
    match section_type {
        SectionType::Axon => Some("( (Color Cyan)\n  (Axon)\n"),
        SectionType::BasalDendrite => Some("( (Color Red)\n  (Dendrite)\n"),
        SectionType::ApicalDendrite => Some("( (Color Red)\n  (Apical)\n"),
        _ => None,
    }
}

/// Opening lines of the soma block.
pub(crate) const SOMA_HEADER: &str = "(\"CellBody\"\n  (Color Red)\n  (CellBody)\n";
