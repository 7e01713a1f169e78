//! SWC export.

use crate::error::WriterError;
use crate::model::types::same_position;
use crate::model::{Morphology, Section, SectionType};
use crate::swc::defs::HEADER;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Row id of the first soma sample, which all root sections attach to.
const SOMA_ROW: u32 = 1;

/// Returns the SWC representation of a morphology.
///
/// Layout:
/// * a header comment
/// * one row per soma point, the first without parent, the others chained
/// * one row per section point in depth-first order; non-root sections
///   attach to the parent's last row, root sections attach to the soma
///
/// A non-root section skips its first point only when that point is a copy
/// of the parent's last point which reading the file inserts again: same
/// position and diameter, followed by a point elsewhere. A first point that
/// merely shares the parent's position (another diameter, or a single point
/// section) is written as a row of its own.
///
/// Radii are written as half the stored diameters.
///
/// # Errors
/// * [WriterError::NoSoma] if the morphology has no soma points
/// * [WriterError::EmptySection] for sections without points
///
/// # Example
/// ```
/// use neuromorph::swc;
///
/// let morphology = swc::parse_str("1 1 0 0 0 1 -1\n2 2 0 1 0 0.5 1\n3 2 0 2 0 0.5 2\n")?;
/// let swc = swc::to_swc(&morphology)?;
/// assert_eq!(swc.lines().nth(1), Some("1 1 0 0 0 1 -1"));
/// assert_eq!(swc.lines().count(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn to_swc(morphology: &Morphology) -> Result<String, WriterError> {
    let mut buffer = Vec::new();
    write_swc(&mut buffer, morphology)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes a morphology to a file in SWC format.
///
/// # Errors
/// See [to_swc]; additionally I/O errors as [WriterError::Io].
pub fn write_swc_file(file: File, morphology: &Morphology) -> Result<(), WriterError> {
    let mut writer = BufWriter::new(file);
    write_swc(&mut writer, morphology)?;
    writer.flush()?;
    Ok(())
}

fn write_swc<W: Write>(out: &mut W, morphology: &Morphology) -> Result<(), WriterError> {
    let soma = morphology.soma();
    if soma.is_empty() {
        return Err(WriterError::NoSoma);
    }

    writeln!(out, "{HEADER}")?;
    let mut row: u32 = 0;
    for (point, diameter) in soma.points().iter().zip(soma.diameters()) {
        row += 1;
        let parent = if row == SOMA_ROW { -1 } else { i64::from(row) - 1 };
        write_row(out, row, SectionType::Soma, point, diameter / 2.0, parent)?;
    }

    // Last written row of every section
    let mut last_rows = vec![0u32; morphology.num_sections()];
    for section in morphology.depth_first() {
        let points = section.points();
        let diameters = section.diameters();
        if points.is_empty() {
            return Err(WriterError::EmptySection(section.id()));
        }

        let (skip, mut parent) = match section.parent() {
            Ok(parent) => (
                usize::from(starts_with_copy_of(&parent, points, diameters)),
                last_rows[parent.id() as usize],
            ),
            Err(_) => (0, SOMA_ROW),
        };
        for (point, diameter) in points.iter().zip(diameters).skip(skip) {
            row += 1;
            write_row(out, row, section.section_type(), point, diameter / 2.0, i64::from(parent))?;
            parent = row;
        }
        last_rows[section.id() as usize] = parent;
    }

    tracing::debug!(rows = row, "wrote SWC");
    Ok(())
}

/// Whether a section's first point is a plain copy of `parent`'s last point.
fn starts_with_copy_of(parent: &Section<'_>, points: &[[f32; 3]], diameters: &[f32]) -> bool {
    let (Some(last), Some(last_diameter)) = (parent.points().last(), parent.diameters().last()) else {
        return false;
    };
    match (points, diameters) {
        ([first, second, ..], [first_diameter, ..]) => {
            same_position(first, last) && first_diameter == last_diameter && !same_position(second, last)
        }
        _ => false,
    }
}

fn write_row<W: Write>(
    out: &mut W,
    row: u32,
    section_type: SectionType,
    point: &[f32; 3],
    radius: f32,
    parent: i64,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{row} {} {} {} {} {radius} {parent}",
        section_type.code(),
        point[0],
        point[1],
        point[2]
    )
}
