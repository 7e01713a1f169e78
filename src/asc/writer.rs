//! ASC export.

use crate::asc::defs::{SOMA_HEADER, neurite_header};
use crate::error::WriterError;
use crate::model::{Morphology, Point, Section};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Indentation step of nested branches
const INDENT: usize = 2;

/// Returns the ASC representation of a morphology.
///
/// The soma block comes first (omitted for morphologies without soma
/// points), followed by one block per root section. Points are written as
/// `(x y z diameter)`; the children of a section are enclosed in a
/// parenthesized group, separated by `|`.
///
/// # Errors
/// [WriterError::UnsupportedSectionType] for root sections that are not
/// axons, basal or apical dendrites.
///
/// # Example
/// ```
/// use neuromorph::{asc, swc};
///
/// let morphology = swc::parse_str("1 1 0 0 0 1 -1\n2 2 0 1 0 0.5 1\n")?;
/// let asc = asc::to_asc(&morphology)?;
/// assert!(asc.starts_with("(\"CellBody\"\n  (Color Red)\n  (CellBody)\n  (0 0 0 2)\n)\n"));
/// assert!(asc.contains("( (Color Cyan)\n  (Axon)\n  (0 1 0 1)\n)\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn to_asc(morphology: &Morphology) -> Result<String, WriterError> {
    let mut buffer = Vec::new();
    write_asc(&mut buffer, morphology)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes a morphology to a file in ASC format.
pub fn write_asc_file(file: File, morphology: &Morphology) -> Result<(), WriterError> {
    let mut writer = BufWriter::new(file);
    write_asc(&mut writer, morphology)?;
    writer.flush()?;
    Ok(())
}

fn write_asc<W: Write>(out: &mut W, morphology: &Morphology) -> Result<(), WriterError> {
    let soma = morphology.soma();
    if !soma.is_empty() {
        out.write_all(SOMA_HEADER.as_bytes())?;
        write_points(out, soma.points(), soma.diameters(), INDENT)?;
        out.write_all(b")\n\n")?;
    }

    for root in morphology.root_sections() {
        let header = neurite_header(root.section_type())
            .ok_or(WriterError::UnsupportedSectionType(root.section_type()))?;
        out.write_all(header.as_bytes())?;
        write_section(out, root, INDENT)?;
        out.write_all(b")\n\n")?;
    }

    tracing::debug!(roots = morphology.root_section_ids().len(), "wrote ASC");
    Ok(())
}

fn write_points<W: Write>(out: &mut W, points: &[Point], diameters: &[f32], indent: usize) -> std::io::Result<()> {
    for (p, d) in points.iter().zip(diameters) {
        writeln!(out, "{:indent$}({} {} {} {})", "", p[0], p[1], p[2], d)?;
    }
    Ok(())
}

// Recursive helper, one nesting level per branch point
fn write_section<W: Write>(out: &mut W, section: Section<'_>, indent: usize) -> std::io::Result<()> {
    write_points(out, section.points(), section.diameters(), indent)?;

    let children = section.children();
    if children.is_empty() {
        return Ok(());
    }
    for (i, child) in children.into_iter().enumerate() {
        writeln!(out, "{:indent$}{}", "", if i == 0 { "(" } else { "|" })?;
        write_section(out, child, indent + INDENT)?;
    }
    writeln!(out, "{:indent$})", "")
}
