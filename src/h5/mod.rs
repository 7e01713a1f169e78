//! H5 (version 1) table layout of a morphology.
//!
//! An H5 morphology file holds two datasets and one attribute:
//!
//! | Name | Shape | Content |
//! |------|-------|---------|
//! | `points` | N × 4 | `[x, y, z, diameter]`, soma points first |
//! | `structure` | M × 3 | `[first point, parent row, type code]` per section |
//! | `comment` | attribute | free text |
//!
//! Row 0 of `structure` is the soma (type 1, parent −1); neurite roots have
//! parent row 0, all other sections the row of their parent section.
//! Sections are written in depth-first order, so every parent row precedes
//! its children.
//!
//! [Tables] builds and reads this layout in memory. Reading and writing the
//! actual HDF5 container is left to an HDF5 binding.

use crate::error::{RawDataError, RawDataErrorKind, WriterError};
use crate::model::{BuildOptions, Morphology, Point, SectionTreeBuilder, SectionType, SomaType, StagedId};

/// Comment attribute written with every export.
pub const DEFAULT_COMMENT: &str = concat!(" created by neuromorph v", env!("CARGO_PKG_VERSION"));

/// Parent row marking the soma row.
const SOMA_PARENT: i32 = -1;

// =#========================================================================#=
// TABLES
// =#========================================================================$=
/// In-memory content of an H5 morphology file.
#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    /// `[x, y, z, diameter]` per point
    pub points: Vec<[f64; 4]>,
    /// `[first point, parent row, type code]` per section, soma row first
    pub structure: Vec<[i32; 3]>,
    /// The `comment` attribute
    pub comment: String,
}

impl Tables {
    /// Lays out a morphology as H5 tables.
    ///
    /// # Errors
    /// [WriterError::NoSoma] if the morphology has no soma points.
    ///
    /// # Example
    /// ```
    /// use neuromorph::{h5::Tables, swc};
    ///
    /// let morphology = swc::parse_str("1 1 0 0 0 1 -1\n2 2 0 1 0 0.5 1\n3 2 0 2 0 0.5 2\n")?;
    /// let tables = Tables::from_morphology(&morphology)?;
    /// assert_eq!(tables.structure, vec![[0, -1, 1], [1, 0, 2]]);
    /// assert_eq!(tables.points.len(), 3);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_morphology(morphology: &Morphology) -> Result<Self, WriterError> {
        let soma = morphology.soma();
        if soma.is_empty() {
            return Err(WriterError::NoSoma);
        }

        let mut points: Vec<[f64; 4]> = Vec::with_capacity(soma.points().len() + morphology.num_points());
        let mut structure = Vec::with_capacity(morphology.num_sections() + 1);
        push_points(&mut points, soma.points(), soma.diameters());
        structure.push([0, SOMA_PARENT, SectionType::Soma.code()]);

        // Row of every section on disk; the soma holds row 0
        let mut rows = vec![0i32; morphology.num_sections()];
        for section in morphology.depth_first() {
            let parent_row = morphology.parent(section.id()).map_or(0, |parent| rows[parent as usize]);
            rows[section.id() as usize] = structure.len() as i32;
            structure.push([points.len() as i32, parent_row, section.section_type().code()]);
            push_points(&mut points, section.points(), section.diameters());
        }

        Ok(Self {
            points,
            structure,
            comment: DEFAULT_COMMENT.to_string(),
        })
    }

    /// Rebuilds a morphology from H5 tables.
    ///
    /// The soma is read as a single point if it has one point, as a contour
    /// otherwise. Sections already contain their leading duplicate point.
    ///
    /// # Errors
    /// * [InvalidConnectivity](RawDataErrorKind::InvalidConnectivity) if the
    ///   first row is not the soma, offsets decrease or leave the point table,
    ///   or a parent row does not precede its child
    /// * [UnsupportedSectionType](RawDataErrorKind::UnsupportedSectionType)
    ///   for unknown type codes
    pub fn into_morphology(self, options: BuildOptions) -> Result<Morphology, RawDataError> {
        let invalid = |message: String| RawDataError::new(RawDataErrorKind::InvalidConnectivity(message));

        match self.structure.first() {
            Some(&[0, SOMA_PARENT, code]) if code == SectionType::Soma.code() => {}
            Some(row) => return Err(invalid(format!("first structure row {row:?} is not a soma row"))),
            None => return Err(invalid("empty structure table".to_string())),
        }

        let offset_of = |row: usize| -> Result<usize, RawDataError> {
            let offset = match self.structure.get(row) {
                Some(&[offset, _, _]) => offset,
                None => return Ok(self.points.len()),
            };
            usize::try_from(offset)
                .ok()
                .filter(|&offset| offset <= self.points.len())
                .ok_or_else(|| invalid(format!("offset {offset} of row {row} is out of range")))
        };
        let point_range = |row: usize| -> Result<std::ops::Range<usize>, RawDataError> {
            let (start, end) = (offset_of(row)?, offset_of(row + 1)?);
            if start > end {
                return Err(invalid(format!("offsets of rows {row} and {} decrease", row + 1)));
            }
            Ok(start..end)
        };
        let split = |range: std::ops::Range<usize>| {
            let rows = &self.points[range];
            let points: Vec<Point> = rows.iter().map(|p| [p[0] as f32, p[1] as f32, p[2] as f32]).collect();
            let diameters: Vec<f32> = rows.iter().map(|p| p[3] as f32).collect();
            (points, diameters)
        };

        let uri = options.uri().map(str::to_owned);
        let mut builder = SectionTreeBuilder::new(options);

        let (soma_points, soma_diameters) = split(point_range(0)?);
        let soma_type = match soma_points.len() {
            1 => SomaType::SinglePoint,
            _ => SomaType::Contour,
        };
        builder.set_soma(soma_type, soma_points, soma_diameters)?;

        // Staged section of every structure row, none for the soma row
        let mut staged: Vec<Option<StagedId>> = vec![None; self.structure.len()];
        for (row, &[_, parent, code]) in self.structure.iter().enumerate().skip(1) {
            let section_type = SectionType::from_code(code)
                .filter(|t| *t != SectionType::Soma)
                .ok_or_else(|| RawDataError::new(RawDataErrorKind::UnsupportedSectionType(code)))?;
            let (points, diameters) = split(point_range(row)?);

            let id = match parent {
                0 => builder.append_root_section(section_type, points, diameters)?,
                p if p > 0 && (p as usize) < row => {
                    let parent_id = staged[p as usize]
                        .ok_or_else(|| invalid(format!("row {row} has parent row {p}")))?;
                    builder.append_child_section(parent_id, section_type, points, diameters)?
                }
                p => return Err(invalid(format!("row {row} has parent row {p} which does not precede it"))),
            };
            staged[row] = Some(id);
        }

        let morphology = builder.finish();
        tracing::debug!(uri = uri.as_deref().unwrap_or("<memory>"), sections = morphology.num_sections(), "imported H5 tables");
        Ok(morphology)
    }
}

fn push_points(table: &mut Vec<[f64; 4]>, points: &[Point], diameters: &[f32]) {
    table.extend(
        points
            .iter()
            .zip(diameters)
            .map(|(p, &d)| [f64::from(p[0]), f64::from(p[1]), f64::from(p[2]), f64::from(d)]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Tables {
        Tables {
            points: vec![
                [0.0, 0.0, 0.0, 2.0],
                [0.0, 0.0, 1.0, 1.0],
                [0.0, 0.0, 2.0, 1.0],
                [0.0, 0.0, 2.0, 1.0],
                [1.0, 0.0, 2.0, 1.0],
                [0.0, 0.0, 2.0, 1.0],
                [-1.0, 0.0, 2.0, 1.0],
            ],
            structure: vec![[0, -1, 1], [1, 0, 2], [3, 1, 2], [5, 1, 2]],
            comment: DEFAULT_COMMENT.to_string(),
        }
    }

    #[test]
    fn test_import() {
        let morphology = tables().into_morphology(BuildOptions::default()).unwrap();
        assert_eq!(morphology.soma().soma_type(), SomaType::SinglePoint);
        assert_eq!(morphology.num_sections(), 3);
        assert_eq!(morphology.children(0), &[1, 2]);
        // Leading duplicates are already present and not inserted again
        assert_eq!(morphology.section(2).unwrap().points(), &[[0.0, 0.0, 2.0], [-1.0, 0.0, 2.0]]);
        assert!(morphology.warnings().is_empty());
    }

    #[test]
    fn test_export_matches_import() {
        let original = tables();
        let morphology = original.clone().into_morphology(BuildOptions::default()).unwrap();
        assert_eq!(Tables::from_morphology(&morphology).unwrap(), original);
    }

    #[test]
    fn test_invalid_structure() {
        let mut forward_parent = tables();
        forward_parent.structure[1][1] = 3;
        assert!(matches!(
            forward_parent.into_morphology(BuildOptions::default()).unwrap_err().kind(),
            RawDataErrorKind::InvalidConnectivity(_)
        ));

        let mut decreasing = tables();
        decreasing.structure[2][0] = 6;
        assert!(decreasing.into_morphology(BuildOptions::default()).is_err());

        let mut no_soma = tables();
        no_soma.structure.remove(0);
        assert!(no_soma.into_morphology(BuildOptions::default()).is_err());

        let mut bad_type = tables();
        bad_type.structure[3][2] = 42;
        assert_eq!(
            bad_type.into_morphology(BuildOptions::default()).unwrap_err().kind(),
            &RawDataErrorKind::UnsupportedSectionType(42)
        );
    }

    #[test]
    fn test_export_requires_soma() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default());
        builder
            .append_root_section(SectionType::Axon, vec![[0.0; 3]], vec![1.0])
            .unwrap();
        assert!(matches!(Tables::from_morphology(&builder.finish()), Err(WriterError::NoSoma)));
    }
}
