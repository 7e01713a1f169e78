//! Vascular networks: sections connected as a directed graph.
//!
//! Unlike neuronal morphologies, a vascular section can have several
//! predecessors, and the network may contain cycles. Connectivity is given as
//! an explicit edge list `[from, to]`; successor and predecessor lists are
//! derived from it once at construction.
//!
//! Point data is stored the same way as for neurons: densely packed, with one
//! start offset per section.
//!
//! # Example
//! ```
//! use neuromorph::vasculature::{Vasculature, VascularSectionType};
//!
//! let vasculature = Vasculature::from_parts(
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
//!     vec![1.0, 1.0, 0.5, 0.5],
//!     vec![0, 2],
//!     vec![VascularSectionType::Artery, VascularSectionType::Arteriole],
//!     vec![[0, 1]],
//! )?;
//! assert_eq!(vasculature.section(1)?.predecessors()[0].id(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod iterator;
pub mod section;

pub use iterator::GraphIter;
pub use section::VascSection;

use crate::error::{RawDataError, RawDataErrorKind, SectionOutOfRange};
use crate::model::{Point, SectionId};
use std::ops::Range;
use std::sync::Arc;

// =#========================================================================#=
// VASCULAR SECTION TYPE
// =#========================================================================$=
/// Type of a vascular section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VascularSectionType {
    Undefined,
    Vein,
    Artery,
    Venule,
    Arteriole,
    VenousCapillary,
    ArterialCapillary,
    Transitional,
}

impl VascularSectionType {
    /// Maps a type code (`0..=7`) onto a vascular section type.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Undefined),
            1 => Some(Self::Vein),
            2 => Some(Self::Artery),
            3 => Some(Self::Venule),
            4 => Some(Self::Arteriole),
            5 => Some(Self::VenousCapillary),
            6 => Some(Self::ArterialCapillary),
            7 => Some(Self::Transitional),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Vein => 1,
            Self::Artery => 2,
            Self::Venule => 3,
            Self::Arteriole => 4,
            Self::VenousCapillary => 5,
            Self::ArterialCapillary => 6,
            Self::Transitional => 7,
        }
    }
}

// =#========================================================================#=
// VASCULAR PROPERTIES
// =#========================================================================$=
/// Backing store of a [Vasculature].
#[derive(Debug, Default)]
pub struct VascularProperties {
    points: Vec<Point>,
    diameters: Vec<f32>,
    offsets: Vec<u32>,
    section_types: Vec<VascularSectionType>,
    connectivity: Vec<[SectionId; 2]>,
    successors: Vec<Vec<SectionId>>,
    predecessors: Vec<Vec<SectionId>>,
}

impl VascularProperties {
    pub fn num_sections(&self) -> usize {
        self.offsets.len()
    }

    /// Successors of a section in edge-list order; empty for unknown ids.
    pub fn successors_of(&self, id: SectionId) -> &[SectionId] {
        self.successors.get(id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Predecessors of a section in edge-list order; empty for unknown ids.
    pub fn predecessors_of(&self, id: SectionId) -> &[SectionId] {
        self.predecessors.get(id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the index range of a section's points.
    ///
    /// # Errors
    /// [SectionOutOfRange] if `id` is not a section of this store.
    pub fn range_of(&self, id: SectionId) -> Result<Range<usize>, SectionOutOfRange> {
        let index = id as usize;
        let start = *self.offsets.get(index).ok_or(SectionOutOfRange {
            id,
            count: self.offsets.len(),
        })?;
        let end = self
            .offsets
            .get(index + 1)
            .map_or(self.points.len(), |&next| next as usize);
        Ok(start as usize..end)
    }

    pub(crate) fn range_unchecked(&self, id: SectionId) -> Range<usize> {
        match self.range_of(id) {
            Ok(range) => range,
            Err(err) => panic!("{err}"),
        }
    }
}

// =#========================================================================#=
// VASCULATURE
// =#========================================================================$=
/// An immutable vascular network.
///
/// Cloning is cheap (the store is shared). Equality is identity: two values
/// are equal iff they share the same store.
#[derive(Debug, Clone)]
pub struct Vasculature {
    properties: Arc<VascularProperties>,
}

impl Vasculature {
    /// Builds a vasculature from its raw arrays.
    ///
    /// # Arguments
    /// * `points`, `diameters` - all points, in section order
    /// * `offsets` - index of the first point of each section
    /// * `section_types` - one type per section
    /// * `connectivity` - directed edges `[from, to]` between section ids
    ///
    /// # Errors
    /// * [VectorLengthMismatch](RawDataErrorKind::VectorLengthMismatch) if
    ///   points and diameters differ in length
    /// * [InvalidConnectivity](RawDataErrorKind::InvalidConnectivity) if
    ///   offsets and types differ in length, the first offset is not 0,
    ///   offsets decrease or exceed the point count, or an edge names an
    ///   unknown section or loops on itself
    pub fn from_parts(
        points: Vec<Point>,
        diameters: Vec<f32>,
        offsets: Vec<u32>,
        section_types: Vec<VascularSectionType>,
        connectivity: Vec<[SectionId; 2]>,
    ) -> Result<Self, RawDataError> {
        let invalid = |message: String| RawDataError::new(RawDataErrorKind::InvalidConnectivity(message));

        if points.len() != diameters.len() {
            return Err(RawDataError::new(RawDataErrorKind::VectorLengthMismatch {
                points: points.len(),
                diameters: diameters.len(),
            }));
        }
        if offsets.len() != section_types.len() {
            return Err(invalid(format!(
                "{} section offsets but {} section types",
                offsets.len(),
                section_types.len()
            )));
        }
        match offsets.first() {
            Some(&0) => {}
            Some(&first) => return Err(invalid(format!("first section offset is {first}, not 0"))),
            None if !points.is_empty() => {
                return Err(invalid(format!("{} points but no sections", points.len())));
            }
            None => {}
        }
        if let Some(w) = offsets.windows(2).find(|w| w[0] > w[1]) {
            return Err(invalid(format!("section offsets decrease ({} > {})", w[0], w[1])));
        }
        if let Some(&last) = offsets.last().filter(|&&last| last as usize > points.len()) {
            return Err(invalid(format!("section offset {last} exceeds {} points", points.len())));
        }

        let count = offsets.len();
        let mut successors = vec![Vec::new(); count];
        let mut predecessors = vec![Vec::new(); count];
        for &[from, to] in &connectivity {
            if from as usize >= count || to as usize >= count {
                return Err(invalid(format!("edge [{from}, {to}] names a section outside 0..{count}")));
            }
            if from == to {
                return Err(invalid(format!("section {from} is connected to itself")));
            }
            successors[from as usize].push(to);
            predecessors[to as usize].push(from);
        }

        tracing::debug!(sections = count, edges = connectivity.len(), "built vasculature");
        Ok(Self {
            properties: Arc::new(VascularProperties {
                points,
                diameters,
                offsets,
                section_types,
                connectivity,
                successors,
                predecessors,
            }),
        })
    }

    pub fn properties(&self) -> &VascularProperties {
        &self.properties
    }

    pub fn points(&self) -> &[Point] {
        &self.properties.points
    }

    pub fn diameters(&self) -> &[f32] {
        &self.properties.diameters
    }

    pub fn section_types(&self) -> &[VascularSectionType] {
        &self.properties.section_types
    }

    /// The edge list the vasculature was built from.
    pub fn connectivity(&self) -> &[[SectionId; 2]] {
        &self.properties.connectivity
    }

    pub fn num_sections(&self) -> usize {
        self.properties.num_sections()
    }

    /// Returns a view of a section.
    ///
    /// # Errors
    /// [SectionOutOfRange] if `id` is not a section of this vasculature.
    pub fn section(&self, id: SectionId) -> Result<VascSection<'_>, SectionOutOfRange> {
        if (id as usize) < self.num_sections() {
            Ok(VascSection::new(id, &self.properties))
        } else {
            Err(SectionOutOfRange {
                id,
                count: self.num_sections(),
            })
        }
    }

    /// All sections in id order.
    pub fn sections(&self) -> impl ExactSizeIterator<Item = VascSection<'_>> + '_ {
        (0..self.num_sections() as SectionId).map(|id| VascSection::new(id, &self.properties))
    }

    /// Iterates over every section exactly once, following successors
    /// depth-first and starting new walks from the lowest unvisited id.
    pub fn iter(&self) -> GraphIter<'_> {
        let seeds: Vec<SectionId> = (0..self.num_sections() as SectionId).collect();
        GraphIter::new(&self.properties, &seeds)
    }
}

impl PartialEq for Vasculature {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }
}

impl Eq for Vasculature {}

impl<'a> IntoIterator for &'a Vasculature {
    type Item = VascSection<'a>;
    type IntoIter = GraphIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
