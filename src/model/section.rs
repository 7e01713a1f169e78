//! Lightweight read-only views of single sections.

use crate::error::MissingParentError;
use crate::model::iterators::{BreadthFirstIter, DepthFirstIter, UpstreamIter};
use crate::model::properties::Properties;
use crate::model::types::{Point, SectionId, SectionType};
use std::fmt;

// =#========================================================================#=
// SECTION
// =#========================================================================$=
/// A section of a morphology: an id plus a borrow of the property store.
///
/// Sections are cheap to create and `Copy`. Their point data is a borrowed
/// sub-slice of the store, computed on demand from the section offsets.
/// Two sections are equal iff they have the same id *and* belong to the same
/// store; point values are not compared.
///
/// The borrow ties a section to its [Morphology](crate::Morphology), so a
/// view can never outlive the data it points into.
#[derive(Clone, Copy)]
pub struct Section<'a> {
    id: SectionId,
    properties: &'a Properties,
}

impl<'a> Section<'a> {
    /// Creates a view; `id` must be a section of `properties`.
    pub(crate) fn new(id: SectionId, properties: &'a Properties) -> Self {
        debug_assert!(properties.contains_section(id));
        Self { id, properties }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn section_type(&self) -> SectionType {
        self.properties.section_types()[self.id as usize]
    }

    /// Points of this section, borrowed from the store.
    pub fn points(&self) -> &'a [Point] {
        &self.properties.points()[self.properties.range_unchecked(self.id)]
    }

    /// Diameters of this section, index-aligned with [points](Self::points).
    pub fn diameters(&self) -> &'a [f32] {
        &self.properties.diameters()[self.properties.range_unchecked(self.id)]
    }

    pub fn num_points(&self) -> usize {
        self.properties.range_unchecked(self.id).len()
    }

    /// Returns `true` if the section has no parent.
    pub fn is_root(&self) -> bool {
        self.properties.parent_of(self.id).is_none()
    }

    /// Returns the parent section.
    ///
    /// # Errors
    /// [MissingParentError] if this is a root section.
    pub fn parent(&self) -> Result<Section<'a>, MissingParentError> {
        self.properties
            .parent_of(self.id)
            .map(|parent| Section::new(parent, self.properties))
            .ok_or(MissingParentError { section: self.id })
    }

    /// Ids of the child sections, in branch order.
    pub fn child_ids(&self) -> &'a [SectionId] {
        self.properties.children_of(self.id)
    }

    /// Child sections, in branch order; empty for terminal sections.
    pub fn children(&self) -> Vec<Section<'a>> {
        self.child_ids()
            .iter()
            .map(|&child| Section::new(child, self.properties))
            .collect()
    }

    /// Depth-first pre-order iterator over the subtree rooted here.
    pub fn depth_first(&self) -> DepthFirstIter<'a> {
        DepthFirstIter::new(self.properties, &[self.id])
    }

    /// Breadth-first iterator over the subtree rooted here.
    pub fn breadth_first(&self) -> BreadthFirstIter<'a> {
        BreadthFirstIter::new(self.properties, &[self.id])
    }

    /// Iterator from this section up to its root section (both included).
    pub fn upstream(&self) -> UpstreamIter<'a> {
        UpstreamIter::new(self.properties, self.id)
    }
}

impl PartialEq for Section<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.properties, other.properties)
    }
}

impl Eq for Section<'_> {}

impl fmt::Debug for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("type", &self.section_type())
            .field("num_points", &self.num_points())
            .finish()
    }
}

/// Formats as `Section(id=0, points=[(0 0 0),..., (0 5 0)])`.
impl fmt::Display for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn point(f: &mut fmt::Formatter<'_>, p: &Point) -> fmt::Result {
            write!(f, "({} {} {})", p[0], p[1], p[2])
        }

        write!(f, "Section(id={}, points=[", self.id)?;
        match self.points() {
            [] => {}
            [only] => point(f, only)?,
            [first, .., last] => {
                point(f, first)?;
                f.write_str(",..., ")?;
                point(f, last)?;
            }
        }
        f.write_str("])")
    }
}
