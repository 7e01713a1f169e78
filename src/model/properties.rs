//! Flat, columnar property store of a morphology.
//!
//! All sample data of a morphology lives in a single [Properties] value:
//! points and diameters densely packed in section order, one
//! [SectionRecord] per section, and the child adjacency derived from the
//! parent links. Section views ([Section](crate::model::Section)) only hold
//! an id and a borrow of this store, so no point data is ever duplicated per
//! section.
//!
//! # Invariants
//! - `points.len() == diameters.len()`
//! - `section_types.len() == sections.len()`
//! - section `i` spans `[sections[i].offset, sections[i + 1].offset)`, the
//!   last section ends at `points.len()`
//! - offsets are non-decreasing with the section id
//! - `children` is the exact inverse of the parent links in `sections`

use crate::error::SectionOutOfRange;
use crate::model::soma::Soma;
use crate::model::types::{NO_PARENT, Point, SectionId, SectionType};
use std::ops::Range;

/// Start offset into the point arrays and parent id of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRecord {
    /// Index of the first point of the section
    pub offset: u32,
    /// Parent section id, [NO_PARENT] for root sections
    pub parent: i32,
}

// =#========================================================================#=
// PROPERTIES
// =#========================================================================$=
/// Backing store shared by all views of a morphology.
///
/// Read-only once built; it is shared via `Arc` by
/// [Morphology](crate::Morphology) and can be read from several threads.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    points: Vec<Point>,
    diameters: Vec<f32>,
    section_types: Vec<SectionType>,
    sections: Vec<SectionRecord>,
    children: Vec<Vec<SectionId>>,
    root_sections: Vec<SectionId>,
    soma: Soma,
}

impl Properties {
    /// Assembles a store and derives the child adjacency and root list.
    ///
    /// Callers (the section builder) guarantee the module invariants.
    pub(crate) fn new(
        soma: Soma,
        points: Vec<Point>,
        diameters: Vec<f32>,
        section_types: Vec<SectionType>,
        sections: Vec<SectionRecord>,
    ) -> Self {
        debug_assert_eq!(points.len(), diameters.len());
        debug_assert_eq!(section_types.len(), sections.len());
        debug_assert!(sections.windows(2).all(|w| w[0].offset <= w[1].offset));

        let mut children = vec![Vec::new(); sections.len()];
        let mut root_sections = Vec::new();
        for (id, record) in sections.iter().enumerate() {
            if record.parent == NO_PARENT {
                root_sections.push(id as SectionId);
            } else {
                children[record.parent as usize].push(id as SectionId);
            }
        }

        Self {
            points,
            diameters,
            section_types,
            sections,
            children,
            root_sections,
            soma,
        }
    }

    /// All points of all sections, in section order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All diameters, index-aligned with [points](Self::points).
    pub fn diameters(&self) -> &[f32] {
        &self.diameters
    }

    /// One type per section.
    pub fn section_types(&self) -> &[SectionType] {
        &self.section_types
    }

    /// One `(offset, parent)` record per section.
    pub fn sections(&self) -> &[SectionRecord] {
        &self.sections
    }

    pub fn soma(&self) -> &Soma {
        &self.soma
    }

    /// Ids of the sections without parent, in id order.
    pub fn root_sections(&self) -> &[SectionId] {
        &self.root_sections
    }

    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the children of a section.
    ///
    /// An unknown id is treated as a section without children.
    pub fn children_of(&self, id: SectionId) -> &[SectionId] {
        self.children
            .get(id as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the parent of a section, `None` for roots and unknown ids.
    pub fn parent_of(&self, id: SectionId) -> Option<SectionId> {
        self.sections
            .get(id as usize)
            .filter(|record| record.parent != NO_PARENT)
            .map(|record| record.parent as SectionId)
    }

    /// Returns the index range of a section's points.
    ///
    /// # Errors
    /// [SectionOutOfRange] if `id` is not a section of this store.
    pub fn range_of(&self, id: SectionId) -> Result<Range<usize>, SectionOutOfRange> {
        let index = id as usize;
        let record = self.sections.get(index).ok_or(SectionOutOfRange {
            id,
            count: self.sections.len(),
        })?;
        let end = self
            .sections
            .get(index + 1)
            .map_or(self.points.len(), |next| next.offset as usize);
        Ok(record.offset as usize..end)
    }

    /// Range of a section known to exist.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub(crate) fn range_unchecked(&self, id: SectionId) -> Range<usize> {
        match self.range_of(id) {
            Ok(range) => range,
            Err(err) => panic!("{err}"),
        }
    }

    pub(crate) fn contains_section(&self, id: SectionId) -> bool {
        (id as usize) < self.sections.len()
    }
}
