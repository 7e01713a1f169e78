//! Views of single vascular sections.

use crate::model::{Point, SectionId};
use crate::vasculature::iterator::GraphIter;
use crate::vasculature::{VascularProperties, VascularSectionType};
use std::fmt;

/// A section of a [Vasculature](crate::vasculature::Vasculature).
///
/// Same shape as a neuronal [Section](crate::model::Section) (an id plus a
/// store borrow) but with graph neighbours instead of a single parent.
#[derive(Clone, Copy)]
pub struct VascSection<'a> {
    id: SectionId,
    properties: &'a VascularProperties,
}

impl<'a> VascSection<'a> {
    pub(crate) fn new(id: SectionId, properties: &'a VascularProperties) -> Self {
        debug_assert!((id as usize) < properties.num_sections());
        Self { id, properties }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn section_type(&self) -> VascularSectionType {
        self.properties.section_types[self.id as usize]
    }

    pub fn points(&self) -> &'a [Point] {
        &self.properties.points[self.properties.range_unchecked(self.id)]
    }

    pub fn diameters(&self) -> &'a [f32] {
        &self.properties.diameters[self.properties.range_unchecked(self.id)]
    }

    pub fn predecessors(&self) -> Vec<VascSection<'a>> {
        self.views(self.properties.predecessors_of(self.id))
    }

    pub fn successors(&self) -> Vec<VascSection<'a>> {
        self.views(self.properties.successors_of(self.id))
    }

    /// Predecessors followed by successors.
    pub fn neighbors(&self) -> Vec<VascSection<'a>> {
        let mut neighbors = self.predecessors();
        neighbors.extend(self.successors());
        neighbors
    }

    /// Iterates over this section and everything reachable through its
    /// successors, each section once.
    pub fn iter(&self) -> GraphIter<'a> {
        GraphIter::new(self.properties, &[self.id])
    }

    fn views(&self, ids: &[SectionId]) -> Vec<VascSection<'a>> {
        ids.iter().map(|&id| VascSection::new(id, self.properties)).collect()
    }
}

impl PartialEq for VascSection<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.properties, other.properties)
    }
}

impl Eq for VascSection<'_> {}

impl fmt::Debug for VascSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VascSection")
            .field("id", &self.id)
            .field("type", &self.section_type())
            .field("num_points", &self.points().len())
            .finish()
    }
}

/// Formats as `VascSection(id=0, points=[(0 0 0),..., (1 0 0)])`.
impl fmt::Display for VascSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VascSection(id={}, points=[", self.id)?;
        let points = self.points();
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            write!(f, "({} {} {})", first[0], first[1], first[2])?;
            if points.len() > 1 {
                write!(f, ",..., ({} {} {})", last[0], last[1], last[2])?;
            }
        }
        f.write_str("])")
    }
}

#[cfg(test)]
mod tests {
    use crate::vasculature::tests::diamond;

    #[test]
    fn test_neighbors() {
        let vasculature = diamond();
        let join = vasculature.section(3).unwrap();
        let ids: Vec<u32> = join.predecessors().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(join.successors().is_empty());

        let branch = vasculature.section(1).unwrap();
        let ids: Vec<u32> = branch.neighbors().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn test_point_ranges() {
        let vasculature = diamond();
        let section = vasculature.section(2).unwrap();
        assert_eq!(section.points(), &[[4.0, 0.0, 0.0], [5.0, 0.0, 0.0]]);
        assert_eq!(section.diameters(), &[1.0, 1.0]);
        assert_eq!(section.to_string(), "VascSection(id=2, points=[(4 0 0),..., (5 0 0)])");
    }

    #[test]
    fn test_view_equality() {
        let vasculature = diamond();
        assert_eq!(vasculature.section(1).unwrap(), vasculature.section(1).unwrap());
        assert_ne!(vasculature.section(1).unwrap(), diamond().section(1).unwrap());
    }
}
