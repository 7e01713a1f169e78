//! Traversal of vascular graphs.

use crate::model::SectionId;
use crate::vasculature::VascularProperties;
use crate::vasculature::section::VascSection;
use std::collections::HashSet;
use std::iter::FusedIterator;

/// Depth-first walk along successors that yields every section at most once.
///
/// A section reachable from several predecessors is produced on first
/// arrival; later arrivals are skipped through the visited set, which also
/// stops the walk on cycles.
pub struct GraphIter<'a> {
    properties: &'a VascularProperties,
    stack: Vec<SectionId>,
    visited: HashSet<SectionId>,
}

impl<'a> GraphIter<'a> {
    /// Seeds are walked in the given order.
    pub(crate) fn new(properties: &'a VascularProperties, seeds: &[SectionId]) -> Self {
        GraphIter {
            properties,
            stack: seeds.iter().rev().copied().collect(),
            visited: HashSet::new(),
        }
    }

    /// Returns `true` once no section is left to yield.
    pub fn is_exhausted(&self) -> bool {
        self.stack.iter().all(|id| self.visited.contains(id))
    }
}

impl<'a> Iterator for GraphIter<'a> {
    type Item = VascSection<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            self.stack.extend(
                self.properties
                    .successors_of(id)
                    .iter()
                    .rev()
                    .filter(|successor| !self.visited.contains(*successor)),
            );
            return Some(VascSection::new(id, self.properties));
        }
        None
    }
}

impl FusedIterator for GraphIter<'_> {}

#[cfg(test)]
mod tests {
    use crate::vasculature::tests::diamond;
    use crate::vasculature::{Vasculature, VascularSectionType};

    fn ids<'a>(iter: impl Iterator<Item = crate::vasculature::VascSection<'a>>) -> Vec<u32> {
        iter.map(|s| s.id()).collect()
    }

    #[test]
    fn test_shared_successor_once() {
        let vasculature = diamond();
        assert_eq!(ids(vasculature.iter()), vec![0, 1, 3, 2]);
        assert_eq!(ids(vasculature.section(2).unwrap().iter()), vec![2, 3]);
    }

    #[test]
    fn test_cycle_visited() {
        // 0 -> 1 -> 2 -> 0 is a pure cycle, 3 is isolated
        let vasculature = Vasculature::from_parts(
            vec![[0.0; 3]; 4],
            vec![1.0; 4],
            vec![0, 1, 2, 3],
            vec![VascularSectionType::Venule; 4],
            vec![[0, 1], [1, 2], [2, 0]],
        )
        .unwrap();
        assert_eq!(ids(vasculature.iter()), vec![0, 1, 2, 3]);
        assert_eq!(ids(vasculature.section(1).unwrap().iter()), vec![1, 2, 0]);
    }

    #[test]
    fn test_exhausted() {
        let vasculature = diamond();
        let mut iter = vasculature.section(3).unwrap().iter();
        assert!(!iter.is_exhausted());
        assert_eq!(iter.next().map(|s| s.id()), Some(3));
        assert!(iter.is_exhausted());
        assert!(iter.next().is_none());
    }
}
