//! Traversal iterators over the sections of a morphology.
//!
//! All iterators are driven by the child adjacency of the property store and
//! keep their state in an explicit container (no recursion):
//! * [DepthFirstIter] - pre-order, stack based
//! * [BreadthFirstIter] - level order, queue based
//! * [UpstreamIter] - from a section up to its root
//!
//! Siblings are always produced in their declared (file) order. An iterator
//! is exhausted exactly when its container is empty; a fresh iterator is
//! created by every call to e.g. [Morphology::depth_first](crate::Morphology::depth_first),
//! so traversals can be restarted at will.

use crate::model::properties::Properties;
use crate::model::section::Section;
use crate::model::types::SectionId;
use std::collections::VecDeque;
use std::iter::FusedIterator;

// =#========================================================================#=
// DEPTH FIRST
// =#========================================================================$=
/// Iterator for depth-first pre-order traversal (parents before children).
///
/// Children are pushed in reverse so they pop in declared order. With
/// several seeds (a forest), each seed's subtree is finished before the next
/// seed starts.
pub struct DepthFirstIter<'a> {
    properties: &'a Properties,
    stack: Vec<SectionId>,
}

impl<'a> DepthFirstIter<'a> {
    pub(crate) fn new(properties: &'a Properties, seeds: &[SectionId]) -> Self {
        let stack = seeds.iter().rev().copied().collect();
        DepthFirstIter { properties, stack }
    }

    /// Returns `true` once all sections have been yielded.
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<'a> Iterator for DepthFirstIter<'a> {
    type Item = Section<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.properties.children_of(id).iter().rev().copied());
        Some(Section::new(id, self.properties))
    }
}

impl FusedIterator for DepthFirstIter<'_> {}

// =#========================================================================#=
// BREADTH FIRST
// =#========================================================================$=
/// Iterator for breadth-first traversal, level by level.
///
/// With several seeds, all seeds form the first level.
pub struct BreadthFirstIter<'a> {
    properties: &'a Properties,
    queue: VecDeque<SectionId>,
}

impl<'a> BreadthFirstIter<'a> {
    pub(crate) fn new(properties: &'a Properties, seeds: &[SectionId]) -> Self {
        let queue = seeds.iter().copied().collect();
        BreadthFirstIter { properties, queue }
    }

    /// Returns `true` once all sections have been yielded.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<'a> Iterator for BreadthFirstIter<'a> {
    type Item = Section<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        self.queue
            .extend(self.properties.children_of(id).iter().copied());
        Some(Section::new(id, self.properties))
    }
}

impl FusedIterator for BreadthFirstIter<'_> {}

// =#========================================================================#=
// UPSTREAM
// =#========================================================================$=
/// Iterator from a section to its root, following parent links.
pub struct UpstreamIter<'a> {
    properties: &'a Properties,
    current: Option<SectionId>,
}

impl<'a> UpstreamIter<'a> {
    pub(crate) fn new(properties: &'a Properties, start: SectionId) -> Self {
        UpstreamIter {
            properties,
            current: Some(start),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }
}

impl<'a> Iterator for UpstreamIter<'a> {
    type Item = Section<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.properties.parent_of(id);
        Some(Section::new(id, self.properties))
    }
}

impl FusedIterator for UpstreamIter<'_> {}
