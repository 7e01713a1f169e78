//! The owning handle of a built neuron.

use crate::error::{RawDataError, SectionOutOfRange};
use crate::model::iterators::{BreadthFirstIter, DepthFirstIter};
use crate::model::options::BuildOptions;
use crate::model::properties::Properties;
use crate::model::sample::Sample;
use crate::model::sample_builder::SampleTreeBuilder;
use crate::model::section::Section;
use crate::model::soma::Soma;
use crate::model::types::{Point, SectionId, SectionType, SomaType};
use crate::warning::Warning;
use std::collections::HashMap;
use std::sync::Arc;

// =#========================================================================#=
// MORPHOLOGY
// =#========================================================================$=
/// A neuron: soma, sections and the warnings raised while building it.
///
/// The property store is shared via [Arc]; cloning a morphology is cheap and
/// clones can be sent to other threads. There is no mutation path after the
/// build, so all [Section] views stay valid for as long as the morphology
/// they borrow from.
///
/// Morphologies are created by the builders
/// ([SampleTreeBuilder], [SectionTreeBuilder](crate::model::SectionTreeBuilder))
/// or by the format readers ([crate::swc], [crate::asc], [crate::h5]).
#[derive(Debug, Clone)]
pub struct Morphology {
    properties: Arc<Properties>,
    sample_to_section: HashMap<u32, SectionId>,
    warnings: Vec<Warning>,
    /// Warnings dropped because of the warning cap
    suppressed_warnings: usize,
    uri: Option<String>,
}

impl Morphology {
    pub(crate) fn new(
        properties: Properties,
        sample_to_section: HashMap<u32, SectionId>,
        warnings: Vec<Warning>,
        suppressed_warnings: usize,
        uri: Option<String>,
    ) -> Self {
        Self {
            properties: Arc::new(properties),
            sample_to_section,
            warnings,
            suppressed_warnings,
            uri,
        }
    }

    /// Builds a morphology from raw samples.
    ///
    /// Shorthand for [SampleTreeBuilder] with the given soma policy.
    pub fn from_samples(
        samples: &[Sample],
        soma_policy: SomaType,
        options: BuildOptions,
    ) -> Result<Self, RawDataError> {
        SampleTreeBuilder::new(options)
            .with_soma_policy(soma_policy)
            .build(samples)
    }

    pub fn soma(&self) -> &Soma {
        self.properties.soma()
    }

    /// The backing property store.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// All section points, in section order.
    pub fn points(&self) -> &[Point] {
        self.properties.points()
    }

    pub fn diameters(&self) -> &[f32] {
        self.properties.diameters()
    }

    pub fn section_types(&self) -> &[SectionType] {
        self.properties.section_types()
    }

    pub fn num_sections(&self) -> usize {
        self.properties.num_sections()
    }

    /// Number of section points (the soma not included).
    pub fn num_points(&self) -> usize {
        self.properties.num_points()
    }

    /// Ids of the root sections, in file order.
    pub fn root_section_ids(&self) -> &[SectionId] {
        self.properties.root_sections()
    }

    /// Root sections, in file order.
    pub fn root_sections(&self) -> Vec<Section<'_>> {
        self.root_section_ids()
            .iter()
            .map(|&id| Section::new(id, &self.properties))
            .collect()
    }

    /// Returns the section with the given id.
    ///
    /// # Errors
    /// [SectionOutOfRange] if there is no such section.
    pub fn section(&self, id: SectionId) -> Result<Section<'_>, SectionOutOfRange> {
        if !self.properties.contains_section(id) {
            return Err(SectionOutOfRange {
                id,
                count: self.num_sections(),
            });
        }
        Ok(Section::new(id, &self.properties))
    }

    /// All sections, in id order (which is depth-first order).
    pub fn sections(&self) -> impl ExactSizeIterator<Item = Section<'_>> + '_ {
        (0..self.num_sections() as SectionId).map(|id| Section::new(id, &self.properties))
    }

    /// Child ids of a section; empty for terminal or unknown sections.
    pub fn children(&self, id: SectionId) -> &[SectionId] {
        self.properties.children_of(id)
    }

    /// Parent id of a section; `None` for roots and unknown sections.
    pub fn parent(&self, id: SectionId) -> Option<SectionId> {
        self.properties.parent_of(id)
    }

    /// Depth-first pre-order over all sections, root by root.
    pub fn depth_first(&self) -> DepthFirstIter<'_> {
        DepthFirstIter::new(&self.properties, self.root_section_ids())
    }

    /// Breadth-first over all sections, with all roots as the first level.
    pub fn breadth_first(&self) -> BreadthFirstIter<'_> {
        BreadthFirstIter::new(&self.properties, self.root_section_ids())
    }

    /// Warnings accepted during the build, in emission order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of warnings raised past the cap of the
    /// [WarningConfig](crate::warning::WarningConfig); these were neither
    /// logged nor stored.
    pub fn suppressed_warnings(&self) -> usize {
        self.suppressed_warnings
    }

    /// Source the morphology was built from, if known.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Section that contains the given raw sample id.
    ///
    /// `None` for soma samples and unknown ids.
    pub fn section_of_sample(&self, sample_id: u32) -> Option<SectionId> {
        self.sample_to_section.get(&sample_id).copied()
    }
}

/// Two morphologies are equal if their soma and sections hold the same data;
/// source names and warnings are ignored.
impl PartialEq for Morphology {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&*self.properties, &*other.properties);
        a.soma() == b.soma()
            && a.points() == b.points()
            && a.diameters() == b.diameters()
            && a.section_types() == b.section_types()
            && a.sections() == b.sections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingParentError;

    /// Soma, then an axon root splitting into two branches.
    fn branching_axon() -> Morphology {
        let samples = vec![
            Sample::new(1, SectionType::Soma, [0.0, 0.0, 0.0], 2.0, -1),
            Sample::new(2, SectionType::Axon, [0.0, 0.0, 1.0], 1.0, 1),
            Sample::new(3, SectionType::Axon, [0.0, 0.0, 2.0], 1.0, 2),
            Sample::new(4, SectionType::Axon, [1.0, 0.0, 2.0], 1.0, 3),
            Sample::new(5, SectionType::Axon, [-1.0, 0.0, 2.0], 1.0, 3),
        ];
        Morphology::from_samples(&samples, SomaType::SinglePoint, BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_accessors() {
        let morphology = branching_axon();
        assert_eq!(morphology.num_sections(), 3);
        assert_eq!(morphology.root_section_ids(), &[0]);
        assert_eq!(morphology.children(0), &[1, 2]);
        assert_eq!(morphology.parent(2), Some(0));
        assert_eq!(morphology.parent(0), None);
        assert!(morphology.section(3).is_err());
        assert_eq!(morphology.sections().len(), 3);
        assert!(morphology.warnings().is_empty());
    }

    #[test]
    fn test_root_parent_is_error() {
        let morphology = branching_axon();
        let root = morphology.section(0).unwrap();
        assert!(root.is_root());
        assert_eq!(root.parent().unwrap_err(), MissingParentError { section: 0 });
    }

    #[test]
    fn test_views_compare_by_identity() {
        let a = branching_axon();
        let b = branching_axon();
        assert_eq!(a, b);
        assert_eq!(a.section(1).unwrap(), a.section(1).unwrap());
        assert_ne!(a.section(1).unwrap(), b.section(1).unwrap());
        // Clones share the store
        let c = a.clone();
        assert_eq!(a.section(1).unwrap().points().as_ptr(), c.section(1).unwrap().points().as_ptr());
    }

    #[test]
    fn test_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Morphology>();
    }
}
