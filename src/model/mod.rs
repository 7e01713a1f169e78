//! Section-tree data model of neuronal morphologies.
//!
//! # Representation
//! All point data of a neuron lives in one flat [Properties] store: points
//! and diameters packed section after section, one [SectionRecord]
//! `(offset, parent)` per section, and the child adjacency derived from the
//! parent links. A [Section] is only an id plus a borrow of that store, so
//! views are `Copy` and never duplicate point data. The soma is kept outside
//! the section numbering ([Soma]).
//!
//! | Type | Role |
//! |------|------|
//! | [Morphology] | owns the store (`Arc`), entry point for queries |
//! | [Section] | borrowed view of one section |
//! | [Soma] | cell body points and [SomaType] |
//!
//! # Building morphologies
//! Readers produce [Sample]s, which the repair pass turns into sections:
//!
//! - [SampleTreeBuilder]: samples → validated, segmented sections
//! - [SectionTreeBuilder]: sections → renumbered, packed [Morphology]
//!
//! Both are configured with [BuildOptions]; non-fatal corrections are
//! reported as [Warning](crate::warning::Warning)s.
//!
//! # Traversal
//! [DepthFirstIter], [BreadthFirstIter] and [UpstreamIter] walk the tree
//! with an explicit stack or queue, siblings in file order.

pub mod iterators;
pub mod morphology;
pub mod options;
pub mod properties;
pub mod sample;
pub mod sample_builder;
pub mod section;
pub mod section_builder;
pub mod soma;
pub mod types;

// Store and views
pub use morphology::Morphology;
pub use properties::{Properties, SectionRecord};
pub use section::Section;
pub use soma::Soma;
pub use types::{NO_PARENT, Point, SectionId, SectionType, SomaType};
// Building
pub use options::BuildOptions;
pub use sample::Sample;
pub use sample_builder::SampleTreeBuilder;
pub use section_builder::{SectionTreeBuilder, StagedId};
// Traversal
pub use iterators::{BreadthFirstIter, DepthFirstIter, UpstreamIter};
