//! Section-level staging builder that produces a [Morphology].
//!
//! [SectionTreeBuilder] is the second half of the repair pass. Readers that
//! already know section boundaries (the H5 table importer) use it directly;
//! the sample pass ([crate::model::sample_builder]) segments raw samples into
//! sections and then hands them over here.
//!
//! # Lifecycle
//! ```text
//! new(options) ──→ set_soma / append_root_section / append_child_section ──→ finish() ──→ Morphology
//! ```
//!
//! # Repairs performed by `finish`
//! 1. Each child section starts with its parent's last point: a duplicate is
//!    prepended unless the child already starts at that exact position
//!    (different diameter: [WrongDuplicate](WarningKind::WrongDuplicate)).
//!    Children of empty sections get no duplicate
//!    ([AppendingEmptySection](WarningKind::AppendingEmptySection)).
//! 2. Sections with exactly one child are reported
//!    ([OnlyChild](WarningKind::OnlyChild)) and, if enabled in
//!    [BuildOptions], merged into their parent.
//! 3. Sections are renumbered in depth-first pre-order (roots and children
//!    in insertion order) and packed into flat arrays, so section offsets
//!    are non-decreasing with the section id.

use crate::error::{RawDataError, RawDataErrorKind};
use crate::model::morphology::Morphology;
use crate::model::options::BuildOptions;
use crate::model::properties::{Properties, SectionRecord};
use crate::model::soma::Soma;
use crate::model::types::{NO_PARENT, Point, SectionId, SectionType, SomaType, same_position};
use crate::warning::{Diagnostics, Warning, WarningKind};
use std::collections::HashMap;

/// Index of a section inside a [SectionTreeBuilder], before renumbering.
pub type StagedId = usize;

/// Section under construction.
#[derive(Debug, Clone)]
struct StagedSection {
    section_type: SectionType,
    points: Vec<Point>,
    diameters: Vec<f32>,
    parent: Option<StagedId>,
    children: Vec<StagedId>,
    /// First input line of the section, for diagnostics
    line: Option<usize>,
    /// Set once the section got merged into its parent
    merged_into: Option<StagedId>,
}

// =#========================================================================#=
// SECTION TREE BUILDER
// =#========================================================================$=
/// Mutable staging area for a morphology.
///
/// # Example
/// ```
/// use neuromorph::model::{BuildOptions, SectionTreeBuilder, SectionType, SomaType};
///
/// let mut builder = SectionTreeBuilder::new(BuildOptions::default());
/// builder.set_soma(SomaType::SinglePoint, vec![[0.0, 0.0, 0.0]], vec![2.0])?;
/// let root = builder.append_root_section(
///     SectionType::Axon,
///     vec![[0.0, 1.0, 0.0], [0.0, 2.0, 0.0]],
///     vec![1.0, 1.0],
/// )?;
/// builder.append_child_section(root, SectionType::Axon, vec![[1.0, 3.0, 0.0]], vec![1.0])?;
/// builder.append_child_section(root, SectionType::Axon, vec![[-1.0, 3.0, 0.0]], vec![1.0])?;
///
/// let morphology = builder.finish();
/// assert_eq!(morphology.num_sections(), 3);
/// // Children start with a copy of the branch point
/// assert_eq!(morphology.section(1)?.points(), &[[0.0, 2.0, 0.0], [1.0, 3.0, 0.0]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SectionTreeBuilder {
    soma: Soma,
    sections: Vec<StagedSection>,
    roots: Vec<StagedId>,
    options: BuildOptions,
    diagnostics: Diagnostics,
    /// Raw sample id -> staged section containing it
    sample_sections: Vec<(u32, StagedId)>,
}

impl SectionTreeBuilder {
    /// Creates an empty builder.
    pub fn new(options: BuildOptions) -> Self {
        let mut diagnostics = Diagnostics::new(options.warnings().clone());
        if let Some(uri) = options.uri() {
            diagnostics.set_uri(uri);
        }
        Self {
            soma: Soma::default(),
            sections: Vec::new(),
            roots: Vec::new(),
            options,
            diagnostics,
            sample_sections: Vec::new(),
        }
    }

    /// Sets the soma points as they are (no averaging).
    ///
    /// # Errors
    /// [VectorLengthMismatch](RawDataErrorKind::VectorLengthMismatch) if the
    /// number of points and diameters differ.
    pub fn set_soma(
        &mut self,
        soma_type: SomaType,
        points: Vec<Point>,
        diameters: Vec<f32>,
    ) -> Result<(), RawDataError> {
        check_lengths(&points, &diameters)?;
        self.soma = Soma::new(soma_type, points, diameters);
        Ok(())
    }

    /// Appends a section without parent.
    ///
    /// # Errors
    /// [VectorLengthMismatch](RawDataErrorKind::VectorLengthMismatch) if the
    /// number of points and diameters differ.
    pub fn append_root_section(
        &mut self,
        section_type: SectionType,
        points: Vec<Point>,
        diameters: Vec<f32>,
    ) -> Result<StagedId, RawDataError> {
        check_lengths(&points, &diameters)?;
        let id = self.push(section_type, points, diameters, None);
        self.roots.push(id);
        Ok(id)
    }

    /// Appends a section as last child of `parent`.
    ///
    /// # Errors
    /// * [VectorLengthMismatch](RawDataErrorKind::VectorLengthMismatch) if
    ///   the number of points and diameters differ
    /// * [InvalidConnectivity](RawDataErrorKind::InvalidConnectivity) if
    ///   `parent` has not been appended yet
    pub fn append_child_section(
        &mut self,
        parent: StagedId,
        section_type: SectionType,
        points: Vec<Point>,
        diameters: Vec<f32>,
    ) -> Result<StagedId, RawDataError> {
        check_lengths(&points, &diameters)?;
        if parent >= self.sections.len() {
            return Err(RawDataError::new(RawDataErrorKind::InvalidConnectivity(
                format!("parent section {parent} does not exist"),
            )));
        }
        let id = self.push(section_type, points, diameters, Some(parent));
        self.sections[parent].children.push(id);
        Ok(id)
    }

    /// Number of sections appended so far.
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Records the input line a staged section starts on.
    pub(crate) fn set_line(&mut self, id: StagedId, line: usize) {
        if line > 0 {
            self.sections[id].line = Some(line);
        }
    }

    /// Records which staged section a raw sample ended up in.
    pub(crate) fn map_sample(&mut self, sample_id: u32, id: StagedId) {
        self.sample_sections.push((sample_id, id));
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Runs the repairs and packs the sections into a [Morphology].
    pub fn finish(mut self) -> Morphology {
        self.connect_to_parents();
        self.handle_only_children();
        self.pack()
    }

    fn push(
        &mut self,
        section_type: SectionType,
        points: Vec<Point>,
        diameters: Vec<f32>,
        parent: Option<StagedId>,
    ) -> StagedId {
        self.sections.push(StagedSection {
            section_type,
            points,
            diameters,
            parent,
            children: Vec::new(),
            line: None,
            merged_into: None,
        });
        self.sections.len() - 1
    }

    fn warn(&mut self, kind: WarningKind, id: StagedId, message: String) {
        let mut warning = Warning::new(kind, message);
        if let Some(line) = self.sections[id].line {
            warning = warning.at_line(line);
        }
        self.diagnostics.warn(warning);
    }

    /// Makes every child section start at its parent's last point.
    fn connect_to_parents(&mut self) {
        let originally_empty: Vec<bool> = self.sections.iter().map(|s| s.points.is_empty()).collect();

        for id in 0..self.sections.len() {
            let Some(parent) = self.sections[id].parent else {
                continue;
            };
            if originally_empty[parent] {
                self.warn(
                    WarningKind::AppendingEmptySection,
                    id,
                    format!("section is appended to section {parent} which has no points"),
                );
                continue;
            }

            let (Some(&last_point), Some(&last_diameter)) = (
                self.sections[parent].points.last(),
                self.sections[parent].diameters.last(),
            ) else {
                continue;
            };

            let starts_at_parent = match (
                self.sections[id].points.first(),
                self.sections[id].diameters.first(),
            ) {
                (Some(first), Some(&first_diameter)) if same_position(first, &last_point) => {
                    Some(first_diameter)
                }
                _ => None,
            };

            match starts_at_parent {
                Some(first_diameter) if first_diameter != last_diameter => {
                    let message = format!(
                        "first point of section duplicates the last point of its parent with another diameter ({first_diameter} vs {last_diameter})"
                    );
                    self.warn(WarningKind::WrongDuplicate, id, message);
                }
                Some(_) => {}
                None => {
                    let child = &mut self.sections[id];
                    child.points.insert(0, last_point);
                    child.diameters.insert(0, last_diameter);
                }
            }
        }
    }

    /// Reports, and if configured merges, sections with a single child.
    fn handle_only_children(&mut self) {
        let merge = self.options.merge_single_children();

        // Parents always have lower staged ids than their children
        for id in 0..self.sections.len() {
            if self.sections[id].merged_into.is_some() {
                continue;
            }
            while self.sections[id].children.len() == 1 {
                let child = self.sections[id].children[0];
                self.warn(
                    WarningKind::OnlyChild,
                    child,
                    "section is the only child of its parent section".to_string(),
                );
                if !merge {
                    break;
                }
                self.merge_child(id, child);
            }
        }
    }

    fn merge_child(&mut self, parent: StagedId, child: StagedId) {
        let mut points = std::mem::take(&mut self.sections[child].points);
        let mut diameters = std::mem::take(&mut self.sections[child].diameters);
        let grandchildren = std::mem::take(&mut self.sections[child].children);

        // Drop the child's copy of the branch point
        let skip = match (self.sections[parent].points.last(), points.first()) {
            (Some(last), Some(first)) if same_position(last, first) => 1,
            _ => 0,
        };
        self.sections[parent].points.extend(points.drain(skip..));
        self.sections[parent].diameters.extend(diameters.drain(skip..));

        for &grandchild in &grandchildren {
            self.sections[grandchild].parent = Some(parent);
        }
        self.sections[parent].children = grandchildren;
        self.sections[child].parent = None;
        self.sections[child].merged_into = Some(parent);

        tracing::trace!(parent, child, "merged single child section");
    }

    /// Renumbers in depth-first pre-order and packs the flat arrays.
    fn pack(self) -> Morphology {
        let num_staged = self.sections.len();
        let mut final_ids: Vec<Option<SectionId>> = vec![None; num_staged];
        let mut order = Vec::with_capacity(num_staged);

        let mut stack: Vec<StagedId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            final_ids[id] = Some(order.len() as SectionId);
            order.push(id);
            stack.extend(self.sections[id].children.iter().rev().copied());
        }

        let num_points = order.iter().map(|&id| self.sections[id].points.len()).sum();
        let mut points = Vec::with_capacity(num_points);
        let mut diameters = Vec::with_capacity(num_points);
        let mut section_types = Vec::with_capacity(order.len());
        let mut records = Vec::with_capacity(order.len());

        for &id in &order {
            let staged = &self.sections[id];
            let parent = staged
                .parent
                .and_then(|p| final_ids[p])
                .map_or(NO_PARENT, |p| p as i32);
            records.push(SectionRecord {
                offset: points.len() as u32,
                parent,
            });
            section_types.push(staged.section_type);
            points.extend_from_slice(&staged.points);
            diameters.extend_from_slice(&staged.diameters);
        }

        let resolve = |mut id: StagedId| {
            while let Some(target) = self.sections[id].merged_into {
                id = target;
            }
            final_ids[id]
        };
        let sample_to_section: HashMap<u32, SectionId> = self
            .sample_sections
            .iter()
            .filter_map(|&(sample, staged)| resolve(staged).map(|section| (sample, section)))
            .collect();

        tracing::debug!(
            uri = self.options.uri().unwrap_or("<memory>"),
            sections = records.len(),
            points = points.len(),
            warnings = self.diagnostics.warnings().len(),
            "built morphology"
        );

        let uri = self.options.uri().map(str::to_owned);
        let suppressed = self.diagnostics.suppressed();
        let warnings = self.diagnostics.into_warnings();
        let properties = Properties::new(self.soma, points, diameters, section_types, records);
        Morphology::new(properties, sample_to_section, warnings, suppressed, uri)
    }
}

fn check_lengths(points: &[Point], diameters: &[f32]) -> Result<(), RawDataError> {
    if points.len() != diameters.len() {
        return Err(RawDataError::new(RawDataErrorKind::VectorLengthMismatch {
            points: points.len(),
            diameters: diameters.len(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::WarningConfig;

    fn line(n: usize) -> (Vec<Point>, Vec<f32>) {
        ((0..n).map(|i| [i as f32, 0.0, 0.0]).collect(), vec![1.0; n])
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default());
        let err = builder
            .append_root_section(SectionType::Axon, vec![[0.0; 3]], vec![])
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &RawDataErrorKind::VectorLengthMismatch {
                points: 1,
                diameters: 0
            }
        );
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default());
        let (p, d) = line(2);
        assert!(builder.append_child_section(3, SectionType::Axon, p, d).is_err());
    }

    #[test]
    fn test_renumbering_is_depth_first() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default());
        let (p, d) = line(2);
        let a = builder.append_root_section(SectionType::Axon, p.clone(), d.clone()).unwrap();
        let b = builder.append_root_section(SectionType::BasalDendrite, p.clone(), d.clone()).unwrap();
        builder.append_child_section(b, SectionType::BasalDendrite, p.clone(), d.clone()).unwrap();
        builder.append_child_section(b, SectionType::BasalDendrite, p.clone(), d.clone()).unwrap();
        builder.append_child_section(a, SectionType::Axon, p.clone(), d.clone()).unwrap();
        builder.append_child_section(a, SectionType::Axon, p, d).unwrap();

        let morphology = builder.finish();
        let types: Vec<_> = morphology.section_types().to_vec();
        assert_eq!(
            types,
            vec![
                SectionType::Axon,
                SectionType::Axon,
                SectionType::Axon,
                SectionType::BasalDendrite,
                SectionType::BasalDendrite,
                SectionType::BasalDendrite,
            ]
        );
        assert_eq!(morphology.root_section_ids(), &[0, 3]);
        let offsets: Vec<u32> = morphology.properties().sections().iter().map(|r| r.offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_only_child_kept_by_default() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default());
        let (p, d) = line(2);
        let root = builder.append_root_section(SectionType::Axon, p, d).unwrap();
        builder
            .append_child_section(root, SectionType::Axon, vec![[5.0, 0.0, 0.0]], vec![1.0])
            .unwrap();

        let morphology = builder.finish();
        assert_eq!(morphology.num_sections(), 2);
        assert_eq!(morphology.warnings().len(), 1);
        assert_eq!(morphology.warnings()[0].kind(), WarningKind::OnlyChild);
    }

    #[test]
    fn test_only_child_chain_merged() {
        let options = BuildOptions::default().with_single_child_merge();
        let mut builder = SectionTreeBuilder::new(options);
        let root = builder
            .append_root_section(SectionType::Axon, vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![1.0; 2])
            .unwrap();
        let only = builder
            .append_child_section(root, SectionType::Axon, vec![[2.0, 0.0, 0.0]], vec![1.0])
            .unwrap();
        let deeper = builder
            .append_child_section(only, SectionType::Axon, vec![[3.0, 0.0, 0.0]], vec![1.0])
            .unwrap();
        builder
            .append_child_section(deeper, SectionType::Axon, vec![[4.0, 1.0, 0.0]], vec![1.0])
            .unwrap();
        builder
            .append_child_section(deeper, SectionType::Axon, vec![[4.0, -1.0, 0.0]], vec![1.0])
            .unwrap();

        let morphology = builder.finish();
        assert_eq!(morphology.num_sections(), 3);
        let root = morphology.section(0).unwrap();
        assert_eq!(root.points(), &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        assert_eq!(root.child_ids(), &[1, 2]);
        assert_eq!(morphology.section(2).unwrap().points(), &[[3.0, 0.0, 0.0], [4.0, -1.0, 0.0]]);
    }

    #[test]
    fn test_wrong_duplicate_and_empty_parent() {
        let mut builder = SectionTreeBuilder::new(BuildOptions::default().with_warnings(WarningConfig::default().ignore(WarningKind::OnlyChild)));
        let root = builder
            .append_root_section(SectionType::Axon, vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![2.0, 2.0])
            .unwrap();
        // Same position as the parent's last point, other diameter
        builder
            .append_child_section(root, SectionType::Axon, vec![[1.0, 0.0, 0.0], [2.0, 1.0, 0.0]], vec![1.0, 1.0])
            .unwrap();
        let empty = builder.append_child_section(root, SectionType::Axon, vec![], vec![]).unwrap();
        builder
            .append_child_section(empty, SectionType::Axon, vec![[9.0, 9.0, 9.0]], vec![1.0])
            .unwrap();

        let morphology = builder.finish();
        let kinds: Vec<_> = morphology.warnings().iter().map(|w| w.kind()).collect();
        assert_eq!(kinds, vec![WarningKind::WrongDuplicate, WarningKind::AppendingEmptySection]);

        // No duplicate inserted in either case beyond the empty section's own copy
        assert_eq!(morphology.section(1).unwrap().num_points(), 2);
        assert_eq!(morphology.section(2).unwrap().points(), &[[1.0, 0.0, 0.0]]);
        assert_eq!(morphology.section(3).unwrap().points(), &[[9.0, 9.0, 9.0]]);
    }
}
