//! Sample-level repair pass: raw samples in, [Morphology] out.
//!
//! The pass runs in the following order and stops at the first fatal problem,
//! so a failed build never yields a partial tree:
//! 1. id resolution (self parent, repeated id, missing parent)
//! 2. cycle detection (samples not reachable from a parentless sample)
//! 3. soma validation and the soma policy
//! 4. neurite roots (disconnected neurites, wrong root points)
//! 5. segmentation into sections, handed to a [SectionTreeBuilder]

use crate::error::{RawDataError, RawDataErrorKind};
use crate::model::morphology::Morphology;
use crate::model::options::BuildOptions;
use crate::model::sample::Sample;
use crate::model::section_builder::{SectionTreeBuilder, StagedId};
use crate::model::types::{Point, SomaType, distance, same_position};
use crate::warning::{Warning, WarningKind};
use std::collections::HashMap;

/// Relative tolerance of the three-point soma layout check.
const NEUROMORPHO_TOLERANCE: f32 = 1e-4;

// =#========================================================================#=
// SAMPLE TREE BUILDER
// =#========================================================================$=
/// Builds a [Morphology] from raw samples.
///
/// The soma policy is chosen by the reader (see [SomaType]); it defaults to
/// [SomaType::Undefined], which rejects inputs containing soma samples.
///
/// # Example
/// ```
/// use neuromorph::model::{BuildOptions, Sample, SampleTreeBuilder, SectionType, SomaType};
///
/// let samples = vec![
///     Sample::new(1, SectionType::Soma, [0.0, 0.0, 0.0], 2.0, -1),
///     Sample::new(2, SectionType::Axon, [0.0, 0.0, 1.0], 1.0, 1),
///     Sample::new(3, SectionType::Axon, [0.0, 0.0, 2.0], 1.0, 2),
/// ];
/// let morphology = SampleTreeBuilder::new(BuildOptions::default())
///     .with_soma_policy(SomaType::SinglePoint)
///     .build(&samples)?;
///
/// assert_eq!(morphology.soma().points(), &[[0.0, 0.0, 0.0]]);
/// assert_eq!(morphology.root_section_ids(), &[0]);
/// assert_eq!(morphology.section(0)?.num_points(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SampleTreeBuilder {
    options: BuildOptions,
    soma_policy: SomaType,
}

impl SampleTreeBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            soma_policy: SomaType::Undefined,
        }
    }

    /// Sets how soma samples are turned into the soma.
    pub fn with_soma_policy(mut self, soma_policy: SomaType) -> Self {
        self.soma_policy = soma_policy;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn soma_policy(&self) -> SomaType {
        self.soma_policy
    }

    /// Validates, repairs and segments `samples` (in file order).
    ///
    /// # Errors
    /// A [RawDataError] for the first fatal problem found; it carries the
    /// source name of the [BuildOptions] if one was set.
    pub fn build(&self, samples: &[Sample]) -> Result<Morphology, RawDataError> {
        self.build_inner(samples).map_err(|err| match self.options.uri() {
            Some(uri) if err.uri().is_none() => err.with_uri(uri),
            _ => err,
        })
    }

    fn build_inner(&self, samples: &[Sample]) -> Result<Morphology, RawDataError> {
        let tree = SampleTree::resolve(samples)?;
        tree.check_reachable()?;
        let soma_chain = tree.soma_chain()?;

        let mut builder = SectionTreeBuilder::new(self.options.clone());
        let is_neuromorpho = self.apply_soma_policy(&tree, &soma_chain, &mut builder)?;

        let roots = tree.neurite_roots();
        for &root in &roots {
            tree.check_root(root, &soma_chain, is_neuromorpho, &mut builder);
        }
        tree.segment(&roots, &mut builder)?;

        Ok(builder.finish())
    }

    /// Sets the soma of `builder` and returns whether it is a three-point
    /// NeuroMorpho soma.
    fn apply_soma_policy(
        &self,
        tree: &SampleTree<'_>,
        chain: &[usize],
        builder: &mut SectionTreeBuilder,
    ) -> Result<bool, RawDataError> {
        if chain.is_empty() {
            builder
                .diagnostics_mut()
                .warn(Warning::new(WarningKind::NoSomaFound, "no soma sample found"));
            return Ok(false);
        }

        let points: Vec<Point> = chain.iter().map(|&i| tree.samples[i].point).collect();
        let diameters: Vec<f32> = chain.iter().map(|&i| tree.samples[i].diameter).collect();
        let first_line = tree.samples[chain[0]].line_number;

        match self.soma_policy {
            SomaType::Undefined => Err(RawDataError::at_line(
                RawDataErrorKind::UndefinedSoma,
                first_line,
            )),
            SomaType::SinglePoint => {
                builder.set_soma(SomaType::SinglePoint, points, diameters)?;
                Ok(false)
            }
            SomaType::Cylinders => {
                let is_neuromorpho = points.len() == 3;
                if is_neuromorpho && !is_neuromorpho_layout(&points, &diameters) {
                    let warning = Warning::new(
                        WarningKind::NeuromorphoSomaNonConform,
                        "three-point soma does not follow the NeuroMorpho layout \
                         (center, then center -/+ radius along y, equal diameters)",
                    )
                    .at_line(first_line);
                    builder.diagnostics_mut().warn(warning);
                }
                builder.set_soma(SomaType::Cylinders, points, diameters)?;
                Ok(is_neuromorpho)
            }
            SomaType::Contour => {
                let (center, diameter) = contour_average(&points, &diameters);
                builder.set_soma(SomaType::Contour, vec![center], vec![diameter])?;
                Ok(false)
            }
        }
    }
}

/// Checks `[c, c - (0, r, 0), c + (0, r, 0)]` with equal diameters `2r`.
fn is_neuromorpho_layout(points: &[Point], diameters: &[f32]) -> bool {
    let [center, low, high] = points else {
        return false;
    };
    let radius = diameters[0] / 2.0;
    let tolerance = NEUROMORPHO_TOLERANCE * radius.abs().max(1.0);
    let close = |a: f32, b: f32| (a - b).abs() <= tolerance;

    diameters.iter().all(|&d| close(d, diameters[0]))
        && [low, high].iter().all(|p| close(p[0], center[0]) && close(p[2], center[2]))
        && close(low[1], center[1] - radius)
        && close(high[1], center[1] + radius)
}

/// Centroid of a contour and the diameter of a circle of mean radius.
fn contour_average(points: &[Point], diameters: &[f32]) -> (Point, f32) {
    let n = points.len() as f32;
    let mut center = [0.0f32; 3];
    for point in points {
        for (c, p) in center.iter_mut().zip(point) {
            *c += p;
        }
    }
    let center = center.map(|c| c / n);

    let mean_distance = points.iter().map(|p| distance(p, &center)).sum::<f32>() / n;
    let diameter = if mean_distance > 0.0 {
        2.0 * mean_distance
    } else {
        diameters.iter().sum::<f32>() / n
    };
    (center, diameter)
}

// =#========================================================================#=
// SAMPLE TREE
// =#========================================================================$=
/// Samples with resolved parent and child indices.
struct SampleTree<'s> {
    samples: &'s [Sample],
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl<'s> SampleTree<'s> {
    /// Resolves parent ids into indices.
    fn resolve(samples: &'s [Sample]) -> Result<Self, RawDataError> {
        let mut index: HashMap<u32, usize> = HashMap::with_capacity(samples.len());
        for (i, sample) in samples.iter().enumerate() {
            if i64::from(sample.parent_id) == i64::from(sample.id) {
                return Err(RawDataError::self_parent(sample));
            }
            if let Some(&original) = index.get(&sample.id) {
                return Err(RawDataError::repeated_id(&samples[original], sample));
            }
            index.insert(sample.id, i);
        }

        let mut parents = Vec::with_capacity(samples.len());
        let mut children = vec![Vec::new(); samples.len()];
        for (i, sample) in samples.iter().enumerate() {
            if sample.has_no_parent() {
                parents.push(None);
                continue;
            }
            let parent = u32::try_from(sample.parent_id)
                .ok()
                .and_then(|id| index.get(&id).copied())
                .ok_or_else(|| RawDataError::missing_parent(sample))?;
            parents.push(Some(parent));
            children[parent].push(i);
        }

        Ok(Self {
            samples,
            parents,
            children,
        })
    }

    /// Fails with [RawDataErrorKind::Cycle] if a sample cannot be reached
    /// from any parentless sample.
    fn check_reachable(&self) -> Result<(), RawDataError> {
        let mut reached = vec![false; self.samples.len()];
        let mut stack: Vec<usize> = (0..self.samples.len())
            .filter(|&i| self.parents[i].is_none())
            .collect();
        while let Some(i) = stack.pop() {
            reached[i] = true;
            stack.extend(&self.children[i]);
        }

        let unreached: Vec<usize> = (0..self.samples.len()).filter(|&i| !reached[i]).collect();
        match unreached.first() {
            None => Ok(()),
            Some(&first) => {
                let ids = unreached.iter().map(|&i| self.samples[i].id).collect();
                Err(RawDataError::at_line(
                    RawDataErrorKind::Cycle { ids },
                    self.samples[first].line_number,
                ))
            }
        }
    }

    fn is_soma(&self, i: usize) -> bool {
        self.samples[i].is_soma()
    }

    /// Validates the soma samples and returns them in soma order.
    ///
    /// Soma samples must form a single chain, with one exception: the
    /// three-point NeuroMorpho soma, where both outer samples hang from the
    /// center sample.
    fn soma_chain(&self) -> Result<Vec<usize>, RawDataError> {
        let somata: Vec<usize> = (0..self.samples.len()).filter(|&i| self.is_soma(i)).collect();

        let mut soma_roots = Vec::new();
        for &i in &somata {
            match self.parents[i] {
                Some(parent) if !self.is_soma(parent) => {
                    let sample = &self.samples[i];
                    return Err(RawDataError::at_line(
                        RawDataErrorKind::SomaWithNeuriteParent { id: sample.id },
                        sample.line_number,
                    ));
                }
                Some(_) => {}
                None => soma_roots.push(i),
            }
        }

        let Some(&root) = soma_roots.first() else {
            return Ok(Vec::new());
        };
        if soma_roots.len() > 1 {
            let roots: Vec<&Sample> = soma_roots.iter().map(|&i| &self.samples[i]).collect();
            return Err(RawDataError::multiple_somata(&roots));
        }

        let soma_children =
            |i: usize| self.children[i].iter().copied().filter(|&c| self.is_soma(c)).collect::<Vec<_>>();

        let root_children = soma_children(root);
        if somata.len() == 3 && root_children.len() == 2 {
            return Ok(vec![root, root_children[0], root_children[1]]);
        }

        let mut chain = vec![root];
        let mut next = root_children;
        loop {
            match next[..] {
                [] => break,
                [only] => {
                    chain.push(only);
                    next = soma_children(only);
                }
                _ => {
                    let current = chain[chain.len() - 1];
                    let sample = &self.samples[current];
                    return Err(RawDataError::at_line(
                        RawDataErrorKind::SomaBifurcation {
                            id: sample.id,
                            children: next.iter().map(|&c| self.samples[c].id).collect(),
                        },
                        sample.line_number,
                    ));
                }
            }
        }
        Ok(chain)
    }

    /// Neurite samples without parent or with a soma parent, in file order.
    fn neurite_roots(&self) -> Vec<usize> {
        (0..self.samples.len())
            .filter(|&i| !self.is_soma(i))
            .filter(|&i| self.parents[i].is_none_or(|parent| self.is_soma(parent)))
            .collect()
    }

    /// Emits the advisories for a neurite root.
    fn check_root(
        &self,
        root: usize,
        soma_chain: &[usize],
        is_neuromorpho: bool,
        builder: &mut SectionTreeBuilder,
    ) {
        let sample = &self.samples[root];
        match self.parents[root] {
            None => {
                let touches_soma = soma_chain
                    .iter()
                    .any(|&s| same_position(&self.samples[s].point, &sample.point));
                if !touches_soma {
                    let warning = Warning::new(
                        WarningKind::DisconnectedNeurite,
                        format!("neurite starting at sample {} is not connected to the soma", sample.id),
                    )
                    .at_line(sample.line_number);
                    builder.diagnostics_mut().warn(warning);
                }
            }
            Some(parent) if is_neuromorpho && soma_chain.first() != Some(&parent) => {
                let warning = Warning::new(
                    WarningKind::WrongRootPoint,
                    format!(
                        "neurite starting at sample {} is attached to soma sample {} instead of the soma center",
                        sample.id, self.samples[parent].id
                    ),
                )
                .at_line(sample.line_number);
                builder.diagnostics_mut().warn(warning);
            }
            Some(_) => {}
        }
    }

    /// Cuts the neurite samples into sections.
    ///
    /// A section continues while its last sample has exactly one child of
    /// the same type.
    fn segment(&self, roots: &[usize], builder: &mut SectionTreeBuilder) -> Result<(), RawDataError> {
        let mut stack: Vec<(usize, Option<StagedId>)> = roots.iter().rev().map(|&r| (r, None)).collect();

        while let Some((start, parent)) = stack.pop() {
            let section_type = self.samples[start].section_type;
            let mut run = vec![start];
            let mut current = start;
            while let [only] = self.children[current][..] {
                if self.samples[only].section_type != section_type {
                    break;
                }
                run.push(only);
                current = only;
            }

            let points = run.iter().map(|&i| self.samples[i].point).collect();
            let diameters = run.iter().map(|&i| self.samples[i].diameter).collect();
            let staged = match parent {
                None => builder.append_root_section(section_type, points, diameters)?,
                Some(parent) => builder.append_child_section(parent, section_type, points, diameters)?,
            };
            builder.set_line(staged, self.samples[start].line_number);
            for &i in &run {
                builder.map_sample(self.samples[i].id, staged);
            }

            stack.extend(self.children[current].iter().rev().map(|&c| (c, Some(staged))));
        }
        Ok(())
    }
}
