use neuromorph::Morphology;
use neuromorph::error::RawDataErrorKind;
use neuromorph::model::{BuildOptions, Sample, SampleTreeBuilder, SectionTreeBuilder, SectionType, SomaType};
use neuromorph::swc;
use neuromorph::warning::{WarningConfig, WarningKind};
use proptest::prelude::*;

fn soma(id: u32, point: [f32; 3], parent: i32) -> Sample {
    Sample::new(id, SectionType::Soma, point, 2.0, parent)
}

fn axon(id: u32, point: [f32; 3], parent: i32) -> Sample {
    Sample::new(id, SectionType::Axon, point, 1.0, parent)
}

fn build(samples: &[Sample], options: BuildOptions) -> Morphology {
    SampleTreeBuilder::new(options)
        .with_soma_policy(SomaType::SinglePoint)
        .build(samples)
        .unwrap()
}

// --- TESTS SAMPLE TREE BUILDER ---
#[test]
fn test_branching_axon() {
    let samples = vec![
        soma(1, [0.0, 0.0, 0.0], -1),
        axon(2, [0.0, 0.0, 1.0], 1),
        axon(3, [0.0, 0.0, 2.0], 2),
        axon(4, [1.0, 0.0, 2.0], 3),
        axon(5, [-1.0, 0.0, 2.0], 3),
    ];
    let morphology = build(&samples, BuildOptions::default());

    assert_eq!(morphology.soma().points().len(), 1);
    assert_eq!(morphology.root_section_ids(), &[0]);
    assert_eq!(morphology.children(0), &[1, 2]);

    let root = morphology.section(0).unwrap();
    assert_eq!(root.points(), &[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0]]);
    for child in root.children() {
        assert_eq!(child.points()[0], [0.0, 0.0, 2.0]);
        assert_eq!(child.num_points(), 2);
    }
}

#[test]
fn test_branch_point_with_three_children() {
    // Samples 3, 4 and 5 all hang from sample 2, which makes sample 2 the
    // branch point and the root section a single point long
    let samples = vec![
        soma(1, [0.0, 0.0, 0.0], -1),
        axon(2, [0.0, 0.0, 1.0], 1),
        axon(3, [0.0, 0.0, 2.0], 2),
        axon(4, [1.0, 0.0, 2.0], 2),
        axon(5, [-1.0, 0.0, 2.0], 2),
    ];
    let morphology = build(&samples, BuildOptions::default());

    assert_eq!(morphology.root_section_ids().len(), 1);
    assert_eq!(morphology.children(0), &[1, 2, 3]);
    assert_eq!(morphology.section(0).unwrap().points(), &[[0.0, 0.0, 1.0]]);
    for child in morphology.section(0).unwrap().children() {
        assert_eq!(child.points()[0], [0.0, 0.0, 1.0]);
    }
}

#[test]
fn test_type_change_starts_section() {
    let samples = vec![
        soma(1, [0.0; 3], -1),
        Sample::new(2, SectionType::BasalDendrite, [0.0, 1.0, 0.0], 1.0, 1),
        Sample::new(3, SectionType::BasalDendrite, [0.0, 2.0, 0.0], 1.0, 2),
        Sample::new(4, SectionType::ApicalDendrite, [0.0, 3.0, 0.0], 1.0, 3),
    ];
    let morphology = build(&samples, BuildOptions::default());
    assert_eq!(morphology.num_sections(), 2);
    assert_eq!(morphology.section_types(), &[SectionType::BasalDendrite, SectionType::ApicalDendrite]);

    let kinds: Vec<WarningKind> = morphology.warnings().iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec![WarningKind::OnlyChild]);
}

#[test]
fn test_wrong_duplicate_keeps_child_sample() {
    let samples = vec![
        soma(1, [0.0; 3], -1),
        axon(2, [0.0, 1.0, 0.0], 1),
        axon(3, [0.0, 2.0, 0.0], 2),
        Sample::new(4, SectionType::Axon, [0.0, 2.0, 0.0], 3.0, 3),
        axon(5, [0.0, 3.0, 0.0], 4),
        axon(6, [1.0, 2.0, 0.0], 3),
    ];
    let morphology = build(&samples, BuildOptions::default());

    let first_child = morphology.section(1).unwrap();
    assert_eq!(first_child.points(), &[[0.0, 2.0, 0.0], [0.0, 3.0, 0.0]]);
    assert_eq!(first_child.diameters(), &[3.0, 1.0]);

    let warnings = morphology.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind(), WarningKind::WrongDuplicate);
}

#[test]
fn test_neuromorpho_soma() {
    let samples = vec![
        soma(1, [0.0, 0.0, 0.0], -1),
        soma(2, [0.0, -1.0, 0.0], 1),
        soma(3, [0.0, 1.0, 0.0], 1),
        axon(4, [0.0, 2.0, 0.0], 3),
        axon(5, [0.0, 3.0, 0.0], 4),
    ];
    let morphology = SampleTreeBuilder::new(BuildOptions::default())
        .with_soma_policy(SomaType::Cylinders)
        .build(&samples)
        .unwrap();

    assert_eq!(morphology.soma().points().len(), 3);
    let kinds: Vec<WarningKind> = morphology.warnings().iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec![WarningKind::WrongRootPoint]);
}

#[test]
fn test_undefined_soma_policy() {
    let err = SampleTreeBuilder::new(BuildOptions::default())
        .build(&[soma(1, [0.0; 3], -1)])
        .unwrap_err();
    assert_eq!(err.kind(), &RawDataErrorKind::UndefinedSoma);
}

#[test]
fn test_single_child_merge() {
    let samples = vec![
        soma(1, [0.0; 3], -1),
        Sample::new(2, SectionType::BasalDendrite, [0.0, 1.0, 0.0], 1.0, 1),
        Sample::new(3, SectionType::ApicalDendrite, [0.0, 2.0, 0.0], 1.0, 2),
        Sample::new(4, SectionType::ApicalDendrite, [1.0, 3.0, 0.0], 1.0, 3),
        Sample::new(5, SectionType::ApicalDendrite, [-1.0, 3.0, 0.0], 1.0, 3),
    ];
    let options = BuildOptions::default()
        .with_single_child_merge()
        .with_warnings(WarningConfig::default().ignore(WarningKind::OnlyChild));
    let morphology = build(&samples, options);

    assert_eq!(morphology.num_sections(), 3);
    assert_eq!(
        morphology.section(0).unwrap().points(),
        &[[0.0, 1.0, 0.0], [0.0, 2.0, 0.0]]
    );
    assert_eq!(morphology.children(0), &[1, 2]);
    assert_eq!(morphology.section_of_sample(3), Some(0));
    assert!(morphology.warnings().is_empty());
}

// --- TESTS SECTION TREE BUILDER ---
#[test]
fn test_section_builder_api() {
    let mut builder = SectionTreeBuilder::new(BuildOptions::default());
    builder
        .set_soma(SomaType::SinglePoint, vec![[0.0; 3]], vec![4.0])
        .unwrap();
    let root = builder
        .append_root_section(SectionType::Axon, vec![[0.0; 3], [0.0, 5.0, 0.0]], vec![1.0, 1.0])
        .unwrap();
    builder
        .append_child_section(root, SectionType::Axon, vec![[1.0, 6.0, 0.0]], vec![0.5])
        .unwrap();
    builder
        .append_child_section(root, SectionType::Axon, vec![[-1.0, 6.0, 0.0]], vec![0.5])
        .unwrap();
    assert_eq!(builder.num_sections(), 3);

    let err = builder
        .append_child_section(17, SectionType::Axon, vec![[0.0; 3]], vec![1.0])
        .unwrap_err();
    assert!(matches!(err.kind(), RawDataErrorKind::InvalidConnectivity(_)));
    let err = builder
        .append_root_section(SectionType::Axon, vec![[0.0; 3]; 2], vec![1.0])
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &RawDataErrorKind::VectorLengthMismatch {
            points: 2,
            diameters: 1
        }
    );

    let morphology = builder.finish();
    assert_eq!(morphology.section(2).unwrap().points(), &[[0.0, 5.0, 0.0], [-1.0, 6.0, 0.0]]);
    assert_eq!(morphology.section(2).unwrap().diameters(), &[1.0, 0.5]);
}

#[test]
fn test_appending_to_empty_section() {
    let mut builder = SectionTreeBuilder::new(BuildOptions::default());
    let root = builder
        .append_root_section(SectionType::Axon, vec![], vec![])
        .unwrap();
    builder
        .append_child_section(root, SectionType::Axon, vec![[1.0; 3]], vec![1.0])
        .unwrap();
    builder
        .append_child_section(root, SectionType::Axon, vec![[2.0; 3]], vec![1.0])
        .unwrap();

    let morphology = builder.finish();
    assert_eq!(morphology.section(1).unwrap().points(), &[[1.0; 3]]);
    let kinds: Vec<WarningKind> = morphology.warnings().iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec![WarningKind::AppendingEmptySection; 2]);
    assert_eq!(morphology.suppressed_warnings(), 0);
}

#[test]
fn test_warnings_past_cap_are_counted() {
    let options = BuildOptions::default().with_warnings(WarningConfig::default().with_max_warnings(1));
    let mut builder = SectionTreeBuilder::new(options);
    let root = builder
        .append_root_section(SectionType::Axon, vec![], vec![])
        .unwrap();
    for x in 1..=3 {
        builder
            .append_child_section(root, SectionType::Axon, vec![[x as f32; 3]], vec![1.0])
            .unwrap();
    }

    let morphology = builder.finish();
    assert_eq!(morphology.warnings().len(), 1);
    assert_eq!(morphology.suppressed_warnings(), 2);
}

// --- PROPERTIES OF RANDOM TREES ---
/// Position of a generated neurite sample relative to its parent.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Fresh,
    OnParent,
    OnParentThicker,
}

fn placement_strategy() -> impl Strategy<Value = Placement> {
    prop_oneof![
        3 => Just(Placement::Fresh),
        1 => Just(Placement::OnParent),
        1 => Just(Placement::OnParentThicker),
    ]
}

/// SWC text of a soma plus `samples.len()` neurite samples; neurite sample
/// `k` (id `k + 2`) hangs from the sample with id `choice + 1`, where
/// `choice` is drawn from `0..=k` (0 being the soma). Samples placed on a
/// neurite parent repeat its position, with the same or a larger radius.
fn random_swc(samples: &[(prop::sample::Index, i32, Placement)]) -> String {
    let mut swc = String::from("1 1 0 0 0 1 -1\n");
    // (x, y, radius) per sample id - 1
    let mut rows = vec![(0.0f32, 0.0f32, 1.0f32)];
    for (k, (choice, code, placement)) in samples.iter().enumerate() {
        let parent = choice.index(k + 1) + 1;
        let id = k + 2;
        let (px, py, pr) = rows[parent - 1];
        let row = match placement {
            Placement::OnParent if parent > 1 => (px, py, pr),
            Placement::OnParentThicker if parent > 1 => (px, py, pr + 1.0),
            _ => (k as f32, (id % 7) as f32, 0.5),
        };
        swc.push_str(&format!("{id} {code} {} {} 0 {} {parent}\n", row.0, row.1, row.2));
        rows.push(row);
    }
    swc
}

fn tree_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((any::<prop::sample::Index>(), 2..=4i32, placement_strategy()), 1..60)
        .prop_map(|samples| random_swc(&samples))
}

proptest! {
    #[test]
    fn sections_are_non_empty_and_ordered(swc_str in tree_strategy()) {
        let morphology = swc::parse_str(&swc_str).unwrap();
        let records = morphology.properties().sections();
        for pair in records.windows(2) {
            prop_assert!(pair[0].offset < pair[1].offset);
        }
        for section in morphology.sections() {
            prop_assert!(section.num_points() > 0);
        }
    }

    #[test]
    fn children_invert_parents(swc_str in tree_strategy()) {
        let morphology = swc::parse_str(&swc_str).unwrap();
        for section in morphology.sections() {
            if let Ok(parent) = section.parent() {
                let count = parent.child_ids().iter().filter(|&&c| c == section.id()).count();
                prop_assert_eq!(count, 1);
            } else {
                prop_assert!(morphology.root_section_ids().contains(&section.id()));
            }
        }
    }

    #[test]
    fn depth_first_visits_parents_first(swc_str in tree_strategy()) {
        let morphology = swc::parse_str(&swc_str).unwrap();
        let order: Vec<u32> = morphology.depth_first().map(|s| s.id()).collect();
        prop_assert_eq!(order.len(), morphology.num_sections());

        let mut position = vec![0usize; order.len()];
        for (i, &id) in order.iter().enumerate() {
            position[id as usize] = i;
        }
        for section in morphology.sections() {
            if let Some(parent) = morphology.parent(section.id()) {
                prop_assert!(position[parent as usize] < position[section.id() as usize]);
            }
            let siblings: Vec<usize> = section.child_ids().iter().map(|&c| position[c as usize]).collect();
            prop_assert!(siblings.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn swc_round_trip(swc_str in tree_strategy()) {
        let morphology = swc::parse_str(&swc_str).unwrap();
        let reloaded = swc::parse_str(swc::to_swc(&morphology).unwrap()).unwrap();
        prop_assert_eq!(reloaded.num_sections(), morphology.num_sections());
        for (a, b) in morphology.sections().zip(reloaded.sections()) {
            prop_assert_eq!(a.points(), b.points());
            prop_assert_eq!(a.diameters(), b.diameters());
        }
        prop_assert_eq!(reloaded, morphology);
    }
}
