use neuromorph::batch::load_all;
use neuromorph::error::MorphError;
use neuromorph::format::{self, Format};
use neuromorph::h5::Tables;
use neuromorph::model::BuildOptions;
use neuromorph::{load_file, write_file};

const SIMPLE_SWC: &str = "tests/fixtures/simple.swc";
const SIMPLE_ASC: &str = "tests/fixtures/simple.asc";

// --- TESTS FORMAT DISPATCH ---
#[test]
fn test_load_by_extension() {
    let from_swc = load_file(SIMPLE_SWC).unwrap();
    let from_asc = load_file(SIMPLE_ASC).unwrap();
    assert_eq!(from_swc.points(), from_asc.points());
    assert_eq!(Format::from_path(SIMPLE_ASC).unwrap().to_string(), "ASC");
}

#[test]
fn test_unknown_extension() {
    let err = load_file("tests/fixtures/simple.obj").unwrap_err();
    assert!(matches!(err, MorphError::UnknownFileType(_)));

    let morphology = load_file(SIMPLE_SWC).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = write_file(&morphology, dir.path().join("out.txt")).unwrap_err();
    assert!(matches!(err, MorphError::UnknownFileType(_)));
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn test_h5_file_backend_unsupported() {
    let morphology = load_file(SIMPLE_SWC).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = write_file(&morphology, dir.path().join("out.h5")).unwrap_err();
    assert!(matches!(err, MorphError::UnsupportedBackend(_)));
}

#[test]
fn test_write_and_reload_each_format() {
    let original = load_file(SIMPLE_SWC).unwrap();
    let dir = tempfile::tempdir().unwrap();
    for name in ["copy.swc", "copy.ASC"] {
        let path = dir.path().join(name);
        write_file(&original, &path).unwrap();
        let reloaded = format::load(&path, &BuildOptions::default()).unwrap();
        assert_eq!(reloaded.points(), original.points(), "{name}");
        assert_eq!(reloaded.diameters(), original.diameters(), "{name}");
        assert_eq!(reloaded.section_types(), original.section_types(), "{name}");
    }
}

// --- TESTS H5 TABLES ---
#[test]
fn test_h5_tables_of_simple_neuron() {
    let morphology = load_file(SIMPLE_SWC).unwrap();
    let tables = Tables::from_morphology(&morphology).unwrap();

    assert_eq!(
        tables.structure,
        vec![[0, -1, 1], [1, 0, 3], [3, 1, 3], [5, 1, 3], [7, 0, 2], [9, 4, 2], [11, 4, 2]]
    );
    assert_eq!(tables.points.len(), 13);
    assert_eq!(tables.points[3], [0.0, 5.0, 0.0, 2.0]);

    let reloaded = tables.into_morphology(BuildOptions::default()).unwrap();
    assert_eq!(reloaded, morphology);
}

// --- TESTS BATCH LOADING ---
#[test]
fn test_batch_loading() {
    let cells = load_all(&[SIMPLE_SWC, SIMPLE_ASC, SIMPLE_SWC], &BuildOptions::default()).unwrap();
    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0], cells[2]);
    assert_eq!(cells[1].uri(), Some(SIMPLE_ASC));

    let err = load_all(&[SIMPLE_SWC, "tests/fixtures/none.swc"], &BuildOptions::default()).unwrap_err();
    assert!(matches!(err, MorphError::Io { .. }));
}
