use pdbtree::core::config::PdbConfig;
use pdbtree::core::io::input::PdbInput;
use pdbtree::core::io::pdb::{PdbError, PdbFile};
use pdbtree::core::io::traits::StructureFile;
use pdbtree::workflows::normalize::rewrite_normalized;
use std::fs;

const STRUCTURE: &str = "\
HEADER    OXIDOREDUCTASE                          21-SEP-99   1ABC
REMARK   2 RESOLUTION. 2.00 ANGSTROMS.
CRYST1   40.000   50.000   60.000  90.00  95.00  90.00 P 1 21 1      2
MODEL        1
ATOM      1  N   SER A  10      10.000  10.000  10.000  1.00 15.00           N
ATOM      2  CA ASER A  10      11.000  10.000  10.000  0.60 15.00           C
ANISOU    2  CA ASER A  10     1500   1600   1700     10     20     30       C
ATOM      3  CA BSER A  10      11.100  10.100  10.000  0.40 15.00           C
ATOM      4  CA  GLY A  10A     12.000  10.000  10.000  1.00 15.00           C
BREAK
ATOM      5  CA  ALA A  20      20.000  10.000  10.000  1.00 15.00           C
TER
HETATM    6  O   HOH B 301      30.000  30.000  30.000  1.00 25.00           O
ENDMDL
MODEL        2
ATOM      7  N   SER A  10      10.500  10.000  10.000  1.00 15.00           N
ENDMDL
END
";

fn atom_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| l.starts_with("ATOM") || l.starts_with("HETATM") || l.starts_with("ANISOU"))
        .map(str::to_string)
        .collect()
}

#[test]
fn file_round_trip_preserves_atoms_and_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("in.pdb");
    let output_path = dir.path().join("out.pdb");
    fs::write(&input_path, STRUCTURE).unwrap();

    let (hierarchy, metadata) = PdbFile::read_from_path(&input_path).unwrap();
    let counts = hierarchy.overall_counts();
    assert_eq!(counts.models, 2);
    assert_eq!(counts.atoms, 7);
    assert_eq!(metadata.cryst1_z, Some(2));

    PdbFile::write_to_path(&hierarchy, &metadata, &output_path).unwrap();
    let written = fs::read_to_string(&output_path).unwrap();

    assert_eq!(atom_lines(&written), atom_lines(STRUCTURE));
    assert!(written.contains("\nBREAK\n"));
    assert!(written.contains("MODEL        1\n"));
    assert!(written.contains("MODEL        2\n"));
    assert!(written.starts_with("HEADER    OXIDOREDUCTASE"));
    assert!(written.ends_with("END\n"));

    let (again, _) = PdbFile::read_from_path(&output_path).unwrap();
    assert_eq!(again.overall_counts(), counts);
}

#[test]
fn scanned_input_exposes_header_and_symmetry() {
    let input = PdbInput::from_lines("in.pdb", STRUCTURE.lines()).unwrap();
    assert_eq!(input.extract_header_year(), Some(99));
    assert_eq!(input.model_ids(), ["1", "2"]);
    let symmetry = input.crystal_symmetry(None, false).unwrap().unwrap();
    assert_eq!(symmetry.space_group.as_deref(), Some("P 1 21 1"));
    assert!(input.scale_matrix().unwrap().is_none());
}

#[test]
fn large_serials_use_hybrid36_and_survive_round_trip() {
    let line =
        "ATOM  A0000  CA  ALA A   1       1.000   1.000   1.000  1.00 10.00           C\n";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.pdb");
    fs::write(&path, line).unwrap();

    let (hierarchy, metadata) = PdbFile::read_from_path(&path).unwrap();
    let serial = hierarchy.atoms_in_order().next().unwrap().atom.serial;
    assert_eq!(serial, 100_000);
    PdbFile::write_to_path(&hierarchy, &metadata, &path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("ATOM  A0000  CA  ALA A   1"));
}

#[test]
fn config_file_drives_write_options() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("pdbtree.toml");
    fs::write(
        &config_path,
        "[write]\nemit_ter = false\nappend_end = true\n\n[symmetry]\nweak = true\n",
    )
    .unwrap();
    let config = PdbConfig::load(&config_path).unwrap();
    assert!(config.symmetry.weak);

    let input = PdbInput::from_lines("", STRUCTURE.lines()).unwrap();
    let hierarchy = input.construct_hierarchy().unwrap();
    let text = hierarchy.as_pdb_string(&config.write).unwrap();
    assert!(!text.contains("TER"));
    assert!(text.ends_with("END\n"));
}

#[test]
fn normalized_rewrite_renumbers_after_reading_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("norm.pdb");
    let shuffled = STRUCTURE.replace("ATOM      7", "ATOM     70");
    fs::write(&path, &shuffled).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines = rewrite_normalized(text.lines(), &Default::default()).unwrap();
    let serials: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("ATOM") || l.starts_with("HETATM"))
        .map(|l| l[6..11].trim())
        .collect();
    assert_eq!(serials, ["1", "2", "3", "4", "5", "6", "7"]);
    assert!(lines.iter().any(|l| l.starts_with("SCALE3")));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = PdbFile::read_from_path(dir.path().join("absent.pdb"));
    assert!(matches!(result, Err(PdbError::Io(_))));
}

#[test]
fn parse_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdb");
    fs::write(&path, "REMARK   1 HEADER\nATOM      1  N   GLY A   1       1.0x0   2.000   3.000\n").unwrap();
    let err = PdbFile::read_from_path(&path).unwrap_err();
    assert!(err.to_string().starts_with(&format!("{}: line 2:", path.display())));
}

#[test]
fn connectivity_and_recorded_scale_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("scaled.pdb");
    let output_path = dir.path().join("scaled_out.pdb");
    fs::write(
        &input_path,
        "\
CRYST1   20.000   20.000   20.000  90.00  90.00  90.00 P 1           1
SCALE1      0.100000  0.000000  0.000000        0.00000
SCALE2      0.000000  0.100000  0.000000        0.00000
SCALE3      0.000000  0.000000  0.100000        0.00000
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ATOM      2  CA  GLY A   1       2.000   2.000   3.000  1.00 10.00           C
CONECT    1    2
END
",
    )
    .unwrap();
    let (hierarchy, metadata) = PdbFile::read_from_path(&input_path).unwrap();
    PdbFile::write_to_path(&hierarchy, &metadata, &output_path).unwrap();
    let written = fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("SCALE1      0.100000  0.000000  0.000000        0.00000\n"));
    assert!(written.contains("CONECT    1    2\n"));
    assert!(written.ends_with("END\n"));
}
