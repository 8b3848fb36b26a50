use crate::core::config::{NormalizeOptions, WriteOptionsBuilder};
use crate::core::io::input::PdbInput;
use crate::core::io::pdb::PdbError;
use tracing::instrument;

/// Re-emits PDB text through the hierarchy. Only the crystallographic
/// section (verbatim or regenerated from the symmetry) and the atoms are
/// written; serials are renumbered unless asked otherwise.
///
/// # Errors
///
/// Returns [`PdbError`] if the input cannot be parsed, its symmetry records
/// are inconsistent, or a value does not fit its output columns.
#[instrument(skip_all)]
pub fn rewrite_normalized<I, S>(lines: I, options: &NormalizeOptions) -> Result<Vec<String>, PdbError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let input = PdbInput::from_lines("", lines)?;
    let mut hierarchy = input.construct_hierarchy()?;

    let builder = if options.keep_original_crystallographic_section {
        WriteOptionsBuilder::new()
            .header_lines(input.crystallographic_section().to_vec())
            .crystal_symmetry(None)
    } else {
        WriteOptionsBuilder::new().crystal_symmetry(input.crystal_symmetry(None, false)?)
    };
    if !options.keep_original_atom_serial {
        hierarchy.reset_serials();
    }

    let write = builder.append_end(true).build();
    Ok(hierarchy.as_pdb_lines(&write)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
REMARK   3 REFINEMENT.
CRYST1   50.840   42.770   28.950  90.00  90.00  90.00 P 21 21 21    4
ORIGX1      1.000000  0.000000  0.000000        0.00000
ATOM     10  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ATOM     20  CA  GLY A   1       2.000   2.000   3.000  1.00 10.00           C
";

    #[test]
    fn regenerates_symmetry_and_renumbers() {
        let lines = rewrite_normalized(INPUT.lines(), &NormalizeOptions::default()).unwrap();
        assert_eq!(
            lines[0],
            "CRYST1   50.840   42.770   28.950  90.00  90.00  90.00 P 21 21 21"
        );
        assert!(lines[1].starts_with("SCALE1"));
        assert!(!lines.iter().any(|l| l.starts_with("REMARK")));
        assert!(!lines.iter().any(|l| l.starts_with("ORIGX1")));
        assert!(lines[4].starts_with("ATOM      1  N"));
        assert!(lines[5].starts_with("ATOM      2  CA"));
        assert_eq!(lines.last().map(String::as_str), Some("END"));
    }

    #[test]
    fn keeps_original_section_and_serials_on_request() {
        let options = NormalizeOptions {
            keep_original_crystallographic_section: true,
            keep_original_atom_serial: true,
        };
        let lines = rewrite_normalized(INPUT.lines(), &options).unwrap();
        assert_eq!(lines[0], INPUT.lines().nth(1).unwrap());
        assert_eq!(lines[1], INPUT.lines().nth(2).unwrap());
        assert!(!lines.iter().any(|l| l.starts_with("SCALE")));
        assert!(lines[2].starts_with("ATOM     10  N"));
    }

    #[test]
    fn empty_input_yields_end_only() {
        let lines = rewrite_normalized(Vec::<String>::new(), &NormalizeOptions::default()).unwrap();
        assert_eq!(lines, ["END"]);
    }
}
