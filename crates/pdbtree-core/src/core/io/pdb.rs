use super::input::{InputError, PdbInput};
use super::records::{Cryst1Record, RecordError, RecordKind};
use super::traits::StructureFile;
use crate::core::config::{SymmetryConfig, WriteOptions, WriteOptionsBuilder};
use crate::core::models::builder::PartitionError;
use crate::core::models::hierarchy::Hierarchy;
use crate::core::symmetry::{CrystalSymmetry, FractionalizationMatrix, SymmetryError};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Symmetry(#[from] SymmetryError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Connectivity and bookkeeping records that follow the coordinates.
const TRAILING_RECORDS: [&str; 2] = ["CONECT", "MASTER"];

fn is_trailing_record(line: &str) -> bool {
    TRAILING_RECORDS.iter().any(|name| line.starts_with(name))
}

/// Everything outside the atom section that a round trip preserves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub title_lines: Vec<String>,
    pub remark_lines: Vec<String>,
    pub crystallographic_lines: Vec<String>,
    pub other_lines: Vec<String>,
    pub crystal_symmetry: Option<CrystalSymmetry>,
    pub cryst1_z: Option<i64>,
    pub scale_matrix: Option<FractionalizationMatrix>,
}

impl PdbMetadata {
    /// Collects metadata from a scanned input with the default
    /// [`SymmetryConfig`].
    pub fn from_input(input: &PdbInput) -> Result<Self, SymmetryError> {
        Self::from_input_with(input, &SymmetryConfig::default())
    }

    /// Collects metadata from a scanned input. `scale_matrix` holds the
    /// SCALE records only when they say more than the unit cell does.
    ///
    /// # Errors
    ///
    /// Returns [`SymmetryError`] if the crystallographic section holds an
    /// incomplete SCALE set or a malformed CRYST1 record.
    pub fn from_input_with(input: &PdbInput, config: &SymmetryConfig) -> Result<Self, SymmetryError> {
        let cryst1_z = match input
            .crystallographic_section()
            .iter()
            .find(|l| RecordKind::classify(l) == RecordKind::Cryst1)
        {
            Some(line) => Cryst1Record::parse(line)?.z,
            None => None,
        };
        Ok(Self {
            title_lines: input.title_section().to_vec(),
            remark_lines: input.remark_section().to_vec(),
            crystallographic_lines: input.crystallographic_section().to_vec(),
            other_lines: input.other_section().to_vec(),
            crystal_symmetry: input.crystal_symmetry_with(config, None)?,
            cryst1_z,
            scale_matrix: input.effective_scale_matrix(config)?,
        })
    }

    /// Write options that regenerate this file's non-atom records.
    ///
    /// Title, remark and other annotation lines precede CRYST1. A recorded
    /// SCALE matrix replaces the cell-derived one, ORIGX and MTRIX lines
    /// follow it verbatim, and CONECT/MASTER lines are written after the
    /// atoms.
    pub fn write_options(&self) -> WriteOptions {
        let (trailer, annotations): (Vec<String>, Vec<String>) = self
            .other_lines
            .iter()
            .cloned()
            .partition(|l| is_trailing_record(l));
        let header = self
            .title_lines
            .iter()
            .chain(&self.remark_lines)
            .cloned()
            .chain(annotations)
            .collect();
        let crystallographic = self
            .crystallographic_lines
            .iter()
            .filter(|l| RecordKind::classify(l) == RecordKind::Crystallographic)
            .cloned()
            .collect();
        WriteOptionsBuilder::new()
            .header_lines(header)
            .crystal_symmetry(self.crystal_symmetry.clone())
            .cryst1_z(self.cryst1_z)
            .scale_matrix(self.scale_matrix)
            .crystallographic_lines(crystallographic)
            .trailer_lines(trailer)
            .append_end(true)
            .build()
    }
}

pub struct PdbFile;

impl PdbFile {
    /// Scans a reader into a [`PdbInput`] without building the tree.
    #[instrument(skip_all)]
    pub fn read_input(reader: &mut impl BufRead, source_info: &str) -> Result<PdbInput, PdbError> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Ok(PdbInput::from_lines(source_info, &lines)?)
    }

    /// Reads a file, reconciling its symmetry records under `config`.
    pub fn read_with_config(
        reader: &mut impl BufRead,
        source_info: &str,
        config: &SymmetryConfig,
    ) -> Result<(Hierarchy, PdbMetadata), PdbError> {
        let input = Self::read_input(reader, source_info)?;
        let hierarchy = input.construct_hierarchy()?;
        let metadata = PdbMetadata::from_input_with(&input, config)?;
        Ok((hierarchy, metadata))
    }

    fn write_lines(lines: &[String], writer: &mut impl Write) -> Result<(), PdbError> {
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
        source_info: &str,
    ) -> Result<(Hierarchy, Self::Metadata), Self::Error> {
        Self::read_with_config(reader, source_info, &SymmetryConfig::default())
    }

    fn write_to(
        hierarchy: &Hierarchy,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let lines = hierarchy.as_pdb_lines(&metadata.write_options())?;
        Self::write_lines(&lines, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SMALL: &str = "\
HEADER    TEST                                    01-JAN-05   XXXX
REMARK   1 SMALL TEST FILE
CRYST1   20.000   20.000   20.000  90.00  90.00  90.00 P 1           1
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ATOM      2  CA  GLY A   1       2.000   2.000   3.000  1.00 10.00           C
TER
END
";

    #[test]
    fn read_collects_metadata_and_tree() {
        let (hierarchy, metadata) = PdbFile::read_from(&mut Cursor::new(SMALL), "").unwrap();
        assert_eq!(hierarchy.atoms_count(), 2);
        assert_eq!(metadata.title_lines.len(), 1);
        assert_eq!(metadata.remark_lines, ["REMARK   1 SMALL TEST FILE"]);
        assert_eq!(metadata.cryst1_z, Some(1));
        let symmetry = metadata.crystal_symmetry.unwrap();
        assert_eq!(symmetry.space_group.as_deref(), Some("P 1"));
        assert!(metadata.scale_matrix.is_none());
    }

    #[test]
    fn write_reproduces_header_atoms_and_end() {
        let (hierarchy, metadata) = PdbFile::read_from(&mut Cursor::new(SMALL), "").unwrap();
        let mut out = Vec::new();
        PdbFile::write_to(&hierarchy, &metadata, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], SMALL.lines().next().unwrap());
        assert_eq!(lines[1], "REMARK   1 SMALL TEST FILE");
        assert!(lines[2].starts_with("CRYST1   20.000   20.000   20.000"));
        assert!(lines.contains(&SMALL.lines().nth(3).unwrap()));
        assert_eq!(lines.last(), Some(&"END"));
    }

    #[test]
    fn write_without_metadata_has_no_cryst1() {
        let (hierarchy, _) = PdbFile::read_from(&mut Cursor::new(SMALL), "").unwrap();
        let mut out = Vec::new();
        PdbFile::write_hierarchy_to(&hierarchy, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ATOM      1  N   GLY A   1"));
        assert!(!text.contains("CRYST1"));
    }

    #[test]
    fn write_keeps_recorded_scale_and_non_atom_records() {
        let text = "\
SEQRES   1 A    1  GLY
CRYST1   20.000   20.000   20.000  90.00  90.00  90.00 P 1           1
ORIGX1      1.000000  0.000000  0.000000        0.00000
SCALE1      0.100000  0.000000  0.000000        0.00000
SCALE2      0.000000  0.100000  0.000000        0.00000
SCALE3      0.000000  0.000000  0.100000        0.00000
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ATOM      2  CA  GLY A   1       2.000   2.000   3.000  1.00 10.00           C
CONECT    1    2
END
";
        let (hierarchy, metadata) = PdbFile::read_from(&mut Cursor::new(text), "").unwrap();
        assert!(metadata.scale_matrix.is_some());
        let mut out = Vec::new();
        PdbFile::write_to(&hierarchy, &metadata, &mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(lines[0], "SEQRES   1 A    1  GLY");
        assert!(lines[1].starts_with("CRYST1   20.000"));
        assert_eq!(lines[2], "SCALE1      0.100000  0.000000  0.000000        0.00000");
        assert_eq!(lines[4], "SCALE3      0.000000  0.000000  0.100000        0.00000");
        assert!(lines[5].starts_with("ORIGX1      1.000000"));
        let conect = lines.iter().position(|l| *l == "CONECT    1    2").unwrap();
        let last_atom = lines.iter().rposition(|l| l.starts_with("ATOM")).unwrap();
        assert!(conect > last_atom);
        assert_eq!(lines.last(), Some(&"END"));

        let (_, again) = PdbFile::read_from(&mut Cursor::new(written.as_str()), "").unwrap();
        assert_eq!(again.scale_matrix, metadata.scale_matrix);
        assert_eq!(again.other_lines, metadata.other_lines);
    }

    #[test]
    fn redundant_scale_is_regenerated_from_the_cell() {
        let text = "\
CRYST1   20.000   20.000   20.000  90.00  90.00  90.00 P 1           1
SCALE1      0.050000  0.000000  0.000000        0.00000
SCALE2      0.000000  0.050000  0.000000        0.00000
SCALE3      0.000000  0.000000  0.050000        0.00000
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
";
        let (_, metadata) = PdbFile::read_from(&mut Cursor::new(text), "").unwrap();
        assert!(metadata.scale_matrix.is_none());
    }

    #[test]
    fn read_with_config_applies_scale_tolerance() {
        let text = "\
CRYST1   20.000   20.000   20.000  90.00  90.00  90.00 P 1           1
SCALE1      0.050010  0.000000  0.000000        0.00000
SCALE2      0.000000  0.050000  0.000000        0.00000
SCALE3      0.000000  0.000000  0.050000        0.00000
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
";
        let (_, strict) = PdbFile::read_from(&mut Cursor::new(text), "").unwrap();
        assert!(strict.scale_matrix.is_some());
        let loose = SymmetryConfig {
            scale_matrix_tolerance: 1e-3,
            ..SymmetryConfig::default()
        };
        let (_, relaxed) = PdbFile::read_with_config(&mut Cursor::new(text), "", &loose).unwrap();
        assert!(relaxed.scale_matrix.is_none());
    }

    #[test]
    fn duplicate_model_ids_are_rejected() {
        let text = "\
MODEL        1
ATOM      1  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ENDMDL
MODEL        1
ATOM      2  N   GLY A   1       1.000   2.000   3.000  1.00 10.00           N
ENDMDL
END
";
        let err = PdbFile::read_from(&mut Cursor::new(text), "").unwrap_err();
        assert!(matches!(
            err,
            PdbError::Partition(PartitionError::DuplicateModelId { ref id }) if id == "1"
        ));
    }

    #[test]
    fn errors_name_the_source() {
        let bad = "ATOM      1  N   GLY A   1       1.0x0   2.000   3.000\n";
        let err = PdbFile::read_from(&mut Cursor::new(bad), "model.pdb").unwrap_err();
        assert!(err.to_string().starts_with("model.pdb: line 1:"));
    }

    #[test]
    fn input_errors_are_wrapped() {
        let bad = "ATOM      1  N   GLY A   1       1.0x0   2.000   3.000\n";
        let err = PdbFile::read_from(&mut Cursor::new(bad), "").unwrap_err();
        assert!(matches!(err, PdbError::Input(InputError::Record { line: 1, .. })));
    }
}
