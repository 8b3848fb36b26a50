use super::{CrystalSymmetry, FractionalizationMatrix, UnitCell};
use crate::core::io::records::{Cryst1Record, RecordError, ScaleRecord};

/// Formats a CRYST1 record; unknown parts are written as the unit cube and
/// `P 1`.
pub fn format_cryst1(symmetry: &CrystalSymmetry, z: Option<i64>) -> Result<String, RecordError> {
    let cell = symmetry.unit_cell.unwrap_or_else(UnitCell::unit_cube);
    Cryst1Record {
        cell: cell.parameters(),
        space_group: symmetry
            .space_group
            .clone()
            .unwrap_or_else(|| "P 1".to_string()),
        z,
    }
    .format()
}

pub fn format_scale_records(matrix: &FractionalizationMatrix) -> Result<Vec<String>, RecordError> {
    (0..3)
        .map(|i| {
            let row = matrix.matrix.row(i);
            ScaleRecord {
                row: i as u8 + 1,
                matrix_row: [row[0], row[1], row[2]],
                translation: matrix.translation[i],
            }
            .format()
        })
        .collect()
}

/// CRYST1 followed, if requested, by SCALE records derived from the same
/// cell.
pub fn format_cryst1_and_scale_records(
    symmetry: &CrystalSymmetry,
    z: Option<i64>,
    write_scale_records: bool,
) -> Result<Vec<String>, RecordError> {
    let mut lines = vec![format_cryst1(symmetry, z)?];
    if write_scale_records {
        let cell = symmetry.unit_cell.unwrap_or_else(UnitCell::unit_cube);
        lines.extend(format_scale_records(
            &FractionalizationMatrix::from_unit_cell(&cell),
        )?);
    }
    Ok(lines)
}
