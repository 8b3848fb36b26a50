use super::{CrystalSymmetry, FractionalizationMatrix, SymmetryError, UnitCell};
use crate::core::config::SymmetryConfig;
use crate::core::io::records::{Cryst1Record, RecordKind, ScaleRecord};
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

/// Derives the file's own symmetry: the first CRYST1 record of the
/// crystallographic section, else the first parsable CNS `REMARK sg=` line.
pub fn extract_self(
    crystallographic: &[String],
    remarks: &[String],
) -> Result<Option<CrystalSymmetry>, SymmetryError> {
    if let Some(line) = crystallographic
        .iter()
        .find(|l| RecordKind::classify(l) == RecordKind::Cryst1)
    {
        let record = Cryst1Record::parse(line)?;
        return Ok(Some(CrystalSymmetry::from_cryst1(&record)));
    }
    Ok(remarks
        .iter()
        .filter(|l| l.starts_with("REMARK sg="))
        .find_map(|l| CrystalSymmetry::from_cns_remark(l)))
}

/// Reconciles the file's own symmetry with one supplied by the caller, using
/// the default tolerances of [`SymmetryConfig`].
pub fn join(
    own: Option<CrystalSymmetry>,
    supplied: Option<CrystalSymmetry>,
    weak: bool,
) -> Result<Option<CrystalSymmetry>, SymmetryError> {
    let config = SymmetryConfig {
        weak,
        ..SymmetryConfig::default()
    };
    join_with_config(own, supplied, &config)
}

/// Reconciles two optional symmetries.
///
/// An absent side yields the other. When both are present and consistent
/// the file's own symmetry is returned, with unknown parts filled from the
/// supplied one. An inconsistent pair resolves to the file's own symmetry if
/// `config.weak` is set and is a [`SymmetryError::Conflict`] otherwise.
pub fn join_with_config(
    own: Option<CrystalSymmetry>,
    supplied: Option<CrystalSymmetry>,
    config: &SymmetryConfig,
) -> Result<Option<CrystalSymmetry>, SymmetryError> {
    let (own, supplied) = match (own, supplied) {
        (None, other) | (other, None) => return Ok(other),
        (Some(own), Some(supplied)) => (own, supplied),
    };
    let consistent = own.is_consistent_with(
        &supplied,
        config.relative_length_tolerance,
        config.absolute_angle_tolerance,
    );
    if !consistent {
        if !config.weak {
            return Err(SymmetryError::Conflict {
                own: own.to_string(),
                supplied: supplied.to_string(),
            });
        }
        debug!(%own, %supplied, "Weak symmetry: keeping the file's own symmetry");
    }
    Ok(Some(own.filled_from(&supplied)))
}

/// Collects SCALE1..3 into one matrix. A repeated row overrides the earlier
/// one.
pub fn scale_matrix(
    crystallographic: &[String],
) -> Result<Option<FractionalizationMatrix>, SymmetryError> {
    let mut rows: [Option<ScaleRecord>; 3] = [None, None, None];
    for line in crystallographic {
        if let RecordKind::Scale(n) = RecordKind::classify(line) {
            rows[usize::from(n) - 1] = Some(ScaleRecord::parse(line)?);
        }
    }
    match rows {
        [None, None, None] => Ok(None),
        [Some(r1), Some(r2), Some(r3)] => {
            let matrix = Matrix3::from_rows(&[
                Vector3::from(r1.matrix_row).transpose(),
                Vector3::from(r2.matrix_row).transpose(),
                Vector3::from(r3.matrix_row).transpose(),
            ]);
            let translation = Vector3::new(r1.translation, r2.translation, r3.translation);
            Ok(Some(FractionalizationMatrix {
                matrix,
                translation,
            }))
        }
        partial => Err(SymmetryError::IncompleteScaleSet {
            rows: partial.iter().flatten().map(|r| r.row).collect(),
        }),
    }
}

/// Decides whether the recorded SCALE matrix carries information beyond the
/// cell: `None` when it matches the cell-derived matrix within `tolerance`
/// per element and has a zero translation.
pub fn effective_scale_matrix(
    recorded: &FractionalizationMatrix,
    unit_cell: &UnitCell,
    tolerance: f64,
) -> Option<FractionalizationMatrix> {
    let computed = unit_cell.fractionalization_matrix();
    let matches = (recorded.matrix - computed).abs().max() < tolerance;
    if !matches {
        return Some(*recorded);
    }
    if recorded.translation == Vector3::zeros() {
        None
    } else {
        Some(FractionalizationMatrix {
            matrix: computed,
            translation: recorded.translation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRYST1: &str =
        "CRYST1   50.840   42.770   28.950  90.00  90.00  90.00 P 21 21 21    4";

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn orthorhombic(a: f64, group: &str) -> CrystalSymmetry {
        CrystalSymmetry::new(
            Some(UnitCell::new(a, 42.77, 28.95, 90.0, 90.0, 90.0).unwrap()),
            Some(group),
        )
    }

    #[test]
    fn extract_prefers_cryst1_over_cns_remark() {
        let remarks = lines(&[
            "REMARK sg= P1 a= 10 b= 10 c= 10 alpha= 90 beta= 90 gamma= 90",
        ]);
        let from_cryst1 = extract_self(&lines(&[CRYST1]), &remarks).unwrap().unwrap();
        assert_eq!(from_cryst1.space_group.as_deref(), Some("P 21 21 21"));

        let from_remark = extract_self(&[], &remarks).unwrap().unwrap();
        assert_eq!(from_remark.space_group.as_deref(), Some("P1"));

        assert!(extract_self(&[], &[]).unwrap().is_none());
    }

    #[test]
    fn join_returns_present_side() {
        let s = orthorhombic(50.84, "P 21 21 21");
        assert_eq!(join(None, Some(s.clone()), false).unwrap(), Some(s.clone()));
        assert_eq!(join(Some(s.clone()), None, false).unwrap(), Some(s));
        assert_eq!(join(None, None, false).unwrap(), None);
    }

    #[test]
    fn join_keeps_own_symmetry_when_consistent() {
        let own = orthorhombic(50.84, "P 21 21 21");
        let supplied = orthorhombic(50.9, "P212121");
        assert_eq!(join(Some(own.clone()), Some(supplied), false).unwrap(), Some(own));
    }

    #[test]
    fn join_conflict_depends_on_weak_flag() {
        let own = orthorhombic(50.84, "P 21 21 21");
        let supplied = orthorhombic(60.0, "P 21 21 21");
        assert!(matches!(
            join(Some(own.clone()), Some(supplied.clone()), false),
            Err(SymmetryError::Conflict { .. })
        ));
        assert_eq!(join(Some(own.clone()), Some(supplied), true).unwrap(), Some(own));
    }

    #[test]
    fn join_with_config_applies_configured_tolerances() {
        let own = orthorhombic(50.84, "P 21 21 21");
        let supplied = orthorhombic(53.0, "P 21 21 21");
        let strict = SymmetryConfig::default();
        assert!(matches!(
            join_with_config(Some(own.clone()), Some(supplied.clone()), &strict),
            Err(SymmetryError::Conflict { .. })
        ));

        let loose = SymmetryConfig {
            relative_length_tolerance: 0.1,
            ..SymmetryConfig::default()
        };
        assert_eq!(
            join_with_config(Some(own.clone()), Some(supplied.clone()), &loose).unwrap(),
            Some(own.clone())
        );

        let weak = SymmetryConfig {
            weak: true,
            ..SymmetryConfig::default()
        };
        assert_eq!(
            join_with_config(Some(own.clone()), Some(supplied), &weak).unwrap(),
            Some(own)
        );
    }

    #[test]
    fn join_fills_unknown_parts() {
        let own = CrystalSymmetry::new(None, Some("P 1"));
        let supplied = orthorhombic(50.84, "P 1");
        let joined = join(Some(own), Some(supplied.clone()), false).unwrap().unwrap();
        assert_eq!(joined.unit_cell, supplied.unit_cell);
    }

    #[test]
    fn scale_matrix_requires_all_three_rows() {
        let complete = lines(&[
            "SCALE1      0.019670  0.000000  0.000000        0.00000",
            "SCALE2      0.000000  0.023381  0.000000        0.00000",
            "SCALE3      0.000000  0.000000  0.034542        0.00000",
        ]);
        let m = scale_matrix(&complete).unwrap().unwrap();
        assert_eq!(m.matrix[(1, 1)], 0.023381);
        assert_eq!(m.translation, Vector3::zeros());

        assert!(scale_matrix(&[]).unwrap().is_none());
        match scale_matrix(&complete[..2]) {
            Err(SymmetryError::IncompleteScaleSet { rows }) => assert_eq!(rows, [1, 2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_scale_row_overrides_earlier_one() {
        let mut repeated = lines(&[
            "SCALE1      0.019670  0.000000  0.000000        0.00000",
            "SCALE2      0.000000  0.023381  0.000000        0.00000",
            "SCALE3      0.000000  0.000000  0.034542        0.00000",
        ]);
        repeated.push("SCALE1      0.500000  0.000000  0.000000        0.00000".into());
        let m = scale_matrix(&repeated).unwrap().unwrap();
        assert_eq!(m.matrix[(0, 0)], 0.5);
    }

    #[test]
    fn effective_scale_matrix_drops_redundant_records() {
        let cell = UnitCell::new(50.84, 42.77, 28.95, 90.0, 90.0, 90.0).unwrap();
        let exact = FractionalizationMatrix::from_unit_cell(&cell);
        assert!(effective_scale_matrix(&exact, &cell, 1e-6).is_none());

        let mut shifted = exact;
        shifted.translation = Vector3::new(0.5, 0.0, 0.0);
        let kept = effective_scale_matrix(&shifted, &cell, 1e-6).unwrap();
        assert_eq!(kept.translation, shifted.translation);

        let mut different = exact;
        different.matrix[(0, 0)] += 1e-3;
        assert_eq!(effective_scale_matrix(&different, &cell, 1e-6), Some(different));
    }
}
