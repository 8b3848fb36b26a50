//! Crystal symmetry extracted from CRYST1, SCALEn and CNS remark records.

mod format;
mod reconcile;
mod unit_cell;

pub use format::{format_cryst1, format_cryst1_and_scale_records, format_scale_records};
pub use reconcile::{effective_scale_matrix, extract_self, join, join_with_config, scale_matrix};
pub use unit_cell::UnitCell;

use crate::core::io::records::{Cryst1Record, RecordError};
use nalgebra::{Matrix3, Vector3};
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SymmetryError {
    #[error("Crystal symmetry conflict: file has {own}, supplied {supplied}")]
    Conflict { own: String, supplied: String },
    #[error("Incomplete set of PDB SCALE records (found rows {rows:?})")]
    IncompleteScaleSet { rows: Vec<u8> },
    #[error("Invalid unit cell {parameters:?}: {reason}")]
    InvalidUnitCell {
        parameters: [f64; 6],
        reason: &'static str,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Unit cell and space group, either of which may be unknown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrystalSymmetry {
    pub unit_cell: Option<UnitCell>,
    pub space_group: Option<String>,
}

const PLACEHOLDER_CELL: [f64; 6] = [1.0, 1.0, 1.0, 90.0, 90.0, 90.0];

impl CrystalSymmetry {
    pub fn new(unit_cell: Option<UnitCell>, space_group: Option<&str>) -> Self {
        Self {
            unit_cell,
            space_group: space_group
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit_cell.is_none() && self.space_group.is_none()
    }

    /// Interprets a CRYST1 record. A blank space group, an all-zero cell and
    /// the `1 1 1 90 90 90 P 1` placeholder are all read as unknown.
    pub fn from_cryst1(record: &Cryst1Record) -> Self {
        let symbol = record.space_group.trim();
        if record.cell == PLACEHOLDER_CELL && normalize_space_group(symbol) == "P1" {
            return Self::default();
        }
        let unit_cell = if record.cell.iter().all(|&v| v == 0.0) {
            None
        } else {
            match UnitCell::from_parameters(record.cell) {
                Ok(cell) => Some(cell),
                Err(e) => {
                    warn!(error = %e, "Ignoring CRYST1 unit cell");
                    None
                }
            }
        };
        Self::new(unit_cell, Some(symbol))
    }

    /// Parses a CNS `REMARK sg= ... a= ... gamma= ...` line.
    pub fn from_cns_remark(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("REMARK")?;
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let lookup = |key: &str| {
            tokens
                .iter()
                .position(|&t| t == key)
                .and_then(|i| tokens.get(i + 1).copied())
        };
        let symbol: String = lookup("sg=")?
            .chars()
            .filter(|&c| c != '(' && c != ')')
            .collect();
        let mut parameters = [0.0; 6];
        for (value, key) in parameters
            .iter_mut()
            .zip(["a=", "b=", "c=", "alpha=", "beta=", "gamma="])
        {
            *value = lookup(key)?.parse().ok()?;
        }
        let unit_cell = UnitCell::from_parameters(parameters).ok()?;
        Some(Self::new(Some(unit_cell), Some(&symbol)))
    }

    /// Whether every part known on both sides agrees.
    pub fn is_consistent_with(
        &self,
        other: &CrystalSymmetry,
        relative_length_tolerance: f64,
        absolute_angle_tolerance: f64,
    ) -> bool {
        let cells_agree = match (&self.unit_cell, &other.unit_cell) {
            (Some(a), Some(b)) => {
                a.is_similar_to(b, relative_length_tolerance, absolute_angle_tolerance)
            }
            _ => true,
        };
        let groups_agree = match (&self.space_group, &other.space_group) {
            (Some(a), Some(b)) => normalize_space_group(a) == normalize_space_group(b),
            _ => true,
        };
        cells_agree && groups_agree
    }

    /// Fills the parts missing from `self` with those of `other`.
    pub fn filled_from(mut self, other: &CrystalSymmetry) -> Self {
        if self.unit_cell.is_none() {
            self.unit_cell = other.unit_cell;
        }
        if self.space_group.is_none() {
            self.space_group = other.space_group.clone();
        }
        self
    }
}

impl fmt::Display for CrystalSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit_cell {
            Some(cell) => {
                let [a, b, c, alpha, beta, gamma] = cell.parameters();
                write!(f, "({a}, {b}, {c}, {alpha}, {beta}, {gamma})")?;
            }
            None => write!(f, "(unknown cell)")?,
        }
        write!(f, " {}", self.space_group.as_deref().unwrap_or("(unknown space group)"))
    }
}

/// Space-group text with whitespace removed, upper-cased.
pub fn normalize_space_group(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The matrix and translation of the three SCALEn records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalizationMatrix {
    pub matrix: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl FractionalizationMatrix {
    pub fn from_unit_cell(cell: &UnitCell) -> Self {
        Self {
            matrix: cell.fractionalization_matrix(),
            translation: Vector3::zeros(),
        }
    }
}
