use super::ids::ConformerId;
use crate::core::io::records::{AtomName, AtomRecord};
use nalgebra::Point3;

/// An atom as stored in a [`Hierarchy`](super::hierarchy::Hierarchy).
///
/// Residue-level labels (altloc, resname, residue key, chain id) are not
/// duplicated here; they belong to the owning conformer, residue group and
/// chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom serial number; may exceed the five-digit decimal range.
    pub serial: i64,
    /// The 4-character name slot (e.g. `" CA "`).
    pub name: AtomName,
    pub element: String,
    pub charge: String,
    pub segid: String,
    /// Orthogonal coordinates in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
    /// Isotropic displacement (B factor).
    pub b_iso: f64,
    /// Anisotropic displacement U11, U22, U33, U12, U13, U23 in square
    /// Angstroms, when an ANISOU record was present.
    pub uij: Option<[f64; 6]>,
    /// Whether the atom came from a HETATM record.
    pub hetero: bool,
    /// The conformer this atom belongs to.
    pub conformer_id: ConformerId,
}

impl Atom {
    pub(crate) fn from_record(
        record: &AtomRecord,
        uij: Option<[f64; 6]>,
        conformer_id: ConformerId,
    ) -> Self {
        Self {
            serial: record.labels.serial,
            name: record.labels.name.clone(),
            element: record.labels.element.clone(),
            charge: record.labels.charge.clone(),
            segid: record.labels.segid.clone(),
            position: record.position,
            occupancy: record.occupancy,
            b_iso: record.b_iso,
            uij,
            hetero: record.hetero,
            conformer_id,
        }
    }

    pub fn has_uij(&self) -> bool {
        self.uij.is_some()
    }
}
