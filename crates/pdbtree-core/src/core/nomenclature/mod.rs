//! Residue and atom name interpretation against reference nomenclature.
//!
//! Protein residues are handled by a [`ProteinInterpreter`]; nucleotides are
//! matched against PDB v3 reference atom sets and translated to
//! monomer-library names.

pub mod aliases;
pub mod interpreter;
pub mod nucleic;
pub mod protein;
pub mod tables;

pub use aliases::ResidueAliasTable;
pub use interpreter::ResidueNameInterpreter;
pub use protein::{AminoAcidAliasInterpreter, ProteinInterpreter};

use serde::Deserialize;

/// Whether CNS nucleotide names (ADE, CYT, GUA, THY, URI) are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CnsTranslation {
    /// Interpret only if every atom name matches.
    #[default]
    Auto,
    Always,
    Never,
}

/// The name an atom receives in the target nomenclature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetName {
    Name(String),
    /// The reference name is known but has no target spelling.
    UnmatchedByTarget,
    /// No reference name was matched.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapping {
    pub reported: String,
    /// 4-character reference slot, e.g. `" C1'"`.
    pub reference: Option<String>,
    pub target: TargetName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueInterpretation {
    pub work_residue_name: String,
    /// One entry per reported atom name, in input order.
    pub mappings: Vec<NameMapping>,
}

impl ResidueInterpretation {
    /// Reported names that matched no reference atom.
    pub fn unmatched(&self) -> Vec<&str> {
        self.mappings
            .iter()
            .filter(|m| m.reference.is_none())
            .map(|m| m.reported.as_str())
            .collect()
    }

    pub fn n_unmatched(&self) -> usize {
        self.mappings.iter().filter(|m| m.reference.is_none()).count()
    }
}
