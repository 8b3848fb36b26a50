use super::{NameMapping, ResidueInterpretation, TargetName};
use crate::core::io::records::AtomName;
use phf::{Map, phf_map};

/// Interprets atom names of protein residues. Consulted before any nucleotide
/// interpretation.
pub trait ProteinInterpreter {
    fn recognizes(&self, residue_name: &str) -> bool;

    /// Returns `None` if `residue_name` is not a protein residue known to this
    /// interpreter.
    fn interpret(&self, residue_name: &str, atom_names: &[&str]) -> Option<ResidueInterpretation>;
}

const BACKBONE_ATOMS: &[&str] = &["N", "CA", "C", "O", "OXT", "H", "H1", "H2", "H3", "HXT"];

/// Side-chain and alpha atoms of the standard amino acids in PDB v3 names.
#[rustfmt::skip]
static SIDE_CHAIN_ATOMS: Map<&'static str, &'static str> = phf_map! {
    "ALA" => "HA CB HB1 HB2 HB3",
    "ARG" => "HA CB CG CD NE CZ NH1 NH2 HB2 HB3 HG2 HG3 HD2 HD3 HE HH11 HH12 HH21 HH22",
    "ASN" => "HA CB CG OD1 ND2 HB2 HB3 HD21 HD22",
    "ASP" => "HA CB CG OD1 OD2 HB2 HB3 HD2",
    "CYS" => "HA CB SG HB2 HB3 HG",
    "GLN" => "HA CB CG CD OE1 NE2 HB2 HB3 HG2 HG3 HE21 HE22",
    "GLU" => "HA CB CG CD OE1 OE2 HB2 HB3 HG2 HG3 HE2",
    "GLY" => "HA2 HA3",
    "HIS" => "HA CB CG ND1 CD2 CE1 NE2 HB2 HB3 HD1 HD2 HE1 HE2",
    "ILE" => "HA CB CG1 CG2 CD1 HB HG12 HG13 HG21 HG22 HG23 HD11 HD12 HD13",
    "LEU" => "HA CB CG CD1 CD2 HB2 HB3 HG HD11 HD12 HD13 HD21 HD22 HD23",
    "LYS" => "HA CB CG CD CE NZ HB2 HB3 HG2 HG3 HD2 HD3 HE2 HE3 HZ1 HZ2 HZ3",
    "MET" => "HA CB CG SD CE HB2 HB3 HG2 HG3 HE1 HE2 HE3",
    "MSE" => "HA CB CG SE CE HB2 HB3 HG2 HG3 HE1 HE2 HE3",
    "PHE" => "HA CB CG CD1 CD2 CE1 CE2 CZ HB2 HB3 HD1 HD2 HE1 HE2 HZ",
    "PRO" => "HA CB CG CD HB2 HB3 HG2 HG3 HD2 HD3",
    "SER" => "HA CB OG HB2 HB3 HG",
    "THR" => "HA CB OG1 CG2 HB HG1 HG21 HG22 HG23",
    "TRP" => "HA CB CG CD1 CD2 NE1 CE2 CE3 CZ2 CZ3 CH2 HB2 HB3 HD1 HE1 HE3 HZ2 HZ3 HH2",
    "TYR" => "HA CB CG CD1 CD2 CE1 CE2 CZ OH HB2 HB3 HD1 HD2 HE1 HE2 HH",
    "VAL" => "HA CB CG1 CG2 HB HG11 HG12 HG13 HG21 HG22 HG23",
};

/// Legacy spellings that are not simple digit rotations.
pub static ATOM_NAME_ALIASES: Map<&'static str, &'static str> = phf_map! {
    // --- Backbone ---
    "HN" => "H", "HCA" => "HA",

    // --- N-Terminus ---
    "HT1" => "H1", "HT2" => "H2", "HT3" => "H3", "HN1" => "H1", "HN2" => "H2", "HN3" => "H3",

    // --- C-Terminus ---
    "OT1" => "O", "OT2" => "OXT", "HOXT" => "HXT",
};

/// Moves a leading digit to the end: `1HB` becomes `HB1`, `2HG1` becomes
/// `HG12`.
fn rotate_leading_digit(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next().filter(char::is_ascii_digit)?;
    let rest = chars.as_str();
    rest.starts_with('H').then(|| format!("{rest}{first}"))
}

/// Residue-specific names in PDB v3 spelling.
fn reference_names(residue_name: &str) -> Option<Vec<&'static str>> {
    let side_chain = SIDE_CHAIN_ATOMS.get(residue_name)?;
    Some(
        BACKBONE_ATOMS
            .iter()
            .copied()
            .chain(side_chain.split_whitespace())
            .collect(),
    )
}

/// Maps a legacy hydrogen name to the v3 name of `residue`.
///
/// Methylene hydrogens numbered 1/2 in old files are numbered 2/3 in v3; a
/// stem without a `1` member but with a `3` member is shifted by one.
fn canonical_name(reported: &str, names: &[&'static str]) -> String {
    let upper = reported.trim().to_ascii_uppercase();
    if let Some(alias) = ATOM_NAME_ALIASES.get(upper.as_str()) {
        return (*alias).to_string();
    }
    let Some(rotated) = rotate_leading_digit(&upper) else {
        return upper;
    };
    let (stem, digit) = rotated.split_at(rotated.len() - 1);
    let has = |suffix: char| names.iter().any(|n| *n == format!("{stem}{suffix}"));
    let shifted = match digit {
        "1" | "2" if !has('1') && has('3') => {
            let next = if digit == "1" { '2' } else { '3' };
            Some(format!("{stem}{next}"))
        }
        _ => None,
    };
    shifted.unwrap_or(rotated)
}

/// Recognizes the standard amino acids (and selenomethionine) and maps
/// legacy atom names to PDB v3 names.
#[derive(Debug, Clone, Copy, Default)]
pub struct AminoAcidAliasInterpreter;

impl ProteinInterpreter for AminoAcidAliasInterpreter {
    fn recognizes(&self, residue_name: &str) -> bool {
        SIDE_CHAIN_ATOMS.contains_key(residue_name)
    }

    fn interpret(&self, residue_name: &str, atom_names: &[&str]) -> Option<ResidueInterpretation> {
        let names = reference_names(residue_name)?;
        let mut used = vec![false; names.len()];
        let mappings = atom_names
            .iter()
            .map(|reported| {
                let canonical = canonical_name(reported, &names);
                let hit = names
                    .iter()
                    .enumerate()
                    .find(|&(i, name)| !used[i] && *name == canonical.as_str())
                    .map(|(i, _)| i);
                match hit {
                    Some(i) => {
                        used[i] = true;
                        NameMapping {
                            reported: (*reported).to_string(),
                            reference: Some(AtomName::new(names[i]).slot().to_string()),
                            target: TargetName::Name(names[i].to_string()),
                        }
                    }
                    None => NameMapping {
                        reported: (*reported).to_string(),
                        reference: None,
                        target: TargetName::Unmatched,
                    },
                }
            })
            .collect();
        Some(ResidueInterpretation {
            work_residue_name: residue_name.to_string(),
            mappings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(residue: &str, names: &[&str]) -> Vec<Option<String>> {
        AminoAcidAliasInterpreter
            .interpret(residue, names)
            .unwrap()
            .mappings
            .into_iter()
            .map(|m| match m.target {
                TargetName::Name(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unknown_residues_are_not_interpreted() {
        assert!(AminoAcidAliasInterpreter.interpret("HOH", &["O"]).is_none());
        assert!(!AminoAcidAliasInterpreter.recognizes("DA"));
        assert!(AminoAcidAliasInterpreter.recognizes("GLY"));
    }

    #[test]
    fn backbone_aliases_map_to_v3_names() {
        assert_eq!(
            targets("ALA", &["HN", "OT1", "OT2", " CA "]),
            [Some("H".into()), Some("O".into()), Some("OXT".into()), Some("CA".into())]
        );
    }

    #[test]
    fn methyl_hydrogens_keep_their_numbers() {
        assert_eq!(
            targets("ALA", &["1HB", "2HB", "3HB"]),
            [Some("HB1".into()), Some("HB2".into()), Some("HB3".into())]
        );
    }

    #[test]
    fn methylene_hydrogens_shift_to_two_and_three() {
        assert_eq!(
            targets("SER", &["1HB", "2HB"]),
            [Some("HB2".into()), Some("HB3".into())]
        );
        assert_eq!(
            targets("ILE", &["1HG1", "2HG1", "1HG2"]),
            [Some("HG12".into()), Some("HG13".into()), Some("HG21".into())]
        );
        assert_eq!(
            targets("GLY", &["1HA", "2HA"]),
            [Some("HA2".into()), Some("HA3".into())]
        );
    }

    #[test]
    fn duplicate_and_foreign_names_are_unmatched() {
        let result = AminoAcidAliasInterpreter
            .interpret("GLY", &["CA", "CA", "CB"])
            .unwrap();
        assert_eq!(result.unmatched(), ["CA", "CB"]);
        assert_eq!(result.mappings[0].reference.as_deref(), Some(" CA "));
    }
}
