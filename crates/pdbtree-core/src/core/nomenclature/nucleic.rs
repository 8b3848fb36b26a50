use super::tables::{LEGACY_ATOM_NAMES, REFERENCE_TO_MONOMER_LIBRARY_ATOM, reference_atoms};
use super::{NameMapping, TargetName};
use crate::core::io::records::AtomName;

/// Rewrites a reported nucleotide atom name as a reference slot: `*` becomes
/// `'` and legacy spellings are replaced.
pub fn normalize_atom_name(name: &str) -> String {
    let primed = name.trim().to_ascii_uppercase().replace('*', "'");
    let reference = LEGACY_ATOM_NAMES
        .get(primed.as_str())
        .copied()
        .unwrap_or(primed.as_str());
    AtomName::new(reference).slot().to_string()
}

/// Resolves `?A`, `?C` and `?G` to RNA if a 2'-hydroxyl is present and to
/// DNA otherwise.
pub fn resolve_residue_name(reference: &str, normalized: &[String]) -> String {
    match reference.strip_prefix('?') {
        Some(base) => {
            let has_hydroxyl = normalized.iter().any(|n| n == " O2'" || n == "HO2'");
            if has_hydroxyl {
                base.to_string()
            } else {
                format!("D{base}")
            }
        }
        None if reference == "T" => "DT".to_string(),
        None => reference.to_string(),
    }
}

/// Monomer-library atom name for a reference slot of `residue`.
pub fn monomer_library_atom_name(reference: &str, residue: &str) -> TargetName {
    if let Some(name) = REFERENCE_TO_MONOMER_LIBRARY_ATOM.get(reference) {
        return TargetName::Name((*name).to_string());
    }
    match reference {
        " H2'" if residue.starts_with('D') => TargetName::Name("H2*1".to_string()),
        " H2'" => TargetName::Name("H2*".to_string()),
        _ => TargetName::UnmatchedByTarget,
    }
}

/// Nucleotide atom names matched against one resolved reference residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NucleicMatch {
    pub residue_name: String,
    pub mappings: Vec<NameMapping>,
}

impl NucleicMatch {
    pub fn n_unmatched(&self) -> usize {
        self.mappings.iter().filter(|m| m.reference.is_none()).count()
    }
}

/// Matches `atom_names` against the reference residue `reference` (`?A`,
/// `DT`, ...). Each reference slot is used at most once; later duplicates
/// stay unmatched.
pub fn match_atom_names(reference: &str, atom_names: &[&str]) -> NucleicMatch {
    let normalized: Vec<String> = atom_names.iter().map(|n| normalize_atom_name(n)).collect();
    let residue_name = resolve_residue_name(reference, &normalized);
    let slots = reference_atoms(&residue_name).unwrap_or_default();
    let mut used = vec![false; slots.len()];

    let mappings = atom_names
        .iter()
        .zip(&normalized)
        .map(|(reported, name)| {
            let hit = slots
                .iter()
                .enumerate()
                .position(|(i, slot)| !used[i] && *slot == name.as_str());
            match hit {
                Some(i) => {
                    used[i] = true;
                    NameMapping {
                        reported: (*reported).to_string(),
                        reference: Some(slots[i].to_string()),
                        target: monomer_library_atom_name(slots[i], &residue_name),
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

    NucleicMatch {
        residue_name,
        mappings,
    }
}
