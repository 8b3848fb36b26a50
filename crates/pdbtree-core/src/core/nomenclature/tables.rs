//! Static nucleic-acid nomenclature tables.

use phf::{Map, Set, phf_map, phf_set};

/// Residue spellings mapped to the reference nucleotide. `?X` means "RNA or
/// DNA, decided by the atoms present".
pub static REFERENCE_RESIDUE_NAMES: Map<&'static str, &'static str> = phf_map! {
    "A" => "?A", "C" => "?C", "G" => "?G", "U" => "U", "T" => "DT",
    "+A" => "?A", "+C" => "?C", "+G" => "?G", "+U" => "U", "+T" => "DT",
    "DA" => "DA", "DC" => "DC", "DG" => "DG", "DT" => "DT",
    "ADE" => "?A", "CYT" => "?C", "GUA" => "?G", "URI" => "U", "THY" => "DT",
    "AR" => "A", "CR" => "C", "GR" => "G", "UR" => "U",
    "AD" => "DA", "CD" => "DC", "GD" => "DG", "TD" => "DT",
};

/// Residue names written by CNS.
pub static CNS_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ADE", "CYT", "GUA", "THY", "URI",
};

/// Monomer-library residue names. A single unexpected atom under one of these
/// names is not interpreted at all.
pub static MONOMER_LIBRARY_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "AD", "AR", "CD", "CR", "GD", "GR", "TD", "UR",
};

pub static REFERENCE_TO_MONOMER_LIBRARY_RESIDUE: Map<&'static str, &'static str> = phf_map! {
    "A" => "AR", "C" => "CR", "G" => "GR", "U" => "UR",
    "DA" => "AD", "DC" => "CD", "DG" => "GD", "DT" => "TD",
};

/// Reference atom slots mapped to monomer-library atom names. `" H2'"`
/// depends on the residue and `"HOP3"` has no monomer-library name.
#[rustfmt::skip]
pub static REFERENCE_TO_MONOMER_LIBRARY_ATOM: Map<&'static str, &'static str> = phf_map! {
    // --- Sugar ---
    " C1'" => "C1*", " C2'" => "C2*", " C3'" => "C3*", " C4'" => "C4*", " C5'" => "C5*",
    " O2'" => "O2*", " O3'" => "O3*", " O4'" => "O4*", " O5'" => "O5*",
    " H1'" => "H1*", " H3'" => "H3*", " H4'" => "H4*", " H5'" => "H5*1",
    "H2''" => "H2*2", "H5''" => "H5*2",
    "HO2'" => "HO2*", "HO3'" => "HO3*", "HO5'" => "HO5*",

    // --- Phosphate ---
    " P  " => "P", " OP1" => "O1P", " OP2" => "O2P", " OP3" => "O3T",

    // --- Bases ---
    " C2 " => "C2", " C4 " => "C4", " C5 " => "C5", " C6 " => "C6", " C7 " => "C5M", " C8 " => "C8",
    " N1 " => "N1", " N2 " => "N2", " N3 " => "N3", " N4 " => "N4", " N6 " => "N6", " N7 " => "N7",
    " N9 " => "N9", " O2 " => "O2", " O4 " => "O4", " O6 " => "O6",
    " H1 " => "H1", " H2 " => "H2", " H3 " => "H3", " H5 " => "H5", " H6 " => "H6", " H8 " => "H8",
    " H21" => "H21", " H22" => "H22", " H41" => "H41", " H42" => "H42",
    " H61" => "H61", " H62" => "H62", " H71" => "H5M1", " H72" => "H5M2", " H73" => "H5M3",
};

/// Legacy and monomer-library atom spellings with their reference names,
/// applied after `*` has been replaced by `'`.
pub static LEGACY_ATOM_NAMES: Map<&'static str, &'static str> = phf_map! {
    "O1P" => "OP1", "O2P" => "OP2", "O3P" => "OP3", "O3T" => "OP3",
    "C5M" => "C7", "H5M1" => "H71", "H5M2" => "H72", "H5M3" => "H73",
    "H5'1" => "H5'", "H5'2" => "H5''", "H2'1" => "H2'", "H2'2" => "H2''",
    "H5T" => "HO5'", "H3T" => "HO3'",
};

const PHOSPHATE: &[&str] = &[" P  ", " OP1", " OP2", " OP3", "HOP3"];
const SUGAR: &[&str] = &[
    " O5'", " C5'", " C4'", " O4'", " C3'", " O3'", " C2'", " C1'",
    " H5'", "H5''", " H4'", " H3'", " H2'", " H1'", "HO3'", "HO5'",
];
const RIBOSE_EXTRA: &[&str] = &[" O2'", "HO2'"];
const DEOXYRIBOSE_EXTRA: &[&str] = &["H2''"];

const ADENINE: &[&str] = &[
    " N9 ", " C8 ", " N7 ", " C5 ", " C6 ", " N6 ", " N1 ", " C2 ", " N3 ", " C4 ",
    " H8 ", " H61", " H62", " H2 ",
];
const GUANINE: &[&str] = &[
    " N9 ", " C8 ", " N7 ", " C5 ", " C6 ", " O6 ", " N1 ", " C2 ", " N2 ", " N3 ", " C4 ",
    " H8 ", " H1 ", " H21", " H22",
];
const CYTOSINE: &[&str] = &[
    " N1 ", " C2 ", " O2 ", " N3 ", " C4 ", " N4 ", " C5 ", " C6 ", " H41", " H42", " H5 ", " H6 ",
];
const URACIL: &[&str] = &[
    " N1 ", " C2 ", " O2 ", " N3 ", " C4 ", " O4 ", " C5 ", " C6 ", " H3 ", " H5 ", " H6 ",
];
const THYMINE: &[&str] = &[
    " N1 ", " C2 ", " O2 ", " N3 ", " C4 ", " O4 ", " C5 ", " C7 ", " C6 ",
    " H3 ", " H71", " H72", " H73", " H6 ",
];

/// Reference atom slots of a resolved nucleotide (`A`, `C`, `G`, `U`, `DA`,
/// `DC`, `DG`, `DT`), in backbone-sugar-base order.
pub fn reference_atoms(residue: &str) -> Option<Vec<&'static str>> {
    let (base, deoxy) = match residue {
        "A" => (ADENINE, false),
        "C" => (CYTOSINE, false),
        "G" => (GUANINE, false),
        "U" => (URACIL, false),
        "DA" => (ADENINE, true),
        "DC" => (CYTOSINE, true),
        "DG" => (GUANINE, true),
        "DT" => (THYMINE, true),
        _ => return None,
    };
    let extra = if deoxy { DEOXYRIBOSE_EXTRA } else { RIBOSE_EXTRA };
    Some(
        PHOSPHATE
            .iter()
            .chain(SUGAR)
            .chain(extra)
            .chain(base)
            .copied()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reference_atom_except_special_ones_has_a_monomer_library_name() {
        for residue in ["A", "C", "G", "U", "DA", "DC", "DG", "DT"] {
            for slot in reference_atoms(residue).unwrap() {
                let special = slot == " H2'" || slot == "HOP3";
                assert_eq!(
                    REFERENCE_TO_MONOMER_LIBRARY_ATOM.contains_key(slot),
                    !special,
                    "{residue} {slot:?}"
                );
            }
        }
    }

    #[test]
    fn reference_sets_distinguish_ribose_and_deoxyribose() {
        let rna = reference_atoms("A").unwrap();
        let dna = reference_atoms("DA").unwrap();
        assert!(rna.contains(&" O2'") && !dna.contains(&" O2'"));
        assert!(dna.contains(&"H2''") && !rna.contains(&"H2''"));
        assert!(reference_atoms("?A").is_none());
        assert!(reference_atoms("DT").unwrap().contains(&" C7 "));
    }

    #[test]
    fn monomer_library_residue_names_round_trip_through_reference_table() {
        for (reference, mon_lib) in REFERENCE_TO_MONOMER_LIBRARY_RESIDUE.entries() {
            assert!(MONOMER_LIBRARY_RESIDUE_NAMES.contains(*mon_lib));
            assert_eq!(REFERENCE_RESIDUE_NAMES.get(*mon_lib), Some(reference));
        }
    }
}
