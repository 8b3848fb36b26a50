use super::ids::{AtomId, ChainId, ConformerId, ResidueGroupId};
use std::fmt;

/// Sequence number plus insertion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub resseq: i64,
    pub icode: char,
}

impl ResidueKey {
    pub fn new(resseq: i64, icode: char) -> Self {
        Self { resseq, icode }
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.icode == ' ' {
            write!(f, "{}", self.resseq)
        } else {
            write!(f, "{}{}", self.resseq, self.icode)
        }
    }
}

/// All consecutive atoms of one chain sharing a residue key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueGroup {
    pub key: ResidueKey,
    pub chain_id: ChainId,
    /// `false` when a chain break was recorded immediately before this group.
    pub link_to_previous: bool,
    pub(crate) conformers: Vec<ConformerId>,
}

impl ResidueGroup {
    pub(crate) fn new(key: ResidueKey, chain_id: ChainId, link_to_previous: bool) -> Self {
        Self {
            key,
            chain_id,
            link_to_previous,
            conformers: Vec::new(),
        }
    }

    pub fn conformers(&self) -> &[ConformerId] {
        &self.conformers
    }
}

/// The atoms of a residue group carrying one alternate-location label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conformer {
    /// Alternate-location label; `' '` is the default (blank) label.
    pub altloc: char,
    pub resname: String,
    pub residue_group_id: ResidueGroupId,
    pub(crate) atoms: Vec<AtomId>,
}

impl Conformer {
    pub(crate) fn new(altloc: char, resname: &str, residue_group_id: ResidueGroupId) -> Self {
        Self {
            altloc,
            resname: resname.to_string(),
            residue_group_id,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn is_blank_altloc(&self) -> bool {
        self.altloc == ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residue_key_display_includes_insertion_code() {
        assert_eq!(ResidueKey::new(12, ' ').to_string(), "12");
        assert_eq!(ResidueKey::new(-3, 'A').to_string(), "-3A");
    }

    #[test]
    fn residue_keys_order_by_number_then_icode() {
        assert!(ResidueKey::new(1, 'B') < ResidueKey::new(2, ' '));
        assert!(ResidueKey::new(2, ' ') < ResidueKey::new(2, 'A'));
    }
}
