use super::aliases::ResidueAliasTable;
use super::nucleic;
use super::protein::{AminoAcidAliasInterpreter, ProteinInterpreter};
use super::tables::{
    CNS_RESIDUE_NAMES, MONOMER_LIBRARY_RESIDUE_NAMES, REFERENCE_RESIDUE_NAMES,
    REFERENCE_TO_MONOMER_LIBRARY_RESIDUE,
};
use super::{CnsTranslation, ResidueInterpretation};
use crate::core::config::{ConfigError, InterpretationConfig};
use tracing::{debug, instrument};

/// Combines a protein interpreter with the nucleotide tables.
pub struct ResidueNameInterpreter {
    protein: Box<dyn ProteinInterpreter>,
    aliases: ResidueAliasTable,
    cns_translation: CnsTranslation,
    monomer_library_names: bool,
}

impl Default for ResidueNameInterpreter {
    fn default() -> Self {
        Self::new(Box::new(AminoAcidAliasInterpreter), &InterpretationConfig::default())
    }
}

impl ResidueNameInterpreter {
    pub fn new(protein: Box<dyn ProteinInterpreter>, config: &InterpretationConfig) -> Self {
        Self {
            protein,
            aliases: ResidueAliasTable::default(),
            cns_translation: config.cns_translation,
            monomer_library_names: config.monomer_library_names,
        }
    }

    /// Builds the default interpreter, loading the alias table named by
    /// `config` if any.
    pub fn from_config(config: &InterpretationConfig) -> Result<Self, ConfigError> {
        let mut interpreter = Self::new(Box::new(AminoAcidAliasInterpreter), config);
        if let Some(path) = &config.alias_table_path {
            interpreter.aliases = ResidueAliasTable::load_csv(path)?;
        }
        Ok(interpreter)
    }

    pub fn with_aliases(mut self, aliases: ResidueAliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    fn resolve_alias(&self, name: String) -> String {
        if self.protein.recognizes(&name) || REFERENCE_RESIDUE_NAMES.contains_key(name.as_str()) {
            return name;
        }
        match self.aliases.get(&name) {
            Some(canonical) => canonical.to_string(),
            None => name,
        }
    }

    /// Interprets `atom_names` of one residue.
    ///
    /// Returns `None` for a blank or unknown residue name, for CNS names that
    /// the configured [`CnsTranslation`] excludes, and for a single unexpected
    /// atom under a monomer-library name.
    #[instrument(skip_all, fields(residue = residue_name))]
    pub fn interpret(
        &self,
        residue_name: &str,
        atom_names: &[&str],
    ) -> Option<ResidueInterpretation> {
        let work = residue_name.trim().to_ascii_uppercase();
        if work.is_empty() {
            return None;
        }
        let work = self.resolve_alias(work);

        if let Some(result) = self.protein.interpret(&work, atom_names) {
            return Some(result);
        }

        let is_cns = CNS_RESIDUE_NAMES.contains(work.as_str());
        if is_cns && self.cns_translation == CnsTranslation::Never {
            return None;
        }
        let reference = REFERENCE_RESIDUE_NAMES.get(work.as_str())?;
        let matched = nucleic::match_atom_names(reference, atom_names);

        if matched.n_unmatched() != 0 {
            if atom_names.len() == 1 && MONOMER_LIBRARY_RESIDUE_NAMES.contains(work.as_str()) {
                debug!("Single unexpected atom under a monomer-library name; not interpreted");
                return None;
            }
            if is_cns && self.cns_translation == CnsTranslation::Auto {
                debug!(
                    unmatched = matched.n_unmatched(),
                    "CNS residue name with unexpected atoms; not interpreted"
                );
                return None;
            }
        }

        let mut work_residue_name = matched.residue_name;
        if self.monomer_library_names {
            if let Some(name) = REFERENCE_TO_MONOMER_LIBRARY_RESIDUE.get(work_residue_name.as_str()) {
                work_residue_name = (*name).to_string();
            }
        }
        Some(ResidueInterpretation {
            work_residue_name,
            mappings: matched.mappings,
        })
    }
}
