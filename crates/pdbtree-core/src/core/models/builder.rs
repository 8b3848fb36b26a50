use super::atom::Atom;
use super::chain::{Chain, Model};
use super::hierarchy::Hierarchy;
use super::ids::{ChainId, ModelId, ResidueGroupId};
use super::residue::{Conformer, ResidueGroup, ResidueKey};
use crate::core::io::records::AtomRecord;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// An atom record together with the ANISOU data that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAtom {
    pub record: AtomRecord,
    pub uij: Option<[f64; 6]>,
}

impl From<AtomRecord> for ParsedAtom {
    fn from(record: AtomRecord) -> Self {
        Self { record, uij: None }
    }
}

/// Boundary index arrays over a flat atom sequence.
///
/// All indices refer to positions in the atom sequence. `model_ends` and
/// `chain_ends` hold exclusive end indices; `break_indices` holds the index of
/// the first atom after each BREAK record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomPartition {
    pub model_ids: Vec<String>,
    pub model_ends: Vec<usize>,
    /// One list per model.
    pub chain_ends: Vec<Vec<usize>>,
    pub break_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("Partition has {ids} model ids, {ends} model ends and {chains} chain lists")]
    LengthMismatch {
        ids: usize,
        ends: usize,
        chains: usize,
    },
    #[error("Model id '{id}' appears more than once")]
    DuplicateModelId { id: String },
    #[error("Model ends must be non-decreasing and cover all {atoms} atoms")]
    ModelEnds { atoms: usize },
    #[error("Chain ends of model {model} must increase inside the model and end at {end}")]
    ChainEnds { model: usize, end: usize },
    #[error("Break indices must be sorted and smaller than {atoms}")]
    BreakIndices { atoms: usize },
}

impl AtomPartition {
    /// A single unnamed model with chains ending at `chain_ends`.
    pub fn single_model(atom_count: usize, mut chain_ends: Vec<usize>) -> Self {
        if atom_count > 0 && chain_ends.last() != Some(&atom_count) {
            chain_ends.push(atom_count);
        }
        Self {
            model_ids: vec![String::new()],
            model_ends: vec![atom_count],
            chain_ends: vec![chain_ends],
            break_indices: Vec::new(),
        }
    }

    pub fn model_count(&self) -> usize {
        self.model_ids.len()
    }

    /// Checks that the arrays describe a consistent partition of `atom_count`
    /// atoms.
    pub fn validate(&self, atom_count: usize) -> Result<(), PartitionError> {
        let models = self.model_ids.len();
        if self.model_ends.len() != models || self.chain_ends.len() != models {
            return Err(PartitionError::LengthMismatch {
                ids: models,
                ends: self.model_ends.len(),
                chains: self.chain_ends.len(),
            });
        }
        let mut seen = HashSet::with_capacity(models);
        if let Some(id) = self.model_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(PartitionError::DuplicateModelId { id: id.clone() });
        }
        let covers_all = match self.model_ends.last() {
            Some(&last) => last == atom_count,
            None => atom_count == 0,
        };
        if !covers_all || self.model_ends.windows(2).any(|w| w[0] > w[1]) {
            return Err(PartitionError::ModelEnds { atoms: atom_count });
        }
        let mut start = 0;
        for (model, (&end, chains)) in self.model_ends.iter().zip(&self.chain_ends).enumerate() {
            let mut previous = start;
            for &chain_end in chains {
                if chain_end <= previous || chain_end > end {
                    return Err(PartitionError::ChainEnds { model, end });
                }
                previous = chain_end;
            }
            if previous != end {
                return Err(PartitionError::ChainEnds { model, end });
            }
            start = end;
        }
        let sorted = self.break_indices.windows(2).all(|w| w[0] <= w[1]);
        if !sorted || self.break_indices.iter().any(|&b| b >= atom_count) {
            return Err(PartitionError::BreakIndices { atoms: atom_count });
        }
        Ok(())
    }
}

/// Boundary flags computed for one atom during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomBoundary {
    pub model_index: usize,
    pub is_first_in_model: bool,
    pub is_first_in_chain: bool,
    pub is_first_after_break: bool,
}

/// Walks the partition once, keeping one cursor each for models, chains and
/// breaks.
pub fn annotate_boundaries(partition: &AtomPartition, atom_count: usize) -> Vec<AtomBoundary> {
    let mut flags = Vec::with_capacity(atom_count);
    let mut model = 0;
    let mut chain = 0;
    let mut brk = 0;
    for index in 0..atom_count {
        let mut is_first_in_model = index == 0;
        while model < partition.model_ends.len() && partition.model_ends[model] <= index {
            model += 1;
            chain = 0;
            is_first_in_model = true;
        }
        let mut is_first_in_chain = is_first_in_model;
        if let Some(ends) = partition.chain_ends.get(model) {
            while chain < ends.len() && ends[chain] <= index {
                chain += 1;
                is_first_in_chain = true;
            }
        }
        while brk < partition.break_indices.len() && partition.break_indices[brk] < index {
            brk += 1;
        }
        let is_first_after_break =
            brk < partition.break_indices.len() && partition.break_indices[brk] == index;
        if is_first_after_break {
            brk += 1;
        }
        flags.push(AtomBoundary {
            model_index: model,
            is_first_in_model,
            is_first_in_chain,
            is_first_after_break,
        });
    }
    flags
}

/// Folds a flat atom sequence into a [`Hierarchy`].
///
/// The builder owns the hierarchy under construction and the cursors of the
/// currently open model, chain and residue group.
pub struct HierarchyBuilder {
    hierarchy: Hierarchy,
    models: Vec<ModelId>,
    current_chain: Option<ChainId>,
    current_group: Option<ResidueGroupId>,
}

impl HierarchyBuilder {
    /// Builds the hierarchy for `atoms` partitioned by `partition`.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError`] if the index arrays do not describe
    /// `atoms.len()` atoms consistently.
    pub fn build(
        atoms: &[ParsedAtom],
        partition: &AtomPartition,
    ) -> Result<Hierarchy, PartitionError> {
        partition.validate(atoms.len())?;

        let mut builder = Self {
            hierarchy: Hierarchy::new(),
            models: Vec::with_capacity(partition.model_count()),
            current_chain: None,
            current_group: None,
        };
        for id in &partition.model_ids {
            let model_id = builder.hierarchy.insert_model(Model::new(id));
            builder.models.push(model_id);
        }

        let boundaries = annotate_boundaries(partition, atoms.len());
        for (atom, boundary) in atoms.iter().zip(boundaries) {
            builder.push(atom, boundary);
        }

        let counts = builder.hierarchy.overall_counts();
        debug!(
            models = counts.models,
            chains = counts.chains,
            residue_groups = counts.residue_groups,
            atoms = counts.atoms,
            "Hierarchy built"
        );
        Ok(builder.hierarchy)
    }

    fn push(&mut self, atom: &ParsedAtom, boundary: AtomBoundary) {
        let labels = &atom.record.labels;
        let model_id = self.models[boundary.model_index];

        if boundary.is_first_in_model {
            self.current_chain = None;
        }
        let chain_changed = self
            .current_chain
            .and_then(|id| self.hierarchy.chain(id))
            .is_none_or(|chain| chain.id != labels.chain_id);
        let chain_id = match self.current_chain {
            Some(id) if !boundary.is_first_in_chain && !chain_changed => id,
            _ => {
                let id = self
                    .hierarchy
                    .insert_chain(Chain::new(&labels.chain_id, model_id));
                self.current_chain = Some(id);
                self.current_group = None;
                id
            }
        };

        let key = ResidueKey::new(labels.resseq, labels.icode);
        let group_id = match self.current_group {
            Some(id)
                if !boundary.is_first_after_break
                    && self.hierarchy.residue_group(id).map(|rg| rg.key) == Some(key) =>
            {
                id
            }
            _ => self.open_group(chain_id, key, !boundary.is_first_after_break),
        };

        let existing = self
            .hierarchy
            .find_conformer(group_id, labels.altloc)
            .map(|(id, conformer)| (id, conformer.resname == labels.resname));
        let conformer_id = match existing {
            Some((id, true)) => id,
            Some((_, false)) => {
                let group_id = self.open_group(chain_id, key, true);
                self.hierarchy
                    .insert_conformer(Conformer::new(labels.altloc, &labels.resname, group_id))
            }
            None => self
                .hierarchy
                .insert_conformer(Conformer::new(labels.altloc, &labels.resname, group_id)),
        };

        self.hierarchy
            .insert_atom(Atom::from_record(&atom.record, atom.uij, conformer_id));
    }

    fn open_group(&mut self, chain_id: ChainId, key: ResidueKey, link: bool) -> ResidueGroupId {
        let id = self
            .hierarchy
            .insert_residue_group(ResidueGroup::new(key, chain_id, link));
        self.current_group = Some(id);
        id
    }
}
