use super::ids::{ChainId, ModelId, ResidueGroupId};

/// One model of the assembly. An empty id means "the only model".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub(crate) chains: Vec<ChainId>,
}

impl Model {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            chains: Vec::new(),
        }
    }

    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }
}

/// A contiguous chain segment. Several segments of one model may share the
/// same external `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,
    pub model_id: ModelId,
    pub(crate) residue_groups: Vec<ResidueGroupId>,
}

impl Chain {
    pub(crate) fn new(id: &str, model_id: ModelId) -> Self {
        Self {
            id: id.to_string(),
            model_id,
            residue_groups: Vec::new(),
        }
    }

    pub fn residue_groups(&self) -> &[ResidueGroupId] {
        &self.residue_groups
    }
}
