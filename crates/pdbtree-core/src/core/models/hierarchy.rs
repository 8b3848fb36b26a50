use super::atom::Atom;
use super::chain::{Chain, Model};
use super::ids::{AtomId, ChainId, ConformerId, ModelId, ResidueGroupId};
use super::residue::{Conformer, ResidueGroup};
use crate::core::config::WriteOptions;
use crate::core::io::records::{
    AnisouRecord, AtomLabels, AtomRecord, ModelRecord, RecordError,
};
use crate::core::symmetry::{format_cryst1, format_cryst1_and_scale_records, format_scale_records};
use slotmap::SlotMap;

/// The Model -> Chain -> ResidueGroup -> Conformer -> Atom tree.
///
/// Every node lives in a slot map owned by the hierarchy; parents hold the
/// ordered ids of their children and every child holds the id of its parent.
/// Tree order is the order in which nodes were inserted under their parent.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    models: SlotMap<ModelId, Model>,
    chains: SlotMap<ChainId, Chain>,
    residue_groups: SlotMap<ResidueGroupId, ResidueGroup>,
    conformers: SlotMap<ConformerId, Conformer>,
    atoms: SlotMap<AtomId, Atom>,
    model_order: Vec<ModelId>,
}

/// Number of nodes at each level of a [`Hierarchy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyCounts {
    pub models: usize,
    pub chains: usize,
    pub residue_groups: usize,
    pub conformers: usize,
    pub atoms: usize,
}

/// An atom together with all of its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct AtomView<'a> {
    pub id: AtomId,
    pub atom: &'a Atom,
    pub conformer: &'a Conformer,
    pub residue_group: &'a ResidueGroup,
    pub chain: &'a Chain,
    pub model: &'a Model,
}

impl AtomView<'_> {
    /// Reassembles the full label set carried by an atom record.
    pub fn labels(&self) -> AtomLabels {
        AtomLabels {
            serial: self.atom.serial,
            name: self.atom.name.clone(),
            altloc: self.conformer.altloc,
            resname: self.conformer.resname.clone(),
            chain_id: self.chain.id.clone(),
            resseq: self.residue_group.key.resseq,
            icode: self.residue_group.key.icode,
            segid: self.atom.segid.clone(),
            element: self.atom.element.clone(),
            charge: self.atom.charge.clone(),
        }
    }

    pub fn to_record(&self) -> AtomRecord {
        AtomRecord {
            hetero: self.atom.hetero,
            labels: self.labels(),
            position: self.atom.position,
            occupancy: self.atom.occupancy,
            b_iso: self.atom.b_iso,
        }
    }

    pub fn to_anisou(&self) -> Option<AnisouRecord> {
        self.atom.uij.map(|uij| AnisouRecord {
            labels: self.labels(),
            u: AnisouRecord::u_from_real(&uij),
        })
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_model(&mut self, model: Model) -> ModelId {
        let id = self.models.insert(model);
        self.model_order.push(id);
        id
    }

    pub(crate) fn insert_chain(&mut self, chain: Chain) -> ChainId {
        let parent = chain.model_id;
        let id = self.chains.insert(chain);
        if let Some(model) = self.models.get_mut(parent) {
            model.chains.push(id);
        }
        id
    }

    pub(crate) fn insert_residue_group(&mut self, group: ResidueGroup) -> ResidueGroupId {
        let parent = group.chain_id;
        let id = self.residue_groups.insert(group);
        if let Some(chain) = self.chains.get_mut(parent) {
            chain.residue_groups.push(id);
        }
        id
    }

    pub(crate) fn insert_conformer(&mut self, conformer: Conformer) -> ConformerId {
        let parent = conformer.residue_group_id;
        let id = self.conformers.insert(conformer);
        if let Some(group) = self.residue_groups.get_mut(parent) {
            group.conformers.push(id);
        }
        id
    }

    pub(crate) fn insert_atom(&mut self, atom: Atom) -> AtomId {
        let parent = atom.conformer_id;
        let id = self.atoms.insert(atom);
        if let Some(conformer) = self.conformers.get_mut(parent) {
            conformer.atoms.push(id);
        }
        id
    }

    pub(crate) fn find_conformer(
        &self,
        group_id: ResidueGroupId,
        altloc: char,
    ) -> Option<(ConformerId, &Conformer)> {
        self.conformers(group_id).find(|(_, c)| c.altloc == altloc)
    }

    /// Model ids in tree order.
    pub fn model_ids(&self) -> &[ModelId] {
        &self.model_order
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn residue_group(&self, id: ResidueGroupId) -> Option<&ResidueGroup> {
        self.residue_groups.get(id)
    }

    pub fn conformer(&self, id: ConformerId) -> Option<&Conformer> {
        self.conformers.get(id)
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// Coordinates, occupancy, B factor, name and the other per-atom fields
    /// may be changed in place; the atom's position in the tree may not.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Models in tree order.
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.model_order
            .iter()
            .filter_map(|&id| self.models.get(id).map(|m| (id, m)))
    }

    /// Chains of `model` in tree order; empty if the model does not exist.
    pub fn chains(&self, model: ModelId) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.models
            .get(model)
            .into_iter()
            .flat_map(|m| m.chains.iter())
            .filter_map(|&id| self.chains.get(id).map(|c| (id, c)))
    }

    pub fn residue_groups(
        &self,
        chain: ChainId,
    ) -> impl Iterator<Item = (ResidueGroupId, &ResidueGroup)> {
        self.chains
            .get(chain)
            .into_iter()
            .flat_map(|c| c.residue_groups.iter())
            .filter_map(|&id| self.residue_groups.get(id).map(|rg| (id, rg)))
    }

    pub fn conformers(
        &self,
        group: ResidueGroupId,
    ) -> impl Iterator<Item = (ConformerId, &Conformer)> {
        self.residue_groups
            .get(group)
            .into_iter()
            .flat_map(|rg| rg.conformers.iter())
            .filter_map(|&id| self.conformers.get(id).map(|c| (id, c)))
    }

    pub fn atoms(&self, conformer: ConformerId) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.conformers
            .get(conformer)
            .into_iter()
            .flat_map(|c| c.atoms.iter())
            .filter_map(|&id| self.atoms.get(id).map(|a| (id, a)))
    }

    /// Every atom in tree order, with its ancestors attached.
    pub fn atoms_in_order(&self) -> impl Iterator<Item = AtomView<'_>> {
        self.models().flat_map(move |(model_id, model)| {
            self.chains(model_id).flat_map(move |(chain_id, chain)| {
                self.residue_groups(chain_id)
                    .flat_map(move |(group_id, group)| {
                        self.conformers(group_id)
                            .flat_map(move |(conformer_id, conformer)| {
                                self.atoms(conformer_id).map(move |(id, atom)| AtomView {
                                    id,
                                    atom,
                                    conformer,
                                    residue_group: group,
                                    chain,
                                    model,
                                })
                            })
                    })
            })
        })
    }

    pub fn atoms_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn overall_counts(&self) -> HierarchyCounts {
        HierarchyCounts {
            models: self.models.len(),
            chains: self.chains.len(),
            residue_groups: self.residue_groups.len(),
            conformers: self.conformers.len(),
            atoms: self.atoms.len(),
        }
    }

    /// Renumbers every atom 1..=n in tree order.
    pub fn reset_serials(&mut self) {
        let order: Vec<AtomId> = self.atoms_in_order().map(|view| view.id).collect();
        for (serial, id) in (1_i64..).zip(order) {
            if let Some(atom) = self.atoms.get_mut(id) {
                atom.serial = serial;
            }
        }
    }

    /// Moves every model of `other` into `self`, in order.
    ///
    /// A model whose id already exists receives the incoming chains after its
    /// own; any other model is appended. Atom data is moved unchanged.
    pub fn append_models_from(&mut self, mut other: Hierarchy) {
        for other_model_id in std::mem::take(&mut other.model_order) {
            let Some(model) = other.models.remove(other_model_id) else {
                continue;
            };
            let existing = self
                .model_order
                .iter()
                .copied()
                .find(|&id| self.models.get(id).is_some_and(|m| m.id == model.id));
            let target = match existing {
                Some(id) => id,
                None => self.insert_model(Model::new(&model.id)),
            };
            for chain_id in model.chains {
                let Some(chain) = other.chains.remove(chain_id) else {
                    continue;
                };
                let new_chain = self.insert_chain(Chain::new(&chain.id, target));
                for group_id in chain.residue_groups {
                    let Some(group) = other.residue_groups.remove(group_id) else {
                        continue;
                    };
                    let new_group = self.insert_residue_group(ResidueGroup::new(
                        group.key,
                        new_chain,
                        group.link_to_previous,
                    ));
                    for conformer_id in group.conformers {
                        let Some(conformer) = other.conformers.remove(conformer_id) else {
                            continue;
                        };
                        let new_conformer = self.insert_conformer(Conformer::new(
                            conformer.altloc,
                            &conformer.resname,
                            new_group,
                        ));
                        for atom_id in conformer.atoms {
                            if let Some(mut atom) = other.atoms.remove(atom_id) {
                                atom.conformer_id = new_conformer;
                                self.insert_atom(atom);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Serializes the tree as PDB lines.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if a value does not fit its columns, for
    /// example a coordinate beyond `9999.999` or a serial beyond the
    /// hybrid-36 range.
    pub fn as_pdb_lines(&self, options: &WriteOptions) -> Result<Vec<String>, RecordError> {
        let mut lines = options.header_lines.clone();
        if let Some(symmetry) = &options.crystal_symmetry {
            match &options.scale_matrix {
                Some(matrix) if options.write_scale_records => {
                    lines.push(format_cryst1(symmetry, options.cryst1_z)?);
                    lines.extend(format_scale_records(matrix)?);
                }
                _ => lines.extend(format_cryst1_and_scale_records(
                    symmetry,
                    options.cryst1_z,
                    options.write_scale_records,
                )?),
            }
        }
        lines.extend(options.crystallographic_lines.iter().cloned());

        let write_model_records =
            self.model_order.len() > 1 || self.models().any(|(_, m)| !m.id.is_empty());
        for (model_id, model) in self.models() {
            if write_model_records {
                lines.push(ModelRecord { id: model.id.clone() }.format());
            }
            for (chain_id, chain) in self.chains(model_id) {
                for (index, (group_id, group)) in self.residue_groups(chain_id).enumerate() {
                    if options.emit_break && index > 0 && !group.link_to_previous {
                        lines.push("BREAK".to_string());
                    }
                    for (conformer_id, conformer) in self.conformers(group_id) {
                        for (id, atom) in self.atoms(conformer_id) {
                            let view = AtomView {
                                id,
                                atom,
                                conformer,
                                residue_group: group,
                                chain,
                                model,
                            };
                            lines.push(view.to_record().format()?);
                            if let Some(anisou) = view.to_anisou() {
                                lines.push(anisou.format()?);
                            }
                        }
                    }
                }
                if options.emit_ter {
                    lines.push("TER".to_string());
                }
            }
            if write_model_records {
                lines.push("ENDMDL".to_string());
            }
        }

        lines.extend(options.trailer_lines.iter().cloned());
        if options.append_end {
            lines.push("END".to_string());
        }
        Ok(lines)
    }

    /// Same as [`Hierarchy::as_pdb_lines`], joined with newlines.
    pub fn as_pdb_string(&self, options: &WriteOptions) -> Result<String, RecordError> {
        let mut text = self.as_pdb_lines(options)?.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        Ok(text)
    }
}
