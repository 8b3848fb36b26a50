//! Line classification and the counting pass that feeds the hierarchy
//! builder.

use super::records::{AnisouRecord, AtomRecord, Cryst1Record, ModelRecord, RecordError, RecordKind};
use crate::core::config::SymmetryConfig;
use crate::core::models::builder::{AtomPartition, HierarchyBuilder, ParsedAtom, PartitionError};
use crate::core::models::hierarchy::Hierarchy;
use crate::core::symmetry::{self, CrystalSymmetry, FractionalizationMatrix, SymmetryError};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{source_info}line {line}: {source}")]
    Record {
        source_info: String,
        line: usize,
        source: RecordError,
    },
    #[error("{source_info}line {line}: ANISOU record does not match the preceding atom: '{text}'")]
    UnmatchedAnisou {
        source_info: String,
        line: usize,
        text: String,
    },
}

#[derive(Default)]
struct PartitionState {
    partition: AtomPartition,
    model_open: bool,
    chain_id: Option<String>,
    pending_break: bool,
}

impl PartitionState {
    fn open_model(&mut self, id: &str) {
        self.partition.model_ids.push(id.to_string());
        self.partition.chain_ends.push(Vec::new());
        self.model_open = true;
        self.chain_id = None;
        self.pending_break = false;
    }

    fn close_chain(&mut self, atom_count: usize) {
        if self.chain_id.take().is_some() {
            if let Some(ends) = self.partition.chain_ends.last_mut() {
                ends.push(atom_count);
            }
        }
    }

    fn close_model(&mut self, atom_count: usize) {
        self.close_chain(atom_count);
        self.partition.model_ends.push(atom_count);
        self.model_open = false;
        self.pending_break = false;
    }

    fn add_atom(&mut self, index: usize, chain_id: &str) {
        if !self.model_open {
            self.open_model("");
        }
        if self.chain_id.as_deref().is_some_and(|id| id != chain_id) {
            self.close_chain(index);
        }
        if self.chain_id.is_none() {
            self.chain_id = Some(chain_id.to_string());
        }
        if self.pending_break {
            self.partition.break_indices.push(index);
            self.pending_break = false;
        }
    }
}

/// A PDB file split into sections, with atom records parsed and the
/// model/chain/break boundaries counted.
#[derive(Debug, Clone, Default)]
pub struct PdbInput {
    source_info: String,
    title: Vec<String>,
    remarks: Vec<String>,
    crystallographic: Vec<String>,
    other: Vec<String>,
    atoms: Vec<ParsedAtom>,
    partition: AtomPartition,
}

impl PdbInput {
    /// Scans `lines` once.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if an ATOM, HETATM or ANISOU record cannot be
    /// parsed, or if an ANISOU record does not follow the atom it describes.
    #[instrument(skip_all, fields(source = source_info))]
    pub fn from_lines<I, S>(source_info: &str, lines: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = if source_info.is_empty() {
            String::new()
        } else {
            format!("{source_info}: ")
        };
        let mut input = Self {
            source_info: source_info.to_string(),
            ..Default::default()
        };
        let mut state = PartitionState::default();
        let mut previous = RecordKind::Other;

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            let line_number = index + 1;
            let record_error = |source| InputError::Record {
                source_info: prefix.clone(),
                line: line_number,
                source,
            };
            let kind = RecordKind::classify(line);
            match kind {
                RecordKind::Atom | RecordKind::Hetatm => {
                    let record = AtomRecord::parse(line).map_err(record_error)?;
                    state.add_atom(input.atoms.len(), &record.labels.chain_id);
                    input.atoms.push(ParsedAtom::from(record));
                }
                RecordKind::Anisou => {
                    let anisou = AnisouRecord::parse(line).map_err(record_error)?;
                    let target = input
                        .atoms
                        .last_mut()
                        .filter(|a| previous.is_atom() && a.uij.is_none())
                        .filter(|a| a.record.labels.same_atom(&anisou.labels));
                    match target {
                        Some(atom) => atom.uij = Some(anisou.u_as_real()),
                        None => {
                            return Err(InputError::UnmatchedAnisou {
                                source_info: prefix.clone(),
                                line: line_number,
                                text: line.to_string(),
                            });
                        }
                    }
                }
                RecordKind::Model => {
                    if state.model_open {
                        warn!(line = line_number, "MODEL without ENDMDL; closing previous model");
                        state.close_model(input.atoms.len());
                    }
                    state.open_model(&ModelRecord::parse(line).id);
                }
                RecordKind::Endmdl => {
                    if state.model_open {
                        state.close_model(input.atoms.len());
                    } else {
                        warn!(line = line_number, "ENDMDL without MODEL ignored");
                    }
                }
                RecordKind::Ter => state.close_chain(input.atoms.len()),
                RecordKind::Break => state.pending_break = true,
                RecordKind::Header | RecordKind::Title => input.title.push(line.to_string()),
                RecordKind::Remark => input.remarks.push(line.to_string()),
                RecordKind::Cryst1 | RecordKind::Scale(_) | RecordKind::Crystallographic => {
                    input.crystallographic.push(line.to_string())
                }
                RecordKind::End => {}
                RecordKind::Other => input.other.push(line.to_string()),
            }
            if kind != RecordKind::Anisou {
                previous = kind;
            }
        }
        if state.model_open {
            state.close_model(input.atoms.len());
        }
        input.partition = state.partition;

        debug!(
            atoms = input.atoms.len(),
            models = input.partition.model_count(),
            breaks = input.partition.break_indices.len(),
            "Input scanned"
        );
        Ok(input)
    }

    pub fn source_info(&self) -> &str {
        &self.source_info
    }

    pub fn title_section(&self) -> &[String] {
        &self.title
    }

    pub fn remark_section(&self) -> &[String] {
        &self.remarks
    }

    pub fn crystallographic_section(&self) -> &[String] {
        &self.crystallographic
    }

    pub fn other_section(&self) -> &[String] {
        &self.other
    }

    pub fn atoms(&self) -> &[ParsedAtom] {
        &self.atoms
    }

    pub fn partition(&self) -> &AtomPartition {
        &self.partition
    }

    pub fn model_ids(&self) -> &[String] {
        &self.partition.model_ids
    }

    pub fn construct_hierarchy(&self) -> Result<Hierarchy, PartitionError> {
        HierarchyBuilder::build(&self.atoms, &self.partition)
    }

    /// The symmetry recorded in the file itself.
    pub fn crystal_symmetry_from_records(&self) -> Result<Option<CrystalSymmetry>, SymmetryError> {
        symmetry::extract_self(&self.crystallographic, &self.remarks)
    }

    /// The file's symmetry reconciled with `supplied`; see [`symmetry::join`].
    pub fn crystal_symmetry(
        &self,
        supplied: Option<CrystalSymmetry>,
        weak: bool,
    ) -> Result<Option<CrystalSymmetry>, SymmetryError> {
        symmetry::join(self.crystal_symmetry_from_records()?, supplied, weak)
    }

    /// Like [`PdbInput::crystal_symmetry`], with the weak flag and the
    /// tolerances taken from `config`.
    pub fn crystal_symmetry_with(
        &self,
        config: &SymmetryConfig,
        supplied: Option<CrystalSymmetry>,
    ) -> Result<Option<CrystalSymmetry>, SymmetryError> {
        symmetry::join_with_config(self.crystal_symmetry_from_records()?, supplied, config)
    }

    pub fn scale_matrix(&self) -> Result<Option<FractionalizationMatrix>, SymmetryError> {
        symmetry::scale_matrix(&self.crystallographic)
    }

    /// The SCALE matrix, dropped when the unit cell already implies it.
    pub fn effective_scale_matrix(
        &self,
        config: &SymmetryConfig,
    ) -> Result<Option<FractionalizationMatrix>, SymmetryError> {
        let Some(recorded) = self.scale_matrix()? else {
            return Ok(None);
        };
        let cell = self
            .crystal_symmetry_from_records()?
            .and_then(|s| s.unit_cell);
        Ok(match cell {
            Some(cell) => {
                symmetry::effective_scale_matrix(&recorded, &cell, config.scale_matrix_tolerance)
            },
            None => Some(recorded),
        })
    }

    /// Two-digit deposition year from the first HEADER record.
    pub fn extract_header_year(&self) -> Option<u8> {
        self.title
            .iter()
            .find(|l| l.starts_with("HEADER "))
            .and_then(|l| header_year(l))
    }

    /// Remark lines of the form `REMARK iii ...`.
    pub fn extract_remark_records(&self, iii: u16) -> Vec<&str> {
        let pattern = format!("REMARK {iii:3} ");
        self.remarks
            .iter()
            .filter(|l| l.starts_with(&pattern))
            .map(String::as_str)
            .collect()
    }
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// A `DD-MMM-YY` date; parts that do not validate are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDate {
    pub dd: Option<u8>,
    pub mmm: Option<String>,
    pub yy: Option<u8>,
}

impl HeaderDate {
    pub fn parse(field: &str) -> Self {
        let chars: Vec<char> = field.chars().collect();
        if chars.len() != 9 || chars[2] != '-' || chars[6] != '-' || field.matches('-').count() != 2
        {
            return Self::default();
        }
        let mut parts = field.split('-');
        let (Some(dd), Some(mmm), Some(yy)) = (parts.next(), parts.next(), parts.next()) else {
            return Self::default();
        };
        let month = mmm.to_uppercase();
        Self {
            dd: dd.trim().parse::<u8>().ok().filter(|d| (1..=31).contains(d)),
            mmm: MONTHS.contains(&month.as_str()).then_some(month),
            yy: yy.trim().parse::<u8>().ok().filter(|y| *y <= 99),
        }
    }

    pub fn is_fully_defined(&self) -> bool {
        self.dd.is_some() && self.mmm.is_some() && self.yy.is_some()
    }
}

/// Year of a HEADER record: columns 51-59 first, else the last
/// whitespace-separated field holding a full date.
pub fn header_year(record: &str) -> Option<u8> {
    if !record.starts_with("HEADER") {
        return None;
    }
    let field: String = record.chars().skip(50).take(9).collect();
    let date = HeaderDate::parse(&field);
    if date.is_fully_defined() {
        return date.yy;
    }
    record
        .split_whitespace()
        .rev()
        .map(HeaderDate::parse)
        .find(HeaderDate::is_fully_defined)
        .and_then(|d| d.yy)
}

/// Whether `lines` look like PDB text: a CRYST1 record with a known cell
/// and space group, or an atom record with a non-blank name.
pub fn looks_like_pdb<I, S>(lines: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().any(|line| {
        let line = line.as_ref();
        match RecordKind::classify(line) {
            RecordKind::Cryst1 => Cryst1Record::parse(line)
                .map(|r| {
                    let symmetry = CrystalSymmetry::from_cryst1(&r);
                    symmetry.unit_cell.is_some() && symmetry.space_group.is_some()
                })
                .unwrap_or(false),
            RecordKind::Atom | RecordKind::Hetatm => AtomRecord::parse(line)
                .map(|r| !r.labels.name.is_blank())
                .unwrap_or(false),
            _ => false,
        }
    })
}
