use crate::core::nomenclature::CnsTranslation;
use crate::core::symmetry::{CrystalSymmetry, FractionalizationMatrix};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// How residue and atom names are interpreted against reference nomenclature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpretationConfig {
    pub cns_translation: CnsTranslation,
    /// Report monomer-library names (AR, AD, ...) instead of reference names.
    pub monomer_library_names: bool,
    /// Optional `reported,canonical` CSV of extra residue aliases.
    pub alias_table_path: Option<PathBuf>,
}

impl Default for InterpretationConfig {
    fn default() -> Self {
        Self {
            cns_translation: CnsTranslation::Auto,
            monomer_library_names: false,
            alias_table_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymmetryConfig {
    /// Let the file's own symmetry win over a conflicting supplied one.
    pub weak: bool,
    pub relative_length_tolerance: f64,
    pub absolute_angle_tolerance: f64,
    /// Per-element tolerance when comparing SCALE records with the cell.
    pub scale_matrix_tolerance: f64,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            weak: false,
            relative_length_tolerance: 0.01,
            absolute_angle_tolerance: 1.0,
            scale_matrix_tolerance: 1e-6,
        }
    }
}

/// Options for [`Hierarchy::as_pdb_lines`](crate::core::models::hierarchy::Hierarchy::as_pdb_lines).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteOptions {
    #[serde(skip)]
    pub header_lines: Vec<String>,
    #[serde(skip)]
    pub crystal_symmetry: Option<CrystalSymmetry>,
    /// Written in place of the cell-derived SCALE records.
    #[serde(skip)]
    pub scale_matrix: Option<FractionalizationMatrix>,
    /// ORIGXn/MTRIXn lines written after CRYST1 and SCALE.
    #[serde(skip)]
    pub crystallographic_lines: Vec<String>,
    pub cryst1_z: Option<i64>,
    pub write_scale_records: bool,
    pub emit_ter: bool,
    pub emit_break: bool,
    pub append_end: bool,
    #[serde(skip)]
    pub trailer_lines: Vec<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            header_lines: Vec::new(),
            crystal_symmetry: None,
            scale_matrix: None,
            crystallographic_lines: Vec::new(),
            cryst1_z: None,
            write_scale_records: true,
            emit_ter: true,
            emit_break: true,
            append_end: false,
            trailer_lines: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct WriteOptionsBuilder {
    options: WriteOptions,
}

impl WriteOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn header_lines(mut self, lines: Vec<String>) -> Self {
        self.options.header_lines = lines;
        self
    }
    pub fn crystal_symmetry(mut self, symmetry: Option<CrystalSymmetry>) -> Self {
        self.options.crystal_symmetry = symmetry;
        self
    }
    pub fn scale_matrix(mut self, matrix: Option<FractionalizationMatrix>) -> Self {
        self.options.scale_matrix = matrix;
        self
    }
    pub fn crystallographic_lines(mut self, lines: Vec<String>) -> Self {
        self.options.crystallographic_lines = lines;
        self
    }
    pub fn cryst1_z(mut self, z: Option<i64>) -> Self {
        self.options.cryst1_z = z;
        self
    }
    pub fn write_scale_records(mut self, enabled: bool) -> Self {
        self.options.write_scale_records = enabled;
        self
    }
    pub fn emit_ter(mut self, enabled: bool) -> Self {
        self.options.emit_ter = enabled;
        self
    }
    pub fn emit_break(mut self, enabled: bool) -> Self {
        self.options.emit_break = enabled;
        self
    }
    pub fn append_end(mut self, enabled: bool) -> Self {
        self.options.append_end = enabled;
        self
    }
    pub fn trailer_lines(mut self, lines: Vec<String>) -> Self {
        self.options.trailer_lines = lines;
        self
    }

    pub fn build(self) -> WriteOptions {
        self.options
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoinOptions {
    /// Renumber atom serials 1..=n after joining.
    pub reset_serials: bool,
    /// Written as an extra `REMARK` line after the joined-files banner.
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeOptions {
    pub keep_original_crystallographic_section: bool,
    pub keep_original_atom_serial: bool,
}

/// All option groups, as read from a TOML file. Every table and key is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdbConfig {
    pub interpretation: InterpretationConfig,
    pub symmetry: SymmetryConfig,
    pub write: WriteOptions,
    pub join: JoinOptions,
    pub normalize: NormalizeOptions,
}

impl PdbConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: "<string>".to_string(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
