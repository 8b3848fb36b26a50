//! # Core Module
//!
//! Data structures and pure algorithms for reading, representing and writing
//! PDB coordinate files.
//!
//! ## Architecture
//!
//! - **File I/O** ([`io`]) - Hybrid-36 counters, fixed-column record codecs,
//!   the input scan and the [`io::traits::StructureFile`] adapter
//! - **Structure Representation** ([`models`]) - The Model/Chain/ResidueGroup/
//!   Conformer/Atom tree and the builder that assembles it from partition
//!   index arrays
//! - **Crystal Symmetry** ([`symmetry`]) - Unit cells, SCALE matrices and
//!   reconciliation of file and caller symmetry
//! - **Nomenclature** ([`nomenclature`]) - Residue and atom naming conventions
//!   mapped onto reference names
//! - **Configuration** ([`config`]) - Option groups and their TOML loader

pub mod config;
pub mod io;
pub mod models;
pub mod nomenclature;
pub mod symmetry;
