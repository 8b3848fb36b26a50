//! Reading and writing fixed-column PDB text.
//!
//! [`hybrid36`] and [`columns`] hold the field primitives, [`records`] the
//! typed per-record codecs, and [`input`] the single pass that splits a file
//! into sections and counts model/chain/break boundaries for the hierarchy
//! builder.

pub mod columns;
pub mod hybrid36;
pub mod input;
pub mod pdb;
pub mod records;
pub mod traits;
