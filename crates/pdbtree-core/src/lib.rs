//! # pdbtree
//!
//! Reading and writing of fixed-column PDB coordinate files, with a typed
//! hierarchy in between.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Record codecs operate on single lines and
//!   never touch `std::io`. A counting pass over the lines produces partition
//!   index arrays, and the hierarchy builder turns those into an arena-backed
//!   tree. Crystal symmetry and naming conventions live beside the tree as
//!   independent, stateless services.
//!
//! - **[`workflows`]: The Public API.** Multi-step procedures that combine the
//!   core pieces: joining fragment files and rewriting a file in normalized
//!   form.
//!
//! The library emits diagnostics through `tracing` and never installs a
//! subscriber.

pub mod core;
pub mod workflows;
