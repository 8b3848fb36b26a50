//! # Workflows Module
//!
//! Multi-step procedures built on [`crate::core`]:
//!
//! - **Fragment joining** ([`join`]) merges several files into one tree and
//!   records how their CRYST1 records combine.
//! - **Normalized rewrite** ([`normalize`]) re-emits a file through the
//!   hierarchy with regenerated symmetry records and fresh serials.

pub mod join;
pub mod normalize;
