pub mod atom;
pub mod builder;
pub mod chain;
pub mod hierarchy;
pub mod ids;
pub mod residue;
