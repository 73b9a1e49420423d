pub mod cfg;
pub mod felt;
pub mod function;
pub mod instruction;
