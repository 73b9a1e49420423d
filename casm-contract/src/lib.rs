pub mod artifact;
pub mod error;

pub use artifact::{FunctionDecl, Hint, Identifier, Member, ProgramJson};
pub use error::{Error, Result};
