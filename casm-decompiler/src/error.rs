use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("word at pc {pc} does not fit the 63-bit instruction encoding")]
    OversizedWord { pc: u64 },

    #[error("invalid {group} flag combination in word at pc {pc}")]
    InvalidFlags { group: &'static str, pc: u64 },

    #[error("instruction at pc {pc} expects an immediate but the program data ends")]
    TruncatedImmediate { pc: u64 },

    #[error("instruction {id} is missing its immediate")]
    MissingImmediate { id: u64 },

    #[error("jump at instruction {id} carries no immediate offset")]
    MissingJumpOffset { id: u64 },

    #[error("call at instruction {id} has an unsupported operand encoding")]
    UnsupportedCallShape { id: u64 },

    #[error(transparent)]
    Contract(#[from] casm_contract::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
