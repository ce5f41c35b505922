use std::fmt;

/// Fatal errors raised while validating or executing a program.
#[derive(Debug, thiserror::Error)]
pub enum InmError {
    /// Loops were not balanced. `position` is the index of the offending
    /// bracket in the instruction stream.
    #[error("unmatched {kind} bracket at position {position}")]
    UnmatchedBracket { position: usize, kind: BracketKind },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl BracketKind {
    pub fn symbol(self) -> char {
        match self {
            BracketKind::Open => '[',
            BracketKind::Close => ']',
        }
    }
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "opening"),
            BracketKind::Close => write!(f, "closing"),
        }
    }
}

/// A custom phrase table that is not a bijection over the instruction set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("phrase table must have exactly 8 entries, got {len}")]
    WrongSize { len: usize },

    #[error("'{code}' is not a Brainfuck instruction")]
    NotAnInstruction { code: char },

    #[error("empty phrase for instruction '{code}'")]
    EmptyPhrase { code: char },

    #[error("instruction '{code}' is mapped more than once")]
    DuplicateCode { code: char },

    #[error("phrase \"{phrase}\" is mapped more than once")]
    DuplicatePhrase { phrase: String },
}
