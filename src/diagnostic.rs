//! Non-fatal diagnostics. The core only produces these; rendering them is up
//! to the front end.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No phrase matched at `position` (in characters) of the InmFuck source.
    /// `fragment` holds up to the next 10 characters.
    UnrecognizedFragment { position: usize, fragment: String },

    /// A character in instruction text that is not one of the eight codes.
    /// It was dropped.
    InvalidInstruction { position: usize, ch: char },

    /// `,` at instruction `ip` found no input; the cell was set to 0.
    InputExhausted { ip: usize },
}

impl Diagnostic {
    /// Short, stable name of the diagnostic kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UnrecognizedFragment { .. } => "unrecognized-fragment",
            Diagnostic::InvalidInstruction { .. } => "invalid-instruction",
            Diagnostic::InputExhausted { .. } => "input-exhausted",
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Diagnostic::UnrecognizedFragment { position, .. } => *position,
            Diagnostic::InvalidInstruction { position, .. } => *position,
            Diagnostic::InputExhausted { ip } => *ip,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedFragment { position, fragment } => {
                write!(f, "unrecognized phrase at position {position}: \"{fragment}\"")
            }
            Diagnostic::InvalidInstruction { position, ch } => {
                write!(f, "invalid Brainfuck instruction {ch:?} at position {position}")
            }
            Diagnostic::InputExhausted { ip } => {
                write!(f, "input exhausted at instruction {ip}; cell set to 0")
            }
        }
    }
}
