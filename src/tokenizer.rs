//! Translation between InmFuck phrase text and Brainfuck instruction text.
//!
//! Neither direction ever aborts: anything that cannot be translated is
//! skipped and reported as a [`Diagnostic`].

use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::phrase::{is_instruction, PhraseTable};

/// How many characters of context an unrecognized fragment carries.
const FRAGMENT_CONTEXT_CHARS: usize = 10;

/// A decoded instruction stream. It only ever holds the eight instruction
/// codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<char>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn instructions(&self) -> &[char] {
        &self.code
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.code {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Result of decoding source text into a [`Program`].
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Tokenized {
    /// Number of source positions where no phrase matched.
    pub fn unknown_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnrecognizedFragment { .. }))
            .count()
    }
}

/// Result of rendering instruction text as phrases.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// InmFuck → Brainfuck.
///
/// Scans left to right and at each position takes the longest phrase that
/// matches. Where nothing matches, records the next few characters, skips
/// exactly one character and carries on.
pub fn phrase_to_code(table: &PhraseTable, source: &str) -> Tokenized {
    let mut out = Tokenized::default();
    // `byte` indexes `source`; `position` counts characters for diagnostics.
    let mut byte = 0usize;
    let mut position = 0usize;

    while byte < source.len() {
        let rest = &source[byte..];
        if let Some(entry) = table.longest_prefix(rest) {
            out.program.code.push(entry.code());
            byte += entry.phrase().len();
            position += entry.char_len();
            continue;
        }

        let fragment: String = rest.chars().take(FRAGMENT_CONTEXT_CHARS).collect();
        let skipped = rest.chars().next().map_or(1, char::len_utf8);
        out.diagnostics.push(Diagnostic::UnrecognizedFragment { position, fragment });
        byte += skipped;
        position += 1;
    }

    tracing::debug!(
        instructions = out.program.len(),
        unknown = out.unknown_count(),
        "tokenized phrase source"
    );
    out
}

/// Brainfuck → InmFuck.
///
/// Each instruction is expanded to its phrase. Any other character is
/// reported once per occurrence and left out of the output.
pub fn code_to_phrase(table: &PhraseTable, code: &str) -> Rendered {
    let mut out = Rendered::default();

    for (position, ch) in code.chars().enumerate() {
        match table.phrase_for(ch) {
            Some(phrase) => out.text.push_str(phrase),
            None => out.diagnostics.push(Diagnostic::InvalidInstruction { position, ch }),
        }
    }

    tracing::debug!(
        chars = out.text.chars().count(),
        invalid = out.diagnostics.len(),
        "rendered instruction text as phrases"
    );
    out
}

/// Reads raw Brainfuck text, dropping (and reporting) anything that is not
/// an instruction.
pub fn parse_code(code: &str) -> Tokenized {
    let mut out = Tokenized::default();
    for (position, ch) in code.chars().enumerate() {
        if is_instruction(ch) {
            out.program.code.push(ch);
        } else {
            out.diagnostics.push(Diagnostic::InvalidInstruction { position, ch });
        }
    }
    out
}
