//! An InmFuck ⇄ Brainfuck translator and interpreter.
//!
//! InmFuck spells each of Brainfuck's eight instructions as a phrase. This
//! crate provides:
//! - the fixed [`PhraseTable`] shared by both translation directions,
//! - a greedy longest-match tokenizer ([`phrase_to_code`]) and its inverse
//!   ([`code_to_phrase`]),
//! - a bracket matcher ([`JumpTable`]) that rejects unbalanced loops,
//! - a tape [`Machine`] with 30,000 wrapping cells.
//!
//! Quick start:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use inmfuck::{phrase_to_code, Machine, PhraseTable};
//!
//! let source = "やりますねぇ！やりますねぇ！で、出ますよ";
//! let tokenized = phrase_to_code(PhraseTable::canonical(), source);
//! assert_eq!(tokenized.program.to_string(), "++.");
//!
//! let out = Arc::new(Mutex::new(String::new()));
//! let sink = out.clone();
//! let mut machine = Machine::new(tokenized.program).expect("brackets match");
//! machine.set_output_sink(move |c| sink.lock().unwrap().push(c));
//! machine.run().expect("program should run");
//! assert_eq!(out.lock().unwrap().as_str(), "\u{2}");
//! ```

pub mod brackets;
pub mod diagnostic;
pub mod error;
pub mod machine;
pub mod phrase;
pub mod tokenizer;

pub use brackets::{check, JumpTable};
pub use diagnostic::Diagnostic;
pub use error::{BracketKind, InmError, TableError};
pub use machine::{Machine, RunSummary, StepControl, TraceRow, TAPE_LEN};
pub use phrase::{PhraseTable, CANONICAL_PHRASES, INSTRUCTIONS};
pub use tokenizer::{code_to_phrase, parse_code, phrase_to_code, Program, Rendered, Tokenized};
