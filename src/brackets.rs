//! Loop bracket matching.

use crate::error::{BracketKind, InmError};
use crate::tokenizer::Program;

/// Bidirectional map between each `[` and its matching `]`.
///
/// A `JumpTable` only exists for a well-nested program, so every bracket
/// position has a partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    // targets[i] holds the partner index for '[' or ']' at index i.
    targets: Vec<Option<usize>>,
}

impl JumpTable {
    /// Match every bracket in `program` with a single explicit stack.
    ///
    /// A `]` with nothing open fails at that `]`. Brackets still open at the
    /// end fail at the most recently opened one, i.e. the innermost.
    pub fn build(program: &Program) -> Result<Self, InmError> {
        let code = program.instructions();
        let mut targets: Vec<Option<usize>> = vec![None; code.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, &c) in code.iter().enumerate() {
            if c == '[' {
                stack.push(i);
            } else if c == ']' {
                let Some(open_index) = stack.pop() else {
                    return Err(InmError::UnmatchedBracket {
                        position: i,
                        kind: BracketKind::Close,
                    });
                };
                targets[open_index] = Some(i);
                targets[i] = Some(open_index);
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(InmError::UnmatchedBracket {
                position: unmatched_open,
                kind: BracketKind::Open,
            });
        }

        tracing::debug!(
            pairs = targets.iter().flatten().count() / 2,
            len = targets.len(),
            "bracket map built"
        );
        Ok(Self { targets })
    }

    /// Partner of the bracket at `pc`, or `None` if `pc` is not a bracket.
    pub fn partner(&self, pc: usize) -> Option<usize> {
        self.targets.get(pc).copied().flatten()
    }

    /// Where a taken jump at `pc` lands. Non-bracket positions map to
    /// themselves.
    pub fn target(&self, pc: usize) -> usize {
        self.partner(pc).unwrap_or(pc)
    }

    /// Every `(open, close)` pair, ordered by the open position.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.filter(|&j| i < j).map(|j| (i, j)))
    }
}

/// Validate the loop structure of `program` without running it.
pub fn check(program: &Program) -> Result<(), InmError> {
    JumpTable::build(program).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::parse_code;

    fn program(code: &str) -> Program {
        parse_code(code).program
    }

    fn well_nested(code: &str) -> bool {
        let mut depth = 0i64;
        for c in code.chars() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    #[test]
    fn pairs_are_bidirectional() {
        let jumps = JumpTable::build(&program("+[>[-]<-]")).unwrap();
        assert_eq!(jumps.partner(1), Some(8));
        assert_eq!(jumps.partner(8), Some(1));
        assert_eq!(jumps.partner(3), Some(5));
        assert_eq!(jumps.partner(5), Some(3));
        assert_eq!(jumps.partner(0), None);
        assert_eq!(jumps.target(0), 0);
        assert_eq!(jumps.pairs().collect::<Vec<_>>(), vec![(1, 8), (3, 5)]);
    }

    #[test]
    fn unmatched_close_reports_its_position() {
        let err = JumpTable::build(&program("+]-[]")).unwrap_err();
        assert!(matches!(
            err,
            InmError::UnmatchedBracket { position: 1, kind: BracketKind::Close }
        ));
    }

    #[test]
    fn unmatched_open_reports_the_innermost() {
        let err = JumpTable::build(&program("[+[-[]")).unwrap_err();
        assert!(matches!(
            err,
            InmError::UnmatchedBracket { position: 2, kind: BracketKind::Open }
        ));
    }

    #[test]
    fn unmatched_open_after_increments() {
        let err = check(&program("++++++[-")).unwrap_err();
        assert_eq!(err.to_string(), "unmatched opening bracket at position 6");
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let code = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let jumps = JumpTable::build(&program(&code)).unwrap();
        assert_eq!(jumps.partner(0), Some(2 * depth - 1));
        assert_eq!(jumps.partner(depth - 1), Some(depth));
    }

    #[test]
    fn succeeds_exactly_when_well_nested() {
        // Every bracket string up to length 8, with a filler op between.
        for len in 0..=8u32 {
            for bits in 0..(1u32 << len) {
                let code: String = (0..len)
                    .map(|i| if bits & (1 << i) == 0 { "[+" } else { "]-" })
                    .collect();
                let result = JumpTable::build(&program(&code));
                assert_eq!(result.is_ok(), well_nested(&code), "code: {code}");
                if let Ok(jumps) = result {
                    for (open, close) in jumps.pairs() {
                        assert_eq!(jumps.target(open), close);
                        assert_eq!(jumps.target(close), open);
                    }
                }
            }
        }
    }
}
