//! The phrase table: a fixed bijection between eight InmFuck phrases and the
//! eight Brainfuck instruction codes.
//!
//! Both translation directions read from the same table, so a phrase and its
//! code can never drift apart.

use std::sync::OnceLock;

use crate::error::TableError;

/// The eight Brainfuck instruction codes, in canonical table order.
pub const INSTRUCTIONS: [char; 8] = ['+', '-', '>', '<', '.', ',', '[', ']'];

/// The shipped phrase/code pairs. Existing `.inm` and `.bf` files depend on
/// this exact correspondence.
pub const CANONICAL_PHRASES: [(&str, char); 8] = [
    ("やりますねぇ！", '+'),
    ("王道を征く", '-'),
    ("ンアッー！", '>'),
    ("イキスギィ！", '<'),
    ("で、出ますよ", '.'),
    ("ファッ！？", ','),
    ("まずうちさぁ", '['),
    ("屋上あんだけど", ']'),
];

/// Returns true if `c` is one of the eight instruction codes.
pub fn is_instruction(c: char) -> bool {
    INSTRUCTIONS.contains(&c)
}

/// One phrase/code pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    phrase: String,
    code: char,
    char_len: usize,
}

impl Entry {
    fn new(phrase: &str, code: char) -> Self {
        Self {
            phrase: phrase.to_string(),
            code,
            char_len: phrase.chars().count(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn code(&self) -> char {
        self.code
    }

    /// Length of the phrase in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.char_len
    }
}

/// An immutable, validated phrase table.
///
/// Entries are held longest phrase first so that a greedy scan over them
/// always finds the longest matching phrase. Phrases of equal length keep
/// their declaration order.
#[derive(Debug, Clone)]
pub struct PhraseTable {
    by_length: Vec<Entry>,
}

static CANONICAL: OnceLock<PhraseTable> = OnceLock::new();

impl PhraseTable {
    /// Build a table from `(phrase, code)` pairs, checking that they form a
    /// bijection over the instruction alphabet.
    pub fn new<S: AsRef<str>>(entries: &[(S, char)]) -> Result<Self, TableError> {
        if entries.len() != INSTRUCTIONS.len() {
            return Err(TableError::WrongSize { len: entries.len() });
        }

        let mut by_length: Vec<Entry> = Vec::with_capacity(entries.len());
        for (phrase, code) in entries {
            let phrase = phrase.as_ref();
            let code = *code;

            if !is_instruction(code) {
                return Err(TableError::NotAnInstruction { code });
            }
            if phrase.is_empty() {
                return Err(TableError::EmptyPhrase { code });
            }
            if by_length.iter().any(|e| e.code == code) {
                return Err(TableError::DuplicateCode { code });
            }
            if by_length.iter().any(|e| e.phrase == phrase) {
                return Err(TableError::DuplicatePhrase { phrase: phrase.to_string() });
            }

            by_length.push(Entry::new(phrase, code));
        }

        Ok(Self::longest_first(by_length))
    }

    fn longest_first(mut entries: Vec<Entry>) -> Self {
        // Stable sort keeps declaration order among equal lengths.
        entries.sort_by(|a, b| b.char_len.cmp(&a.char_len));
        Self { by_length: entries }
    }

    /// The shipped table.
    pub fn canonical() -> &'static PhraseTable {
        CANONICAL.get_or_init(|| {
            Self::longest_first(
                CANONICAL_PHRASES
                    .iter()
                    .map(|(phrase, code)| Entry::new(phrase, *code))
                    .collect(),
            )
        })
    }

    /// Phrase for an instruction code, if the code is in the table.
    pub fn phrase_for(&self, code: char) -> Option<&str> {
        self.by_length
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.phrase.as_str())
    }

    /// Code for an exact phrase, if the phrase is in the table.
    pub fn code_for(&self, phrase: &str) -> Option<char> {
        self.by_length
            .iter()
            .find(|e| e.phrase == phrase)
            .map(|e| e.code)
    }

    /// The longest entry whose phrase is a prefix of `text`.
    pub fn longest_prefix(&self, text: &str) -> Option<&Entry> {
        self.by_length.iter().find(|e| text.starts_with(&e.phrase))
    }

    /// Entries, longest phrase first.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.by_length.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_table_is_a_bijection() {
        let table = PhraseTable::canonical();
        for (phrase, code) in CANONICAL_PHRASES {
            assert_eq!(table.code_for(phrase), Some(code));
            assert_eq!(table.phrase_for(code), Some(phrase));
        }
        assert!(PhraseTable::new(&CANONICAL_PHRASES).is_ok());
    }

    #[test]
    fn entries_are_ordered_longest_first() {
        let lens: Vec<usize> = PhraseTable::canonical().entries().map(Entry::char_len).collect();
        let mut sorted = lens.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted);
        assert_eq!(lens[0], 7);
    }

    #[test]
    fn lookups_outside_the_table_return_none() {
        let table = PhraseTable::canonical();
        assert_eq!(table.phrase_for('a'), None);
        assert_eq!(table.code_for("やりますね"), None);
    }

    #[test]
    fn longest_prefix_prefers_the_longer_phrase() {
        let table = PhraseTable::new(&[
            ("a", '+'),
            ("ab", '-'),
            ("c", '>'),
            ("d", '<'),
            ("e", '.'),
            ("f", ','),
            ("g", '['),
            ("h", ']'),
        ])
        .unwrap();
        assert_eq!(table.longest_prefix("abz").map(Entry::code), Some('-'));
        assert_eq!(table.longest_prefix("az").map(Entry::code), Some('+'));
        assert!(table.longest_prefix("z").is_none());
    }

    #[test]
    fn rejects_tables_that_are_not_bijections() {
        let mut pairs: Vec<(&str, char)> = CANONICAL_PHRASES.to_vec();
        pairs.pop();
        assert_eq!(
            PhraseTable::new(&pairs).unwrap_err(),
            TableError::WrongSize { len: 7 }
        );

        let mut pairs = CANONICAL_PHRASES.to_vec();
        pairs[1].1 = '+';
        assert_eq!(
            PhraseTable::new(&pairs).unwrap_err(),
            TableError::DuplicateCode { code: '+' }
        );

        let mut pairs = CANONICAL_PHRASES.to_vec();
        pairs[1].0 = pairs[0].0;
        assert!(matches!(
            PhraseTable::new(&pairs),
            Err(TableError::DuplicatePhrase { .. })
        ));

        let mut pairs = CANONICAL_PHRASES.to_vec();
        pairs[2].0 = "";
        assert_eq!(
            PhraseTable::new(&pairs).unwrap_err(),
            TableError::EmptyPhrase { code: '>' }
        );

        let mut pairs = CANONICAL_PHRASES.to_vec();
        pairs[3].1 = 'x';
        assert_eq!(
            PhraseTable::new(&pairs).unwrap_err(),
            TableError::NotAnInstruction { code: 'x' }
        );
    }
}
