//! Source text to instruction stream.
//!
//! Only the eight Brainfuck symbols `><+-.,[]` are recognized. Everything
//! else (whitespace, comments, stray punctuation) is dropped without error.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SourceError;

/// The closed set of Brainfuck operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// `>`
    MoveRight,
    /// `<`
    MoveLeft,
    /// `+`
    IncrementCell,
    /// `-`
    DecrementCell,
    /// `.`
    Output,
    /// `,` (accepted, but inert when executed)
    Input,
    /// `[`
    LoopStart,
    /// `]`
    LoopEnd,
}

impl InstructionKind {
    /// Map a source character to its instruction kind, if it is one of the eight symbols.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(InstructionKind::MoveRight),
            '<' => Some(InstructionKind::MoveLeft),
            '+' => Some(InstructionKind::IncrementCell),
            '-' => Some(InstructionKind::DecrementCell),
            '.' => Some(InstructionKind::Output),
            ',' => Some(InstructionKind::Input),
            '[' => Some(InstructionKind::LoopStart),
            ']' => Some(InstructionKind::LoopEnd),
            _ => None,
        }
    }

    /// The source symbol for this kind.
    pub fn symbol(self) -> char {
        match self {
            InstructionKind::MoveRight => '>',
            InstructionKind::MoveLeft => '<',
            InstructionKind::IncrementCell => '+',
            InstructionKind::DecrementCell => '-',
            InstructionKind::Output => '.',
            InstructionKind::Input => ',',
            InstructionKind::LoopStart => '[',
            InstructionKind::LoopEnd => ']',
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One recognized symbol and the character offset it came from.
///
/// The offset is kept for diagnostics only; control flow never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub offset: usize,
}

impl Instruction {
    pub fn new(kind: InstructionKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Instruction.{} pos[{}]>", self.kind, self.offset)
    }
}

/// Tokenizer over an owned source string.
pub struct Lexer {
    source: String,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Read a UTF-8 source file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        load_source(path).map(Self::new)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Produce the instruction stream. Offsets count characters, not bytes.
    pub fn tokenize(&self) -> Vec<Instruction> {
        tokenize(&self.source)
    }
}

impl fmt::Display for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Lexer object>")
    }
}

/// Convert `source` into its instruction stream, skipping every non-symbol character.
pub fn tokenize(source: &str) -> Vec<Instruction> {
    source
        .chars()
        .enumerate()
        .filter_map(|(offset, c)| InstructionKind::from_char(c).map(|kind| Instruction::new(kind, offset)))
        .collect()
}

/// Load a program's text from disk.
///
/// Missing files, permission problems and invalid UTF-8 all surface as [`SourceError::Read`].
pub fn load_source(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn kinds(source: &str) -> Vec<InstructionKind> {
        tokenize(source).into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn maps_all_eight_symbols_in_order() {
        use InstructionKind::*;
        assert_eq!(
            kinds("><+-.,[]"),
            vec![MoveRight, MoveLeft, IncrementCell, DecrementCell, Output, Input, LoopStart, LoopEnd]
        );
    }

    #[test]
    fn offsets_point_at_original_characters() {
        let tokens = tokenize("a +\n\t-");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Instruction::new(InstructionKind::IncrementCell, 2));
        assert_eq!(tokens[1], Instruction::new(InstructionKind::DecrementCell, 5));
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        // 'é' is two bytes in UTF-8 but one character.
        let tokens = tokenize("é.");
        assert_eq!(tokens, vec![Instruction::new(InstructionKind::Output, 1)]);
    }

    #[test]
    fn text_without_symbols_is_empty() {
        assert!(tokenize("hello world").is_empty());
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t").is_empty());
    }

    #[test]
    fn display_forms() {
        let instr = Instruction::new(InstructionKind::LoopStart, 3);
        assert_eq!(instr.to_string(), "<Instruction.LoopStart pos[3]>");
        assert_eq!(Lexer::new("+").to_string(), "<Lexer object>");
    }

    #[test]
    fn from_file_reads_utf8_source() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        write!(tf, "+[-]").unwrap();
        let lexer = Lexer::from_file(tf.path()).expect("readable file");
        assert_eq!(lexer.tokenize().len(), 4);
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let err = load_source("/definitely/not/here.bf").unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.bf"));
    }

    #[test]
    fn invalid_utf8_is_a_source_error() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        tf.write_all(&[b'+', 0xff, 0xfe]).unwrap();
        assert!(matches!(load_source(tf.path()), Err(SourceError::Read { .. })));
    }

    proptest! {
        /// Tokenizing is a pure function of the input.
        #[test]
        fn tokenize_is_deterministic(source in ".*") {
            prop_assert_eq!(tokenize(&source), tokenize(&source));
        }

        /// One instruction per recognized symbol, never more.
        #[test]
        fn one_instruction_per_symbol(source in "[><+\\-.,\\[\\]a-z \n]{0,64}") {
            let expected = source.chars().filter(|c| InstructionKind::from_char(*c).is_some()).count();
            let tokens = tokenize(&source);
            prop_assert_eq!(tokens.len(), expected);
            for t in tokens {
                prop_assert_eq!(source.chars().nth(t.offset), Some(t.kind.symbol()));
            }
        }
    }
}
