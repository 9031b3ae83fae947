//! A Brainfuck tokenizer and jump-table interpreter.
//!
//! Source text is turned into a flat instruction stream by the [`lexer`],
//! then an [`Interpreter`] matches brackets into a jump table and walks the
//! stream against an unbounded tape.
//!
//! Features and behaviors:
//! - Characters outside `><+-.,[]` are skipped, not rejected.
//! - The tape is sparse and unbounded in both directions; untouched cells read as 0.
//! - Cells are 8, 16, 32 or 64 bits wide and wrap on overflow/underflow.
//!   Any other requested width falls back to 8.
//! - `.` appends the character whose code point is the cell value to the output.
//! - `,` is accepted but does nothing.
//! - Unmatched `[` or `]` is rejected when the interpreter is built, before anything runs.
//!
//! Quick start:
//!
//! ```
//! use bf_walk::{Interpreter, tokenize};
//!
//! let program = tokenize("++>+++++[<+>-]<.");
//! let interp = Interpreter::with_bits(program, 8).expect("balanced brackets");
//! assert_eq!(interp.run(), "\u{7}");
//! ```

pub mod cli_util;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod tape;

pub mod commands {
    pub mod eval;
    pub mod run;
    pub mod tokens;
}

pub use error::{LoadError, RunAborted, SourceError, StructuralError, UnmatchedBracketKind};
pub use interpreter::{Interpreter, JumpTable, StepControl, is_balanced, validate};
pub use lexer::{Instruction, InstructionKind, Lexer, load_source, tokenize};
pub use tape::{CellWidth, Tape};
