//! Jump-table construction and the fetch-decode-execute loop.
//!
//! Brackets are matched once, up front, so that a `[` or `]` can jump in O(1)
//! and so that structural defects are reported before anything runs:
//! - `table[i] == j` for a `[` at `i` whose matching `]` is at `j`,
//! - `table[j] == i + 1` for that `]`.
//!
//! Execution state is local to each run. The tape starts empty, the pointer
//! starts at 0 and may move anywhere in `i64`, and cells wrap at the
//! configured [`CellWidth`].

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::error::{LoadError, RunAborted, StructuralError};
use crate::lexer::{Instruction, InstructionKind, load_source, tokenize};
use crate::tape::{CellWidth, Tape};

/// Precomputed jump targets for every bracket in a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    // targets[i] is Some only for bracket positions.
    targets: Vec<Option<usize>>,
    entries: usize,
}

impl JumpTable {
    /// Match brackets with a stack in one left-to-right pass.
    ///
    /// Fails on the first `]` that has nothing to close, or on the innermost
    /// `[` still open at the end.
    pub fn build(instructions: &[Instruction]) -> Result<Self, StructuralError> {
        let mut targets: Vec<Option<usize>> = vec![None; instructions.len()];
        let mut entries = 0;
        let mut stack: Vec<usize> = Vec::new();

        for (index, instr) in instructions.iter().enumerate() {
            match instr.kind {
                InstructionKind::LoopStart => stack.push(index),
                InstructionKind::LoopEnd => {
                    let Some(start) = stack.pop() else {
                        return Err(StructuralError::UnmatchedLoopEnd {
                            index,
                            offset: instr.offset,
                        });
                    };
                    targets[start] = Some(index);
                    targets[index] = Some(start + 1);
                    entries += 2;
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last().copied() {
            return Err(StructuralError::UnmatchedLoopStart {
                index: open,
                offset: instructions[open].offset,
            });
        }

        Ok(Self { targets, entries })
    }

    /// Jump target for the bracket at `index`, or `None` for non-bracket positions.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.targets.get(index).copied().flatten()
    }

    /// Number of entries (one per bracket).
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// `(bracket index, target)` pairs in program order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|t| (i, t)))
    }
}

/// Fail-fast bracket check. Reports the same defect [`JumpTable::build`] would.
pub fn validate(instructions: &[Instruction]) -> Result<(), StructuralError> {
    JumpTable::build(instructions).map(|_| ())
}

/// `true` when every `[` has a later matching `]` and vice versa.
pub fn is_balanced(instructions: &[Instruction]) -> bool {
    validate(instructions).is_ok()
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Why `execute` returned early.
enum Stopped {
    Aborted(RunAborted),
    Trace { error: io::Error, output: String },
}

/// A validated program ready to run any number of times.
pub struct Interpreter {
    instructions: Vec<Instruction>,
    jumps: JumpTable,
    width: CellWidth,
}

impl Interpreter {
    /// Build an 8-bit interpreter.
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, StructuralError> {
        Self::with_width(instructions, CellWidth::Bits8)
    }

    /// Build an interpreter from a requested bit count; unsupported values mean 8.
    pub fn with_bits(instructions: Vec<Instruction>, bits: u32) -> Result<Self, StructuralError> {
        Self::with_width(instructions, CellWidth::from_bits(bits))
    }

    pub fn with_width(instructions: Vec<Instruction>, width: CellWidth) -> Result<Self, StructuralError> {
        let jumps = JumpTable::build(&instructions)?;
        Ok(Self {
            instructions,
            jumps,
            width,
        })
    }

    /// Tokenize `source` and build an interpreter for it.
    pub fn from_source(source: &str, bits: u32) -> Result<Self, StructuralError> {
        Self::with_bits(tokenize(source), bits)
    }

    /// Load, tokenize and validate a program file.
    pub fn from_file(path: impl AsRef<Path>, bits: u32) -> Result<Self, LoadError> {
        let source = load_source(path)?;
        Ok(Self::from_source(&source, bits)?)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn jump_table(&self) -> &JumpTable {
        &self.jumps
    }

    pub fn width(&self) -> CellWidth {
        self.width
    }

    /// Run to completion and return everything the program printed.
    ///
    /// There is no step bound: a program that never halts never returns.
    pub fn run(&self) -> String {
        self.execute(None, None).unwrap_or_else(|stopped| match stopped {
            Stopped::Aborted(aborted) => aborted.partial_output().to_string(),
            Stopped::Trace { output, .. } => output,
        })
    }

    /// Run with cooperative cancellation and an optional step limit.
    pub fn run_with_control(&self, step_control: &StepControl) -> Result<String, RunAborted> {
        self.execute(None, Some(step_control)).map_err(|stopped| match stopped {
            Stopped::Aborted(aborted) => aborted,
            Stopped::Trace { output, .. } => RunAborted::Canceled { output },
        })
    }

    /// Run while writing a step-by-step table of operations to `out`.
    ///
    /// Program output is still collected and returned; `.` only logs the
    /// character in the table.
    pub fn run_debug<W: Write>(&self, out: &mut W) -> io::Result<String> {
        self.run_debug_inner(out, None).map_err(|stopped| match stopped {
            Stopped::Trace { error, .. } => error,
            Stopped::Aborted(aborted) => io::Error::other(aborted),
        })
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control<W: Write>(&self, out: &mut W, step_control: &StepControl) -> io::Result<Result<String, RunAborted>> {
        match self.run_debug_inner(out, Some(step_control)) {
            Ok(output) => Ok(Ok(output)),
            Err(Stopped::Aborted(aborted)) => Ok(Err(aborted)),
            Err(Stopped::Trace { error, .. }) => Err(error),
        }
    }

    fn run_debug_inner<W: Write>(&self, out: &mut W, step_control: Option<&StepControl>) -> Result<String, Stopped> {
        let header = writeln!(out, "STEP | PC  | PTR | CELL | INSTR | ACTION").and_then(|_| {
            writeln!(out, "-----+-----+-----+------+-------+------------------------------------------------")
        });
        if let Err(error) = header {
            return Err(Stopped::Trace { error, output: String::new() });
        }
        self.execute(Some(out as &mut dyn Write), step_control)
    }

    /// Internal executor shared by every run mode.
    fn execute(&self, mut trace: Option<&mut dyn Write>, step_control: Option<&StepControl>) -> Result<String, Stopped> {
        let mut tape = Tape::new();
        let mut output = String::new();
        let mut pointer: i64 = 0;
        let mut pc: usize = 0;
        let mut step: usize = 0;
        let len = self.instructions.len();

        while pc < len {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(Stopped::Aborted(RunAborted::Canceled { output }));
                }
                if let Some(max) = ctrl.max_steps {
                    if step >= max {
                        return Err(Stopped::Aborted(RunAborted::StepLimitExceeded { limit: max, output }));
                    }
                }
            }

            let instr = self.instructions[pc];
            let (pc_before, ptr_before) = (pc, pointer);
            let cell_before = *tape.cell(pointer);
            let mut action: Option<String> = trace.as_ref().map(|_| String::new());
            let mut jumped = false;

            match instr.kind {
                InstructionKind::MoveRight => {
                    pointer += 1;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer to {pointer}"); }
                }
                InstructionKind::MoveLeft => {
                    pointer -= 1;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer to {pointer}"); }
                }
                InstructionKind::IncrementCell => {
                    let after = self.width.increment(cell_before);
                    *tape.cell(pointer) = after;
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                InstructionKind::DecrementCell => {
                    let after = self.width.decrement(cell_before);
                    *tape.cell(pointer) = after;
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                InstructionKind::Output => {
                    let ch = cell_to_char(cell_before);
                    output.push(ch);
                    if let Some(a) = action.as_mut() { *a = format!("Output {:?}", ch); }
                }
                InstructionKind::Input => {
                    if let Some(a) = action.as_mut() { *a = "Input ignored".to_string(); }
                }
                InstructionKind::LoopStart => {
                    if cell_before == 0 {
                        pc = self.jump_target(pc);
                        jumped = true;
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; jump forward to matching ']' at PC {pc}"); }
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                InstructionKind::LoopEnd => {
                    if cell_before != 0 {
                        pc = self.jump_target(pc);
                        jumped = true;
                        if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to PC {pc}"); }
                    } else if let Some(a) = action.as_mut() {
                        *a = "Exit loop (cell is 0)".to_string();
                    }
                }
            }

            if let Some(out) = trace.as_mut() {
                let row = writeln!(
                    out,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    step,
                    pc_before,
                    ptr_before,
                    cell_before,
                    instr.kind.symbol(),
                    action.unwrap_or_default()
                );
                if let Err(error) = row {
                    return Err(Stopped::Trace { error, output });
                }
            }

            step += 1;
            if !jumped {
                pc += 1;
            }
        }

        Ok(output)
    }

    fn jump_target(&self, pc: usize) -> usize {
        // Construction guarantees an entry for every bracket.
        self.jumps.get(pc).unwrap_or(usize::MAX)
    }
}

/// Code point of a cell value; values outside Unicode become U+FFFD.
fn cell_to_char(value: u64) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Interpreter, {}>", self.width)
    }
}
