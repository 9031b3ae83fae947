use std::io::{self, IsTerminal, Write};
use nu_ansi_term::Color;
use crate::{LoadError, RunAborted, StructuralError};

/// Prefix `msg` with `"{program}: "` and colour the whole line red when stderr is a terminal.
fn headline(program: &str, msg: &str) -> String {
    let line = format!("{program}: {msg}");
    if io::stderr().is_terminal() {
        Color::Red.bold().paint(line).to_string()
    } else {
        line
    }
}

/// Pretty-print a bracket error with caret positioning.
pub fn print_structural_error(program: &str, code: &str, err: &StructuralError) {
    let msg = headline(program, &format!("Parse error: unmatched bracket {}", err.kind()));
    print_error_with_context(&msg, code, err.offset());
}

/// Report a failure to load `path`. Structural errors get caret context when the source is known.
pub fn print_load_error(program: &str, path: &str, code: Option<&str>, err: &LoadError) {
    match (err, code) {
        (LoadError::Structural(e), Some(code)) => {
            eprintln!("{}", headline(program, &format!("in {path}:")));
            print_structural_error(program, code, e);
        }
        (LoadError::Structural(e), None) => eprintln!("{}", headline(program, &format!("{path}: {e}"))),
        (LoadError::Source(e), _) => eprintln!("{}", headline(program, &e.to_string())),
    }
    let _ = io::stderr().flush();
}

/// Report an aborted bounded run. `timeout_ms` is set when the abort came from the wall clock.
pub fn print_aborted(err: &RunAborted, timeout_ms: Option<u64>) {
    match (err, timeout_ms) {
        (RunAborted::Canceled { .. }, Some(ms)) => {
            eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)")
        }
        _ => eprintln!("{err}"),
    }
    let _ = io::stderr().flush();
}

/// Print a concise error with source offset and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at offset {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines and tabs would break caret alignment
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    eprintln!("  {}", slice);

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    eprintln!("  {}^", " ".repeat(caret_offset_chars));
    let _ = io::stderr().flush();
}

/// Text printed after a program's output in multi-file mode.
/// Returns the `⏎` marker line when the output does not already end in a newline.
pub fn end_marker(output: &str) -> Option<&'static str> {
    if output.ends_with('\n') { None } else { Some("⏎") }
}
