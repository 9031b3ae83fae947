use clap::Args;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use crate::cli_util::print_structural_error;
use crate::commands::run::{execute, report, ExecArgs};
use crate::Interpreter;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct EvalArgs {
    #[command(flatten)]
    pub exec: ExecArgs,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: EvalArgs, cancel: &Arc<AtomicBool>) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.code.is_empty() {
        usage_and_exit(program, 2);
    }

    let code = args.code.join("");
    let settings = args.exec.settings();

    let interp = match Interpreter::with_width(crate::tokenize(&code), settings.width) {
        Ok(i) => i,
        Err(e) => {
            print_structural_error(program, &code, &e);
            return 1;
        }
    };

    if report(program, execute(interp, &settings, args.exec.debug, cancel), &settings, false) {
        0
    } else {
        1
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} eval [OPTIONS] "<code>"...

Options:
  --bits,  -b <N>   Cell width: 8, 16, 32 or 64 (anything else means 8)
  --debug, -d       Print a step-by-step table of operations instead of the output
  --max-steps <N>   Abort after N steps
  --timeout <MS>    Abort after MS milliseconds of wall-clock time
  --help,  -h       Show this help

Notes:
- Code arguments are concatenated before running.
- The program output is printed as-is, without a trailing newline.

Examples:
    {0} eval "++>+++++[<+>-]<."
    {0} eval --bits 16 -- "-."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
