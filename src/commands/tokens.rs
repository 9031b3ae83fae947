use clap::Args;
use std::io::{self, Write};
use crate::cli_util::print_load_error;
use crate::{load_source, tokenize, validate, LoadError};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct TokensArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// List the instruction stream, one entry per line, then check the brackets.
pub fn run(program: &str, args: TokensArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let TokensArgs { file, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let (label, source) = match file {
        Some(path) => match load_source(&path) {
            Ok(s) => (path, s),
            Err(e) => {
                print_load_error(program, &path, None, &LoadError::from(e));
                return 1;
            }
        },
        None => ("<code>".to_string(), code.join("")),
    };

    let instructions = tokenize(&source);
    let mut stdout = io::stdout().lock();
    for instr in &instructions {
        if writeln!(stdout, "{instr}").is_err() {
            return 1;
        }
    }
    let _ = stdout.flush();
    drop(stdout);

    match validate(&instructions) {
        Ok(()) => 0,
        Err(e) => {
            print_load_error(program, &label, Some(&source), &LoadError::from(e));
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} tokens "<code>"
  {0} tokens --file <PATH>

Options:
  --file, -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --help, -h         Show this help

Description:
  Prints every recognized instruction with its source offset, e.g.
  <Instruction.LoopStart pos[3]>, then reports unmatched brackets (if any).
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
