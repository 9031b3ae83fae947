use bf_walk::commands::{eval, run, tokens};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run    [OPTIONS] <FILE>...   # Run Brainfuck program files
  {0} eval   [OPTIONS] "<code>"    # Run Brainfuck code (args are concatenated)
  {0} tokens [--file <PATH>|"<code>"] # List the instruction stream

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Eval(eval::EvalArgs),
    Tokens(tokens::TokensArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    let Some(command) = cli.command.filter(|_| !cli.help) else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };

    // Ctrl+C cancels the running program; its partial output is still printed
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
    }

    let code = match command {
        Command::Run(args) => run::run(&program, args, &cancel),
        Command::Eval(args) => eval::run(&program, args, &cancel),
        Command::Tokens(args) => tokens::run(&program, args),
    };

    let _ = io::stdout().flush();
    std::process::exit(code);
}
