use clap::Args;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use crate::cli_util::{end_marker, print_aborted, print_load_error};
use crate::config::{Overrides, Settings};
use crate::{load_source, Interpreter, LoadError, RunAborted, StepControl};

/// Flags shared by every command that executes a program.
#[derive(Args, Debug, Default)]
pub struct ExecArgs {
    /// Cell width in bits: 8, 16, 32 or 64 (fallback BF_BITS, then bf.toml; default 8)
    #[arg(short = 'b', long = "bits", value_name = "N")]
    pub bits: Option<u32>,

    /// Print a step-by-step table of operations instead of the program output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl ExecArgs {
    pub fn settings(&self) -> Settings {
        Settings::resolve(&Overrides {
            bits: self.bits,
            max_steps: self.max_steps,
            timeout_ms: self.timeout_ms,
        })
    }
}

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    #[command(flatten)]
    pub exec: ExecArgs,

    /// Program files to run, in order
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// How a single program execution ended.
pub enum Outcome {
    Completed(String),
    Aborted { reason: RunAborted, timed_out: bool },
    Failed(io::Error),
}

pub fn run(program: &str, args: RunArgs, cancel: &Arc<AtomicBool>) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.files.is_empty() {
        usage_and_exit(program, 2);
    }

    let settings = args.exec.settings();
    let multi = args.files.len() > 1;
    let mut exit_code = 0;

    for path in &args.files {
        if cancel.load(Ordering::Relaxed) {
            return 1;
        }

        let source = match load_source(path) {
            Ok(s) => s,
            Err(e) => {
                print_load_error(program, path, None, &LoadError::from(e));
                exit_code = 1;
                continue;
            }
        };

        let interp = match Interpreter::from_source(&source, settings.width.bits()) {
            Ok(i) => i,
            Err(e) => {
                print_load_error(program, path, Some(&source), &LoadError::from(e));
                exit_code = 1;
                continue;
            }
        };

        if multi {
            println!("-- {path} --");
        }

        let ok = report(program, execute(interp, &settings, args.exec.debug, cancel), &settings, multi);
        if !ok {
            exit_code = 1;
        }
    }

    exit_code
}

/// Print an outcome: program output to stdout, diagnostics to stderr.
/// With `marked`, non-newline-terminated output is followed by the `⏎` marker.
pub fn report(program: &str, outcome: Outcome, settings: &Settings, marked: bool) -> bool {
    match outcome {
        Outcome::Completed(output) => {
            emit(&output, marked);
            true
        }
        Outcome::Aborted { reason, timed_out } => {
            emit(reason.partial_output(), marked);
            print_aborted(&reason, if timed_out { settings.timeout_ms } else { None });
            false
        }
        Outcome::Failed(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            false
        }
    }
}

fn emit(output: &str, marked: bool) {
    print!("{output}");
    if marked {
        if let Some(marker) = end_marker(output) {
            println!("{marker}");
        }
    }
    let _ = io::stdout().flush();
}

/// Execute `interp` under the resolved limits.
///
/// Without a timeout the run happens on the calling thread. With one, it runs
/// on a worker thread and is cancelled through `cancel` once the deadline
/// passes; the flag is reset afterwards so later runs are unaffected.
pub fn execute(interp: Interpreter, settings: &Settings, debug: bool, cancel: &Arc<AtomicBool>) -> Outcome {
    let ctrl = StepControl::new(settings.max_steps, Arc::clone(cancel));

    let Some(timeout_ms) = settings.timeout_ms else {
        return run_worker(&interp, &ctrl, debug);
    };

    let (tx, rx) = mpsc::channel::<Outcome>();
    let worker_ctrl = ctrl.clone();
    thread::spawn(move || {
        let _ = tx.send(run_worker(&interp, &worker_ctrl, debug));
    });

    match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
        Ok(outcome) => outcome,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            let outcome = rx
                .recv()
                .unwrap_or_else(|_| Outcome::Failed(io::Error::other("interpreter thread exited unexpectedly")));
            cancel.store(false, Ordering::Relaxed);
            match outcome {
                Outcome::Aborted { reason: reason @ RunAborted::Canceled { .. }, .. } => Outcome::Aborted {
                    reason,
                    timed_out: true,
                },
                other => other,
            }
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Outcome::Failed(io::Error::other("interpreter thread exited unexpectedly"))
        }
    }
}

fn run_worker(interp: &Interpreter, ctrl: &StepControl, debug: bool) -> Outcome {
    let result = if debug {
        let mut out = io::stdout().lock();
        match interp.run_debug_with_control(&mut out, ctrl) {
            // The table replaces the program output
            Ok(r) => r.map(|_| String::new()).map_err(|reason| match reason {
                RunAborted::StepLimitExceeded { limit, .. } => RunAborted::StepLimitExceeded { limit, output: String::new() },
                RunAborted::Canceled { .. } => RunAborted::Canceled { output: String::new() },
            }),
            Err(e) => return Outcome::Failed(e),
        }
    } else {
        interp.run_with_control(ctrl)
    };

    match result {
        Ok(output) => Outcome::Completed(output),
        Err(reason) => Outcome::Aborted {
            reason,
            timed_out: false,
        },
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] <FILE>...

Options:
  --bits,  -b <N>   Cell width: 8, 16, 32 or 64 (anything else means 8)
  --debug, -d       Print a step-by-step table of operations instead of the output
  --max-steps <N>   Abort after N steps
  --timeout <MS>    Abort after MS milliseconds of wall-clock time
  --help,  -h       Show this help

Notes:
- With one FILE the program output is printed as-is.
- With several FILEs each output is preceded by "-- FILE --" and followed by
  "⏎" when it does not end in a newline.
- Characters outside of Brainfuck's ><+-.,[] are ignored; `,` does nothing.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
