use clap::Args;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use inmfuck::{parse_code, phrase_to_code, InmError, Machine, PhraseTable, RunSummary, StepControl, Tokenized};

use crate::cli_util::{print_diagnostics, print_error, print_trace_header, print_trace_row, read_source};
use crate::config::config;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Treat the source as Brainfuck instead of InmFuck phrases
    #[arg(long = "bf")]
    pub bf: bool,

    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Read source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated source parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Wall-clock timeout in milliseconds (fallback INM_TIMEOUT_MS, then config; default unlimited)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback INM_MAX_STEPS, then config; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Resolved execution options for one program.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub trace: bool,
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<u64>,
}

impl RunOptions {
    /// Resolve limits: flags -> env -> config file -> unlimited.
    pub fn resolve(trace: bool, timeout_ms: Option<u64>, max_steps: Option<u64>) -> Self {
        let limits = &config().limits;
        let timeout_ms = timeout_ms
            .or_else(|| env_u64("INM_TIMEOUT_MS"))
            .or(limits.timeout_ms);
        let max_steps = max_steps
            .or_else(|| env_u64("INM_MAX_STEPS"))
            .or(limits.max_steps);
        Self { trace, timeout_ms, max_steps }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        bf,
        trace,
        file,
        code,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let source = match read_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let tokenized = tokenize(&source, bf);
    print_diagnostics(Some(program), &tokenized.diagnostics);

    let opts = RunOptions::resolve(trace, timeout_ms, max_steps);
    let exit_code = execute(Some(program), tokenized, opts);

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

/// Decode source as InmFuck phrases, or as raw Brainfuck when `bf` is set.
pub fn tokenize(source: &str, bf: bool) -> Tokenized {
    if bf {
        parse_code(source)
    } else {
        phrase_to_code(PhraseTable::canonical(), source)
    }
}

/// Validate and execute a decoded program. Output goes to stdout, notices
/// and errors to stderr. Returns the process exit code.
pub fn execute(program: Option<&str>, tokenized: Tokenized, opts: RunOptions) -> i32 {
    let code_str = tokenized.program.to_string();

    let mut machine = match Machine::new(tokenized.program) {
        Ok(m) => m,
        Err(err) => {
            print_error(program, &code_str, &err);
            return 1;
        }
    };

    let prefix = program.map(|p| format!("{p}: ")).unwrap_or_default();
    machine.set_notice_sink(move |notice| {
        eprintln!("\n{prefix}warning: {notice}");
        let _ = io::stderr().flush();
    });
    machine.set_output_sink(|c| print!("{c}"));
    machine.set_trace_sink(print_trace_row);

    let clock = InputClock::default();
    if io::stdin().is_terminal() {
        machine.set_input_provider(clock.wrap(prompt_for_char));
    } else {
        machine.set_input_provider(|| read_char(&mut io::stdin().lock()));
    }

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Result<RunSummary, InmError>>();
    let cancel_clone = cancel.clone();
    let max_steps = opts.max_steps.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
    let trace = opts.trace;

    thread::spawn(move || {
        let ctrl = StepControl::new(max_steps, cancel_clone);
        let res = if trace {
            print_trace_header();
            machine.run_trace_with_control(ctrl)
        } else {
            machine.run_with_control(ctrl)
        };
        let _ = io::stdout().flush();
        let _ = tx.send(res);
    });

    match wait_for_run(&rx, opts.timeout_ms, &clock) {
        Ok(Ok(summary)) => {
            tracing::debug!(steps = summary.steps, "run finished");
            0
        }
        Ok(Err(InmError::Canceled)) | Err(RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            let ms = opts.timeout_ms.unwrap_or_default();
            eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(err)) => {
            print_error(program, &code_str, &err);
            1
        }
        Err(RecvTimeoutError::Disconnected) => 1,
    }
}

const PROMPT_POLL: Duration = Duration::from_millis(50);

/// Time the worker has spent blocked at the terminal prompt. That time is
/// not charged against the wall-clock timeout, so a timeout never fires
/// while a read is pending.
#[derive(Clone, Default)]
struct InputClock {
    waiting: Arc<AtomicBool>,
    waited_ms: Arc<AtomicU64>,
}

impl InputClock {
    fn wrap<F>(&self, mut read: F) -> impl FnMut() -> Option<char> + Send + 'static
    where
        F: FnMut() -> Option<char> + Send + 'static,
    {
        let clock = self.clone();
        move || {
            clock.waiting.store(true, Ordering::SeqCst);
            let started = Instant::now();
            let ch = read();
            let ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            clock.waited_ms.fetch_add(ms, Ordering::SeqCst);
            clock.waiting.store(false, Ordering::SeqCst);
            ch
        }
    }

    fn waiting(&self) -> bool {
        self.waiting.load(Ordering::SeqCst)
    }

    fn waited(&self) -> Duration {
        Duration::from_millis(self.waited_ms.load(Ordering::SeqCst))
    }
}

/// Wait for the worker's result, giving up once it has run for `timeout_ms`
/// outside the input prompt.
fn wait_for_run<T>(
    rx: &mpsc::Receiver<T>,
    timeout_ms: Option<u64>,
    clock: &InputClock,
) -> Result<T, RecvTimeoutError> {
    let Some(ms) = timeout_ms else {
        return rx.recv().map_err(|_| RecvTimeoutError::Disconnected);
    };
    let budget = Duration::from_millis(ms);
    let started = Instant::now();

    loop {
        let wait = if clock.waiting() {
            PROMPT_POLL
        } else {
            let used = started.elapsed().saturating_sub(clock.waited());
            budget.saturating_sub(used)
        };
        if wait.is_zero() {
            return Err(RecvTimeoutError::Timeout);
        }
        match rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => continue,
            other => return other,
        }
    }
}

fn prompt_for_char() -> Option<char> {
    prompt_with(&mut io::stdout(), &mut io::stderr(), &mut io::stdin().lock())
}

/// Ask for one character. Program output still buffered in `out` is flushed
/// first so it shows up ahead of the prompt. An empty line reads as NUL;
/// end of input counts as exhausted.
fn prompt_with<O, E, I>(out: &mut O, err: &mut E, input: &mut I) -> Option<char>
where
    O: Write,
    E: Write,
    I: BufRead,
{
    let _ = out.flush();
    let _ = write!(err, "Input (1 char): ");
    let _ = err.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).chars().next().unwrap_or('\0')),
    }
}

/// Read one UTF-8 character. `None` on EOF or read failure; undecodable
/// bytes come back as U+FFFD.
fn read_char<R: Read>(input: &mut R) -> Option<char> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf[..1]).ok()?;

    let width = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    };
    if width > 1 && input.read_exact(&mut buf[1..width]).is_err() {
        return Some(char::REPLACEMENT_CHARACTER);
    }

    Some(
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER),
    )
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--bf] [--trace|-t] "<code>"
  {0} run [--bf] [--trace|-t] --file <PATH>

Options:
  --file,  -f <PATH>  Read source from PATH instead of positional "<code>"
  --bf                Source is Brainfuck rather than InmFuck phrases
  --trace, -t         Print a step-by-step table of operations instead of executing
  --timeout <MS>      Abort after MS milliseconds of wall-clock time
  --max-steps <N>     Abort after N executed instructions
  --help,  -h         Show this help

Notes:
- Unrecognized phrase fragments are reported on stderr and skipped.
- Unmatched loop brackets are reported and the program is not run.
- Input (`,`) prompts for one character when stdin is a terminal, otherwise
  reads the next character from stdin; at end of input the cell is set to 0.
- Limits fall back to INM_TIMEOUT_MS / INM_MAX_STEPS, then to the [limits]
  section of inmfuck.toml in the user config directory.
- Time spent waiting at the input prompt does not count toward --timeout.

Examples:
- Run an InmFuck file:
    {0} run --file ./program.inm
- Run Brainfuck, feeding `,` from a file:
    {0} run --bf ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
