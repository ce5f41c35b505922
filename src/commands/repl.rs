use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::repl::{execute_bare_once, repl_loop, select_mode, Dialect, ModeFlagOverride, ReplMode};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Read submissions as Brainfuck instead of InmFuck phrases
    #[arg(long = "bf")]
    pub bf: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        match (self.bare, self.editor) {
            (true, _) => ModeFlagOverride::Bare,
            (_, true) => ModeFlagOverride::Editor,
            _ => ModeFlagOverride::None,
        }
    }
}

pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let dialect = if args.bf { Dialect::Bf } else { Dialect::Inm };

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("InmFuck REPL (interactive editor mode)");
                eprintln!("Ctrl+d/Ctrl+z Enter (Windows) executes the current buffer. :help lists meta commands. Press ctrl+c to exit");
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(dialect) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }

            0
        }
        ReplMode::Bare => match execute_bare_once(dialect) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                1
            }
        },
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start an InmFuck REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)
  --bf                Read submissions as Brainfuck instead of InmFuck phrases

Description:
  Starts a REPL where you can enter InmFuck phrases and execute them live.
  Phrases are highlighted by the instruction they stand for.

Meta commands (line starts with ":")
  :exit            Exit immediately (code 0)
  :help            Show the meta command list
  :mode inm|bf     Switch the input language

Notes:
    - Unrecognized fragments are reported on stderr and skipped.
    - Ctrl+D executes the current buffer on *nix/macOS.
    - Ctrl+Z and Enter will execute the current buffer on Windows.
    - Ctrl+C exits the REPL immediately.
    - Each execution starts with a fresh tape and pointer.
    - The REPL will exit after a single execution if the environment variable `INM_REPL_ONCE` is set to `1`.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: INM_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
