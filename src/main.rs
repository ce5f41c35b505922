mod cli_util;
mod commands;
mod config;
mod repl;
mod theme;

use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::{fmt, EnvFilter};

use commands::{check::CheckArgs, repl::ReplArgs, run::RunArgs, to_bf::ToBfArgs, to_inm::ToInmArgs};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run    [--bf] [--trace|-t] "<code>"      # Run InmFuck (or Brainfuck with --bf)
  {0} run    [--bf] [--trace|-t] --file <PATH> # Run source loaded from file
  {0} to-bf  [--output <PATH>] "<code>"        # Convert InmFuck to Brainfuck
  {0} to-inm [--output <PATH>] "<code>"        # Convert Brainfuck to InmFuck
  {0} check  [--bf] "<code>"                   # Validate loop brackets without running
  {0} repl   [--bare|--editor] [--bf]          # Start an InmFuck REPL (default with no subcommand)

Logging: set INM_LOG (or RUST_LOG), e.g. INM_LOG=debug, for internal trace events on stderr.

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "inmfuck", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    ToBf(ToBfArgs),
    ToInm(ToInmArgs),
    Check(CheckArgs),
    Repl(ReplArgs),
}

/// Internal events go to stderr; user-facing diagnostics are printed
/// directly by the commands.
fn init_logging() {
    let filter = EnvFilter::try_from_env("INM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("inmfuck"));

    init_logging();

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => commands::run::run(&program, args),
        Some(Command::ToBf(args)) => commands::to_bf::run(&program, args),
        Some(Command::ToInm(args)) => commands::to_inm::run(&program, args),
        Some(Command::Check(args)) => commands::check::run(&program, args),
        Some(Command::Repl(args)) => commands::repl::run(&program, args),
        None => commands::repl::run(
            &program,
            ReplArgs { bare: false, editor: false, bf: false, help: false },
        ),
    };

    std::process::exit(code);
}
