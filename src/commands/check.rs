use clap::Args;
use std::io::{self, Write};

use inmfuck::check;

use crate::cli_util::{print_diagnostics, print_error, read_source};
use crate::commands::run::tokenize;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Treat the source as Brainfuck instead of InmFuck phrases
    #[arg(long = "bf")]
    pub bf: bool,

    /// Read source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated source parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let CheckArgs { bf, file, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let source = match read_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let tokenized = tokenize(&source, bf);
    print_diagnostics(Some(program), &tokenized.diagnostics);

    match check(&tokenized.program) {
        Ok(()) => {
            eprintln!("{program}: ok ({} instructions)", tokenized.program.len());
            let _ = io::stderr().flush();
            0
        }
        Err(err) => {
            print_error(Some(program), &tokenized.program.to_string(), &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check [--bf] "<code>"
  {0} check [--bf] --file <PATH>

Options:
  --file, -f <PATH>  Read source from PATH instead of positional "<code>"
  --bf               Source is Brainfuck rather than InmFuck phrases
  --help, -h         Show this help

Description:
  Decodes the source and verifies that every loop bracket is matched,
  without running it. Exits 0 when the program is valid, 1 otherwise.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
