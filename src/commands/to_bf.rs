use clap::Args;
use std::io::{self, Write};

use inmfuck::{check, phrase_to_code, PhraseTable};

use crate::cli_util::{emit, print_diagnostics, print_error, read_source};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ToBfArgs {
    /// Read InmFuck source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Write the Brainfuck to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// Concatenated InmFuck source parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: ToBfArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let ToBfArgs { file, output, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let source = match read_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let tokenized = phrase_to_code(PhraseTable::canonical(), &source);
    print_diagnostics(Some(program), &tokenized.diagnostics);

    let bf = tokenized.program.to_string();
    // Refuse to emit a program that could never run.
    if let Err(err) = check(&tokenized.program) {
        print_error(Some(program), &bf, &err);
        return 1;
    }

    emit(program, &bf, output.as_deref())
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} to-bf [--output <PATH>] "<code>"
  {0} to-bf [--output <PATH>] --file <PATH>

Options:
  --file,   -f <PATH>  Read InmFuck source from PATH instead of positional "<code>"
  --output, -o <PATH>  Write the Brainfuck to PATH (.bf recommended) instead of stdout
  --help,   -h         Show this help

Description:
  Converts InmFuck phrases to Brainfuck. Phrases are matched longest first;
  unrecognized fragments are reported on stderr and skipped. The result is
  checked for balanced loop brackets before it is written.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
