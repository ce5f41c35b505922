use clap::Args;
use std::io::{self, Write};

use inmfuck::{code_to_phrase, PhraseTable};

use crate::cli_util::{emit, print_diagnostics, read_source};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ToInmArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Write the InmFuck text to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: ToInmArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let ToInmArgs { file, output, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let source = match read_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let rendered = code_to_phrase(PhraseTable::canonical(), &source);
    print_diagnostics(Some(program), &rendered.diagnostics);

    emit(program, &rendered.text, output.as_deref())
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} to-inm [--output <PATH>] "<code>"
  {0} to-inm [--output <PATH>] --file <PATH>

Options:
  --file,   -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --output, -o <PATH>  Write the InmFuck text to PATH (.inm recommended) instead of stdout
  --help,   -h         Show this help

Description:
  Converts Brainfuck to InmFuck phrases. Characters outside ><+-.,[] are
  reported on stderr, one line each, and left out of the result.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
