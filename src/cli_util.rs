use std::fs;
use std::io::{self, Write};

use inmfuck::{Diagnostic, InmError, TraceRow};

/// Pretty-print a structured InmError with caret positioning.
/// If `program` is `Some("inmfuck")`, prefix messages with "inmfuck: ...".
/// `code` is the instruction stream the positions refer to.
pub fn print_error(program: Option<&str>, code: &str, err: &InmError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        InmError::UnmatchedBracket { position, kind } => {
            let msg = prefix_program(&format!(
                "Syntax error: unmatched {kind} bracket '{}'",
                kind.symbol()
            ));
            print_error_with_context(&msg, code, *position);
        }
        InmError::StepLimitExceeded { .. } | InmError::Canceled => {
            eprintln!("{}", prefix_program(&err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Print each diagnostic on its own line, then a total for unrecognized
/// fragments if there were any.
pub fn print_diagnostics(program: Option<&str>, diagnostics: &[Diagnostic]) {
    let prefix = program.map(|p| format!("{p}: ")).unwrap_or_default();
    let mut unknown = 0usize;

    for d in diagnostics {
        if matches!(d, Diagnostic::UnrecognizedFragment { .. }) {
            unknown += 1;
        }
        eprintln!("{prefix}warning: {d}");
    }
    if unknown > 0 {
        eprintln!("{prefix}warning: {unknown} unrecognized phrase fragment(s) in total");
    }
    let _ = io::stderr().flush();
}

/// Column header for trace runs.
pub fn print_trace_header() {
    println!("STEP | IP  | PTR | CELL | INSTR | ACTION");
    println!("-----+-----+-----+------+-------+------------------------------------------------");
}

pub fn print_trace_row(row: &TraceRow) {
    println!("{}", trace_line(row));
}

fn trace_line(row: &TraceRow) -> String {
    format!(
        "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
        row.step, row.ip, row.pointer, row.cell, row.instr, row.action
    )
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at position {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .collect();
    eprintln!("  {slice}");

    let caret_offset_chars = pos.saturating_sub(start_char);
    eprintln!("  {}^", " ".repeat(caret_offset_chars));
    let _ = io::stderr().flush();
}

/// Resolve program source from `--file PATH` or concatenated positional
/// parts. File contents are trimmed. On failure the usage or I/O problem has
/// already been reported and the exit code is returned as the error.
pub fn read_source(program: &str, file: Option<String>, parts: Vec<String>) -> Result<String, i32> {
    if file.is_some() && !parts.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        let _ = io::stderr().flush();
        return Err(2);
    }

    let source = match file {
        Some(path) => match fs::read_to_string(&path) {
            Ok(s) => s.trim().to_string(),
            Err(e) => {
                eprintln!("{program}: failed to read {path} as UTF-8: {e}");
                let _ = io::stderr().flush();
                return Err(1);
            }
        },
        None => parts.join(""),
    };

    if source.is_empty() {
        eprintln!("{program}: no source given (empty file or missing code)");
        let _ = io::stderr().flush();
        return Err(2);
    }
    Ok(source)
}

/// Write `text` to `path`, or to stdout followed by a newline when no path
/// is given.
pub fn emit(program: &str, text: &str, output: Option<&str>) -> i32 {
    match output {
        Some(path) => match fs::write(path, text) {
            Ok(()) => {
                eprintln!("{program}: wrote {path}");
                let _ = io::stderr().flush();
                0
            }
            Err(e) => {
                eprintln!("{program}: failed to write {path}: {e}");
                let _ = io::stderr().flush();
                1
            }
        },
        None => {
            println!("{text}");
            let _ = io::stdout().flush();
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn trace_line_lines_up_with_the_header() {
        let row = TraceRow {
            step: 3,
            ip: 1,
            pointer: 0,
            cell: 255,
            instr: ']',
            action: "Cell != 0; jump back to matching '[' at IP 1".to_string(),
        };
        assert_eq!(
            trace_line(&row),
            "3    | 1   | 0   | 255  |  ]    | Cell != 0; jump back to matching '[' at IP 1"
        );
    }

    #[test]
    fn read_source_joins_positional_parts() {
        let got = read_source("inmfuck", None, vec!["++".into(), "-".into()]);
        assert_eq!(got, Ok("++-".to_string()));
    }

    #[test]
    fn read_source_trims_file_contents() {
        let mut tf = tempfile::NamedTempFile::new().unwrap();
        write!(tf, "  +.\n\n").unwrap();
        let path = tf.path().to_string_lossy().into_owned();
        assert_eq!(read_source("inmfuck", Some(path), vec![]), Ok("+.".to_string()));
    }

    #[test]
    fn read_source_rejects_empty_and_conflicting_input() {
        assert_eq!(read_source("inmfuck", None, vec![]), Err(2));
        assert_eq!(read_source("inmfuck", Some("x".into()), vec!["+".into()]), Err(2));
        assert_eq!(read_source("inmfuck", Some("/nonexistent/path.inm".into()), vec![]), Err(1));
    }
}
