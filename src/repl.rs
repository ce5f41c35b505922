use std::env;
use std::io::{self, IsTerminal, Read, Write};

use nu_ansi_term::Style;
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText};

use inmfuck::{phrase::is_instruction, PhraseTable};

use crate::cli_util;
use crate::commands::run::{execute, tokenize, RunOptions};
use crate::config::{config, Colors};

/// Which language submissions are read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Inm,
    Bf,
}

impl Dialect {
    fn prompt(self) -> &'static str {
        match self {
            Dialect::Inm => "inm",
            Dialect::Bf => "bf",
        }
    }
}

/// Outcome of a `:` meta command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meta {
    Exit,
    Help,
    Switch(Dialect),
    Unknown,
}

/// Recognize a meta command. Returns `None` for ordinary source.
pub fn parse_meta(line: &str) -> Option<Meta> {
    let rest = line.trim().strip_prefix(':')?;
    let mut words = rest.split_whitespace();
    Some(match (words.next(), words.next()) {
        (Some("exit"), None) => Meta::Exit,
        (Some("help"), None) => Meta::Help,
        (Some("mode"), Some("inm")) => Meta::Switch(Dialect::Inm),
        (Some("mode"), Some("bf")) => Meta::Switch(Dialect::Bf),
        _ => Meta::Unknown,
    })
}

pub fn repl_loop(start: Dialect) -> io::Result<()> {
    let mut dialect = start;
    let mut editor = init_line_editor(dialect);

    loop {
        let submission = read_submission_interactive(&mut editor, dialect)?;
        let Some(submission) = submission else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        let trimmed = submission.trim();
        if trimmed.is_empty() {
            continue; // Ignore empty submissions
        }

        match parse_meta(trimmed) {
            Some(Meta::Exit) => return Ok(()),
            Some(Meta::Help) => {
                print_meta_help();
                continue;
            }
            Some(Meta::Switch(d)) => {
                dialect = d;
                editor = init_line_editor(dialect);
                eprintln!("switched to {} input", dialect.prompt());
                continue;
            }
            Some(Meta::Unknown) => {
                eprintln!("unknown meta command: {trimmed} (try :help)");
                continue;
            }
            None => {}
        }

        execute_buffer(trimmed, dialect);

        // Test hook: if INM_REPL_ONCE=1, exit after one execution
        if env::var("INM_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

fn init_line_editor(dialect: Dialect) -> reedline::Reedline {
    use reedline::{
        default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
    };

    // Start from default emacs-like bindings and adjust:
    // - Enter -> InsertNewLine (do not submit)
    // - Ctrl+D -> AcceptLine (submit)
    // - Ctrl+Z -> AcceptLine (submit, for Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    // Alt+Up/Alt+Down to navigate history items.
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);

    Reedline::create()
        .with_highlighter(Box::new(SourceHighlighter::new(dialect, &config().colors)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
}

/// Read everything until EOF. `None` if there was nothing or the read failed.
pub fn read_submission<R: Read>(input: &mut R) -> Option<String> {
    let mut buffer = String::new();
    match input.read_to_string(&mut buffer) {
        Ok(_) if !buffer.is_empty() => Some(buffer),
        _ => None,
    }
}

fn read_submission_interactive(
    editor: &mut reedline::Reedline,
    dialect: Dialect,
) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(dialect.prompt().to_string()),
        DefaultPromptSegment::Empty,
    );

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

/// Decode and run one submission on a fresh machine.
/// - Program output goes to stdout.
/// - Diagnostics and errors are printed concisely to stderr.
/// - A newline is always written to stdout after execution (success or error)
///   so that the prompt begins at column 0 on the next iteration.
fn execute_buffer(buffer: &str, dialect: Dialect) {
    let tokenized = tokenize(buffer, dialect == Dialect::Bf);
    cli_util::print_diagnostics(None, &tokenized.diagnostics);
    if !tokenized.program.is_empty() {
        execute(None, tokenized, RunOptions::resolve(false, None, None));
    }
    println!();
    let _ = io::stdout().flush();
}

fn print_meta_help() {
    eprintln!(
        r#"Meta commands (line starts with ":")
  :exit            Exit immediately (code 0)
  :help            Show this help
  :mode inm|bf     Read submissions as InmFuck phrases or Brainfuck
Ctrl+D submits the buffer; Enter inserts a newline."#
    );
    let _ = io::stderr().flush();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !io::stdin().is_terminal() {
                return Err("cannot start editor: stdin is not a TTY (use --bare or INM_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Ok(val) = env::var("INM_REPL_MODE") {
        let v = val.trim().to_ascii_lowercase();
        return match v.as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !io::stdin().is_terminal() {
                    return Err("cannot start editor: stdin is not a TTY (use INM_REPL_MODE=bare)".to_string());
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!("invalid INM_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if io::stdin().is_terminal() {
        Ok(ReplMode::Editor)
    } else {
        Ok(ReplMode::Bare)
    }
}

/// Bare mode: read stdin until EOF, execute it once.
pub fn execute_bare_once(dialect: Dialect) -> io::Result<()> {
    // The lock must be released before running; ',' reads stdin too.
    let submission = read_submission(&mut io::stdin().lock());
    let Some(s) = submission else {
        return Ok(());
    };

    let trimmed = s.trim();
    match parse_meta(trimmed) {
        Some(Meta::Exit) => {}
        Some(Meta::Help) => print_meta_help(),
        Some(Meta::Switch(_)) | Some(Meta::Unknown) => {
            eprintln!("meta commands other than :exit and :help need the interactive editor");
        }
        None if trimmed.is_empty() => {}
        None => execute_buffer(trimmed, dialect),
    }
    Ok(())
}

/// Colours phrases (or Brainfuck characters) by the instruction they stand
/// for; everything else is dimmed.
struct SourceHighlighter {
    dialect: Dialect,
    table: &'static PhraseTable,
    styles: [(char, Style); 8],
    other: Style,
}

impl SourceHighlighter {
    fn new(dialect: Dialect, colors: &Colors) -> Self {
        let bold = |c| Style::new().fg(c).bold();
        Self {
            dialect,
            table: PhraseTable::canonical(),
            styles: [
                ('>', bold(colors.op_right)),
                ('<', bold(colors.op_left)),
                ('+', bold(colors.op_inc)),
                ('-', bold(colors.op_dec)),
                ('.', bold(colors.op_output)),
                (',', bold(colors.op_input)),
                ('[', bold(colors.op_bracket)),
                (']', bold(colors.op_bracket)),
            ],
            other: Style::new().fg(colors.unknown),
        }
    }

    fn style_for(&self, code: char) -> Style {
        self.styles
            .iter()
            .find(|(c, _)| *c == code)
            .map_or(self.other, |(_, s)| *s)
    }

    /// Split `line` into (style, text) runs.
    fn runs(&self, line: &str) -> Vec<(Style, String)> {
        let mut out: Vec<(Style, String)> = Vec::new();
        // Adjacent runs with the same style are merged.
        let mut push = |style: Style, text: &str| {
            if let Some((s, buf)) = out.last_mut() {
                if *s == style {
                    buf.push_str(text);
                    return;
                }
            }
            out.push((style, text.to_string()));
        };

        let mut byte = 0usize;
        while byte < line.len() {
            let rest = &line[byte..];
            let matched = match self.dialect {
                Dialect::Inm => self
                    .table
                    .longest_prefix(rest)
                    .map(|e| (e.code(), e.phrase().len())),
                Dialect::Bf => rest
                    .chars()
                    .next()
                    .filter(|c| is_instruction(*c))
                    .map(|c| (c, 1)),
            };

            match matched {
                Some((code, len)) => {
                    push(self.style_for(code), &rest[..len]);
                    byte += len;
                }
                None => {
                    let len = rest.chars().next().map_or(1, char::len_utf8);
                    push(self.other, &rest[..len]);
                    byte += len;
                }
            }
        }
        out
    }
}

impl Highlighter for SourceHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        for run in self.runs(line) {
            out.push(run);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_submission_reads_until_eof_multiple_lines() {
        let input = b"+++\n>+.\n";
        let mut cursor = Cursor::new(&input[..]);
        let got = read_submission(&mut cursor);
        assert_eq!(got.as_deref(), Some("+++\n>+.\n"));
    }

    #[test]
    fn read_submission_empty_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let got = read_submission(&mut cursor);
        assert!(got.is_none());
    }

    #[test]
    fn meta_commands() {
        assert_eq!(parse_meta(":exit"), Some(Meta::Exit));
        assert_eq!(parse_meta("  :help "), Some(Meta::Help));
        assert_eq!(parse_meta(":mode bf"), Some(Meta::Switch(Dialect::Bf)));
        assert_eq!(parse_meta(":mode inm"), Some(Meta::Switch(Dialect::Inm)));
        assert_eq!(parse_meta(":nope"), Some(Meta::Unknown));
        assert_eq!(parse_meta("やりますねぇ！"), None);
    }

    #[test]
    fn highlighter_groups_whole_phrases() {
        let h = SourceHighlighter::new(Dialect::Inm, &Colors::default());
        let runs = h.runs("やりますねぇ！やりますねぇ！xで、出ますよ");
        let texts: Vec<&str> = runs.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["やりますねぇ！やりますねぇ！", "x", "で、出ますよ"]);
        assert_eq!(runs[0].0, h.style_for('+'));
        assert_eq!(runs[1].0, h.other);
        assert_eq!(runs[2].0, h.style_for('.'));
    }

    #[test]
    fn highlighter_in_bf_mode_styles_single_chars() {
        let h = SourceHighlighter::new(Dialect::Bf, &Colors::default());
        let runs = h.runs("[a]");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].0, h.style_for('['));
        assert_eq!(runs[1].0, h.other);
    }
}
