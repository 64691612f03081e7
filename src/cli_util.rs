use std::io::{self, Write};

use crate::InterpreterError;

/// Pretty-print an [`InterpreterError`] against the source it came from.
/// If `program` is `Some("bfrun")`, messages are prefixed with "bfrun: ..."
/// for CLI use.
pub fn print_interpreter_error(program: Option<&str>, source: &str, err: &InterpreterError) {
    let prefix = |msg: String| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg
        }
    };

    match err {
        InterpreterError::Syntax {
            line,
            column,
            message,
        } => {
            eprintln!(
                "{}",
                prefix(format!("syntax error at {line}:{column}: {message}"))
            );
            print_source_context(source, *line, *column);
        }
        InterpreterError::Io(cause) => {
            eprintln!("{}", prefix(format!("I/O error: {cause}")));
        }
    }
    let _ = io::stderr().flush();
}

/// Show the offending source line with a caret under the reported column.
fn print_source_context(source: &str, line: usize, column: usize) {
    let Some(text) = source.lines().nth(line.saturating_sub(1)) else {
        return;
    };
    eprintln!("  {text}");

    let mut underline = String::new();
    for _ in 1..column {
        underline.push(' ');
    }
    underline.push('^');
    eprintln!("  {underline}");
}
