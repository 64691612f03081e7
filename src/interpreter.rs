//! Program binding and the execution engine.
//!
//! A program is bound once: the source is scanned, non-instruction
//! characters are dropped as comments, and every `[`/`]` pair is resolved
//! into a jump table. Execution then dispatches instructions against a
//! [`Tape`]/[`Pointer`] pair until the program ends or a suspension
//! condition fires (a registered stop point, or end of input when the
//! caller asked to stop there).

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Read, Write};

use crate::tape::{Pointer, Tape};

/// The eight instructions of the language. Everything else in a source text
/// is a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `+`: increment the current cell, wrapping at 255.
    Inc,
    /// `-`: decrement the current cell, wrapping at 0.
    Dec,
    /// `>`: move the pointer one cell right.
    Right,
    /// `<`: move the pointer one cell left.
    Left,
    /// `[`: jump past the matching `]` when the current cell is 0.
    JumpIfZero,
    /// `]`: jump back to the matching `[` when the current cell is not 0.
    JumpIfNonzero,
    /// `.`: write the current cell to the output sink.
    Output,
    /// `,`: read one byte from the input source into the current cell.
    Input,
}

impl Op {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '+' => Op::Inc,
            '-' => Op::Dec,
            '>' => Op::Right,
            '<' => Op::Left,
            '[' => Op::JumpIfZero,
            ']' => Op::JumpIfNonzero,
            '.' => Op::Output,
            ',' => Op::Input,
            _ => return None,
        })
    }
}

/// Errors surfaced while binding or running a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// The program's brackets do not pair up. Detected once, at bind time;
    /// never seen during execution.
    #[error("{line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A stream failed mid-run in a way that is not plain end-of-input.
    /// Fatal to the run; nothing is retried.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn syntax_error(line: usize, column: usize, message: &str) -> InterpreterError {
    InterpreterError::Syntax {
        line,
        column,
        message: message.to_string(),
    }
}

/// Scan `source` into an instruction stream and a bracket jump table.
///
/// Bracket positions are keyed by instruction-stream position, not raw
/// source position; comments shift line/column bookkeeping but not jumps.
fn bind(source: &str) -> Result<(Vec<Op>, HashMap<usize, usize>), InterpreterError> {
    let mut program = Vec::new();
    let mut brackets = HashMap::new();
    let mut open_stack: Vec<usize> = Vec::new();
    let mut line = 1usize;
    let mut column = 1usize;

    for c in source.chars() {
        if let Some(op) = Op::from_char(c) {
            let pos = program.len();
            match op {
                Op::JumpIfZero => open_stack.push(pos),
                Op::JumpIfNonzero => {
                    let Some(open) = open_stack.pop() else {
                        return Err(syntax_error(line, column, "expected '[' before ']'"));
                    };
                    brackets.insert(open, pos);
                    brackets.insert(pos, open);
                }
                _ => {}
            }
            program.push(op);
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    if !open_stack.is_empty() {
        return Err(syntax_error(line, column, "expected ']' before end of input"));
    }

    Ok((program, brackets))
}

/// The interpreter: a bound program plus one execution session.
///
/// The bound instruction stream and jump table are immutable for the life of
/// the value; tape, pointer, and program counter are per-session state that
/// [`reset`](Interpreter::reset) reinitializes. The interpreter owns its
/// streams exclusively; running one instance from multiple threads is
/// unsupported.
#[derive(Debug)]
pub struct Interpreter<R, W> {
    program: Vec<Op>,
    brackets: HashMap<usize, usize>,
    counter: usize,
    tape: Tape,
    pointer: Pointer,
    input: R,
    pushback: VecDeque<u8>,
    output: W,
}

impl<R: Read, W: Write> Interpreter<R, W> {
    /// Bind `source` and take ownership of the byte streams.
    ///
    /// Fails with [`InterpreterError::Syntax`] on unmatched brackets; no
    /// partially-bound interpreter is observable in that case.
    pub fn new(source: &str, output: W, input: R) -> Result<Self, InterpreterError> {
        let (program, brackets) = bind(source)?;
        Ok(Self {
            program,
            brackets,
            counter: 0,
            tape: Tape::new(),
            pointer: Pointer::origin(),
            input,
            pushback: VecDeque::new(),
            output,
        })
    }

    /// The current program counter: an index into the instruction stream.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Borrow the output sink.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Mutably borrow the output sink.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Mutably borrow the input source.
    pub fn input_mut(&mut self) -> &mut R {
        &mut self.input
    }

    /// Consume the interpreter and hand back its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Queue `bytes` ahead of the input stream. The next `,` instructions
    /// consume them in the given order before touching the underlying
    /// reader.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.pushback.push_front(b);
        }
    }

    /// Reset the session: counter to 0, fresh zeroed tape, pointer at the
    /// origin. The bound program and jump table are untouched, so the same
    /// interpreter can run its program any number of times.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.tape = Tape::new();
        self.pointer = Pointer::origin();
    }

    /// Reset, then execute to completion or suspension.
    ///
    /// Returns `Ok(false)` when the program ran off the end of its
    /// instruction stream, `Ok(true)` when it suspended on end of input with
    /// `stop_on_eof` set.
    pub fn run(&mut self, stop_on_eof: bool) -> Result<bool, InterpreterError> {
        self.run_with_stops(stop_on_eof, &HashSet::new())
    }

    /// Like [`run`](Interpreter::run), with a set of instruction-stream
    /// positions to suspend at. The stop check fires before the flagged
    /// instruction executes.
    pub fn run_with_stops(
        &mut self,
        stop_on_eof: bool,
        stops: &HashSet<usize>,
    ) -> Result<bool, InterpreterError> {
        self.reset();
        self.resume(stop_on_eof, stops)
    }

    /// The step loop without the reset: continue from the current counter.
    ///
    /// This is the primitive behind [`run`](Interpreter::run). After a
    /// suspension it picks up exactly where the previous call left off; an
    /// end-of-input suspension leaves the counter on the `,`, so the read is
    /// retried once more input arrives (see
    /// [`feed_input`](Interpreter::feed_input)).
    pub fn resume(
        &mut self,
        stop_on_eof: bool,
        stops: &HashSet<usize>,
    ) -> Result<bool, InterpreterError> {
        while self.counter < self.program.len() {
            if stops.contains(&self.counter) {
                return Ok(true);
            }
            let op = self.program[self.counter];
            match op {
                Op::Inc => {
                    let value = self.tape.get(self.pointer).wrapping_add(1);
                    self.tape.set(self.pointer, value);
                }
                Op::Dec => {
                    let value = self.tape.get(self.pointer).wrapping_sub(1);
                    self.tape.set(self.pointer, value);
                }
                Op::Right | Op::Left => {
                    self.pointer.shift(op == Op::Left);
                    self.tape.ensure(self.pointer);
                }
                Op::JumpIfZero => {
                    if self.tape.get(self.pointer) == 0 {
                        self.counter = self.brackets[&self.counter];
                    }
                }
                Op::JumpIfNonzero => {
                    if self.tape.get(self.pointer) != 0 {
                        self.counter = self.brackets[&self.counter];
                    }
                }
                Op::Output => {
                    self.output.write_all(&[self.tape.get(self.pointer)])?;
                    // Flush per byte so output is visible before any
                    // blocking read that follows.
                    self.output.flush()?;
                }
                Op::Input => match self.read_byte()? {
                    Some(b) => self.tape.set(self.pointer, b),
                    None => {
                        if stop_on_eof {
                            // Counter stays on the `,`; a later resume
                            // retries this read.
                            return Ok(true);
                        }
                        // Plain EOF leaves the cell as it is.
                    }
                },
            }
            self.counter += 1;
        }
        Ok(false)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, InterpreterError> {
        if let Some(b) = self.pushback.pop_front() {
            return Ok(Some(b));
        }
        let mut buf = [0u8; 1];
        match self.input.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(InterpreterError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_collect(source: &str, input: &[u8]) -> Vec<u8> {
        let mut bf = Interpreter::new(source, Vec::new(), input).expect("program should bind");
        let suspended = bf.run(false).expect("program should run");
        assert!(!suspended);
        bf.into_output()
    }

    #[test]
    fn outputs_incremented_cell() {
        assert_eq!(run_collect("+++.", b""), vec![3]);
    }

    #[test]
    fn echoes_input_byte() {
        assert_eq!(run_collect(",.", b"A"), vec![65]);
    }

    #[test]
    fn cell_arithmetic_wraps_both_ways() {
        assert_eq!(run_collect("-.", b""), vec![255]);
        let code = format!("{}.", "+".repeat(256));
        assert_eq!(run_collect(&code, b""), vec![0]);
    }

    #[test]
    fn loop_drains_cell_to_zero() {
        // Five iterations of [-] leave the cell at 0.
        assert_eq!(run_collect("+++++[-].", b""), vec![0]);
    }

    #[test]
    fn skips_loop_body_when_cell_is_zero() {
        assert_eq!(run_collect("[+++.].", b""), vec![0]);
    }

    #[test]
    fn tape_extends_left_of_the_origin() {
        // Walk left across the origin, store there, come back.
        assert_eq!(run_collect("<+++.>>-.", b""), vec![3, 255]);
    }

    #[test]
    fn comments_are_ignored_by_the_instruction_stream() {
        assert_eq!(run_collect("add 3 {+++} then print: .", b""), vec![3]);
    }

    #[test]
    fn eof_without_stop_leaves_cell_unchanged() {
        assert_eq!(run_collect("+++,.", b""), vec![3]);
    }

    #[test]
    fn eof_with_stop_suspends_before_the_read_takes_effect() {
        let mut bf = Interpreter::new(",.", Vec::new(), io::empty()).unwrap();
        assert!(bf.run(true).unwrap());
        assert!(bf.output().is_empty());
        assert_eq!(bf.counter(), 0);

        // Feeding input and resuming retries the same read.
        bf.feed_input(b"Z");
        assert!(!bf.resume(true, &HashSet::new()).unwrap());
        assert_eq!(bf.output(), b"Z");
    }

    #[test]
    fn fed_input_is_consumed_in_order_before_the_reader() {
        let mut bf = Interpreter::new(",.,.,.", Vec::new(), &b"C"[..]).unwrap();
        bf.feed_input(b"AB");
        assert!(!bf.run(false).unwrap());
        assert_eq!(bf.output(), b"ABC");
    }

    #[test]
    fn stop_point_suspends_before_the_flagged_instruction() {
        let mut bf = Interpreter::new("+++.", Vec::new(), io::empty()).unwrap();
        let stops: HashSet<usize> = [3].into_iter().collect();
        assert!(bf.run_with_stops(false, &stops).unwrap());
        assert_eq!(bf.counter(), 3);
        assert!(bf.output().is_empty());

        // Resuming without the stop set finishes the program.
        assert!(!bf.resume(false, &HashSet::new()).unwrap());
        assert_eq!(bf.output(), &[3]);
    }

    #[test]
    fn rerunning_resets_tape_pointer_and_counter() {
        let mut bf = Interpreter::new(">+++.", Vec::new(), io::empty()).unwrap();
        assert!(!bf.run(false).unwrap());
        assert!(!bf.run(false).unwrap());
        // Identical output both times: no state leaks across runs.
        assert_eq!(bf.output(), &[3, 3]);
    }

    #[test]
    fn bracket_map_is_an_involution() {
        let (program, brackets) = bind("[[-]>[+<]]").unwrap();
        assert_eq!(program.len(), 10);
        for (&from, &to) in &brackets {
            assert_eq!(brackets[&to], from);
            if program[from] == Op::JumpIfZero {
                assert!(to > from);
                assert_eq!(program[to], Op::JumpIfNonzero);
            }
        }
    }

    #[test]
    fn bracket_map_uses_instruction_positions_not_source_positions() {
        // The comment shifts source positions but not stream positions.
        let (_, brackets) = bind("comment [-]").unwrap();
        assert_eq!(brackets[&0], 2);
        assert_eq!(brackets[&2], 0);
    }

    #[test]
    fn unmatched_close_reports_line_and_column() {
        let err = Interpreter::new("++]", Vec::new(), io::empty()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::Syntax {
                line: 1,
                column: 3,
                ..
            }
        ));
    }

    #[test]
    fn unmatched_close_counts_comment_columns() {
        let err = Interpreter::new("ab]", Vec::new(), io::empty()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::Syntax {
                line: 1,
                column: 3,
                ..
            }
        ));
    }

    #[test]
    fn unmatched_open_reports_position_at_end_of_input() {
        let err = Interpreter::new("+[+\n+", Vec::new(), io::empty()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::Syntax {
                line: 2,
                column: 2,
                ..
            }
        ));
    }

    #[test]
    fn newlines_reset_the_error_column() {
        let err = Interpreter::new("++\n+]", Vec::new(), io::empty()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::Syntax {
                line: 2,
                column: 2,
                ..
            }
        ));
    }

    #[test]
    fn well_bracketed_program_binds() {
        assert!(bind("[[[][]][]]").is_ok());
        assert!(bind("").is_ok());
    }

    #[test]
    fn syntax_error_displays_position_prefix() {
        let err = syntax_error(3, 7, "expected '[' before ']'");
        assert_eq!(err.to_string(), "3:7: expected '[' before ']'");
    }
}
