//! A Brainfuck interpreter over an unbounded, two-sided tape.
//!
//! The tape extends in both directions from the origin and grows on demand;
//! every cell reads 0 until written. Programs are bound once (comments
//! stripped, brackets resolved) and can then be run any number of times,
//! each run starting from a fresh tape.
//!
//! Features and behaviors:
//! - Cell arithmetic wraps modulo 256.
//! - `.` flushes after every byte so output is visible before blocking reads.
//! - `,` on end of input either suspends the run (retryable once more input
//!   is fed) or leaves the cell unchanged, at the caller's choice.
//! - Runs can also suspend at registered instruction positions and be
//!   resumed later.
//! - Unmatched brackets fail construction with a line/column diagnostic.
//!
//! Quick start:
//!
//! ```
//! use bfrun::Interpreter;
//!
//! let mut bf = Interpreter::new("++>+++.<.", Vec::new(), std::io::empty())?;
//! let suspended = bf.run(false)?;
//! assert!(!suspended);
//! assert_eq!(bf.output(), &[3, 2]);
//! # Ok::<(), bfrun::InterpreterError>(())
//! ```

pub mod cli_util;
pub mod commands;
pub mod interpreter;
pub mod repl;
pub mod tape;
pub mod theme;

pub use interpreter::{Interpreter, InterpreterError, Op};
pub use tape::{Pointer, Tape};
