use clap::Args;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};

use crate::cli_util::print_interpreter_error;
use crate::Interpreter;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Path to the program source file
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Redirect program output to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// Read program input from PATH instead of stdin
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<String>,

    /// Suspend the run when `,` hits end of input
    #[arg(long = "stop-on-eof")]
    pub stop_on_eof: bool,

    /// Suspend before executing the instruction at POS (repeatable)
    #[arg(long = "stop-at", value_name = "POS")]
    pub stop_at: Vec<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        file,
        output,
        input,
        stop_on_eof,
        stop_at,
        ..
    } = args;

    let Some(path) = file else {
        usage_and_exit(program, 2);
    };

    let source = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: failed to read source file: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let out: Box<dyn Write> = match &output {
        Some(p) => match File::create(p) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("{program}: failed to create output file: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => Box::new(io::stdout()),
    };

    let inp: Box<dyn Read> = match &input {
        Some(p) => match File::open(p) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("{program}: failed to open input file: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => Box::new(io::stdin()),
    };

    let mut bf = match Interpreter::new(&source, out, inp) {
        Ok(bf) => bf,
        Err(err) => {
            print_interpreter_error(Some(program), &source, &err);
            return 1;
        }
    };

    let stops: HashSet<usize> = stop_at.into_iter().collect();
    match bf.run_with_stops(stop_on_eof, &stops) {
        Ok(true) => {
            // Same report whether a stop point or end of input suspended us.
            println!("Input EOF or a stop mark has been hit.");
            let _ = io::stdout().flush();
            0
        }
        Ok(false) => {
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_interpreter_error(Some(program), &source, &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run <FILE>
  {0} run <FILE> --output <PATH> --input <PATH>

Options:
  --output, -o <PATH>  Redirect program output to PATH instead of stdout
  --input,  -i <PATH>  Read program input from PATH instead of stdin
  --stop-on-eof        Suspend the run when `,` hits end of input
  --stop-at <POS>      Suspend before the instruction at POS (repeatable)
  --help,   -h         Show this help

Notes:
- The tape is unbounded in both directions; every cell starts at 0.
- Characters outside ><+-.,[] are comments.
- A suspended run reports "Input EOF or a stop mark has been hit." and
  exits 0; unmatched brackets and stream failures exit 1.

Examples:
- Run a program with console streams:
    {0} run ./program.bf
- Feed input from a file and capture output:
    {0} run ./program.bf --input in.txt --output out.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
