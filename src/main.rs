use bfrun::commands::{repl, run};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "bfrun", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Repl(repl::ReplArgs),
}

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run <FILE> [--output <PATH>] [--input <PATH>]  # Run a program from a file
  {0} run <FILE> [--stop-on-eof] [--stop-at <POS>]   # ... suspending on EOF/stop points
  {0} repl                                           # Start a read-eval-print loop

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfrun"));

    let cli = Cli::parse();

    if cli.help || cli.command.is_none() {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    }

    let code = match cli.command.unwrap() {
        Command::Run(args) => run::run(&program, args),
        Command::Repl(args) => repl::run(&program, args),
    };

    std::process::exit(code);
}
