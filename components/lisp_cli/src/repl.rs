//! REPL (Read-Eval-Print Loop) over the root registers
//!
//! Every command names registers as `rN`; operands may also be integer
//! literals or `nil`:
//!
//! ```text
//! > cons r0 1 nil
//! r0 = (1)
//! > cons r0 2 r0
//! r0 = (2 1)
//! > car r1 r0
//! r1 = 2
//! ```

use core_types::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;

/// A command operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register `rN`
    Register(usize),
    /// Integer literal
    Int(isize),
    /// The empty list
    Nil,
}

/// A parsed REPL command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `set rD A`
    Set(usize, Operand),
    /// `cons rD A B`
    Cons(usize, Operand, Operand),
    /// `car rD rS`
    Car(usize, usize),
    /// `cdr rD rS`
    Cdr(usize, usize),
    /// `rplaca rS A`
    Rplaca(usize, Operand),
    /// `rplacd rS A`
    Rplacd(usize, Operand),
    /// `eq A B`
    Eq(Operand, Operand),
    /// `atom A`
    Atom(Operand),
    /// `show [rN]`
    Show(Option<usize>),
    /// `map`
    Map,
    /// `stats`
    Stats,
}

fn parse_register(token: &str) -> Result<usize, String> {
    token
        .strip_prefix('r')
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| format!("expected a register like r0, got '{}'", token))
}

fn parse_operand(token: &str) -> Result<Operand, String> {
    if token == "nil" {
        return Ok(Operand::Nil);
    }
    if token.starts_with('r') {
        return parse_register(token).map(Operand::Register);
    }
    token
        .parse()
        .map(Operand::Int)
        .map_err(|_| format!("expected a register, integer or nil, got '{}'", token))
}

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["set", d, a] => Command::Set(parse_register(d)?, parse_operand(a)?),
        ["cons", d, a, b] => Command::Cons(
            parse_register(d)?,
            parse_operand(a)?,
            parse_operand(b)?,
        ),
        ["car", d, s] => Command::Car(parse_register(d)?, parse_register(s)?),
        ["cdr", d, s] => Command::Cdr(parse_register(d)?, parse_register(s)?),
        ["rplaca", s, a] => Command::Rplaca(parse_register(s)?, parse_operand(a)?),
        ["rplacd", s, a] => Command::Rplacd(parse_register(s)?, parse_operand(a)?),
        ["eq", a, b] => Command::Eq(parse_operand(a)?, parse_operand(b)?),
        ["atom", a] => Command::Atom(parse_operand(a)?),
        ["show"] => Command::Show(None),
        ["show", r] => Command::Show(Some(parse_register(r)?)),
        ["map"] => Command::Map,
        ["stats"] => Command::Stats,
        [name, ..] => return Err(format!("unknown command or wrong arity: '{}'", name)),
        [] => return Err("empty command".to_string()),
    };
    Ok(command)
}

fn register(runtime: &Runtime, index: usize) -> CliResult<Value> {
    runtime.root(index).ok_or_else(|| {
        CliError::Repl(format!(
            "no register r{} (have r0..r{})",
            index,
            runtime.root_count().saturating_sub(1)
        ))
    })
}

fn value_of(runtime: &Runtime, operand: Operand) -> CliResult<Value> {
    match operand {
        Operand::Register(index) => register(runtime, index),
        Operand::Int(n) => Ok(Value::try_integer(n)?),
        Operand::Nil => Ok(Value::NIL),
    }
}

fn assign(runtime: &mut Runtime, dest: usize, value: Value) -> CliResult<String> {
    register(runtime, dest)?;
    runtime.set_root(dest, value);
    Ok(format!("r{} = {}", dest, runtime.render(value)?))
}

/// Executes `command` and returns the text to print.
pub fn execute(runtime: &mut Runtime, command: Command) -> CliResult<String> {
    match command {
        Command::Set(dest, a) => {
            let value = value_of(runtime, a)?;
            assign(runtime, dest, value)
        }
        Command::Cons(dest, a, b) => {
            register(runtime, dest)?;
            let (x, y) = (value_of(runtime, a)?, value_of(runtime, b)?);
            let cell = runtime.cons(x, y)?;
            assign(runtime, dest, cell)
        }
        Command::Car(dest, src) => {
            let x = register(runtime, src)?;
            let value = runtime.car(x)?;
            assign(runtime, dest, value)
        }
        Command::Cdr(dest, src) => {
            let x = register(runtime, src)?;
            let value = runtime.cdr(x)?;
            assign(runtime, dest, value)
        }
        Command::Rplaca(src, a) => {
            let (x, y) = (register(runtime, src)?, value_of(runtime, a)?);
            runtime.rplaca(x, y)?;
            Ok(format!("r{} = {}", src, runtime.render(x)?))
        }
        Command::Rplacd(src, a) => {
            let (x, y) = (register(runtime, src)?, value_of(runtime, a)?);
            runtime.rplacd(x, y)?;
            Ok(format!("r{} = {}", src, runtime.render(x)?))
        }
        Command::Eq(a, b) => {
            let (x, y) = (value_of(runtime, a)?, value_of(runtime, b)?);
            Ok(runtime.eq(x, y).to_string())
        }
        Command::Atom(a) => {
            let x = value_of(runtime, a)?;
            Ok(runtime.is_atom(x).to_string())
        }
        Command::Show(Some(index)) => {
            let value = register(runtime, index)?;
            Ok(format!("r{} = {}", index, runtime.render(value)?))
        }
        Command::Show(None) => {
            let mut lines = Vec::new();
            for index in 0..runtime.root_count() {
                let value = register(runtime, index)?;
                if !value.is_nil() {
                    lines.push(format!("r{} = {}", index, runtime.render(value)?));
                }
            }
            if lines.is_empty() {
                lines.push("all registers are nil".to_string());
            }
            Ok(lines.join("\n"))
        }
        Command::Map => Ok(runtime.collector().heap_map().to_string()),
        Command::Stats => {
            let stats = runtime.stats();
            let heap = runtime.collector().heap();
            let lines = [
                format!("flips: {}", stats.flips),
                format!("allocated: {}", stats.cells_allocated),
                format!("copied: {}", stats.cells_copied),
                format!("scanned: {}", stats.cells_scanned),
                format!("max scan per cons: {}", stats.max_scan_per_cons),
                format!("free cells: {} of {}", heap.free_cells(), heap.capacity()),
            ];
            Ok(lines.join("\n"))
        }
    }
}

/// Run the interactive REPL
///
/// # Returns
/// `Ok(())` when the REPL exits normally, or the error that made the heap
/// unusable (exhaustion or a broken invariant)
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Baker GC register REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type .help for commands or 'exit' to quit.");
    println!();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == ".exit" || trimmed == "quit" {
                    println!("Goodbye!");
                    break;
                }
                if trimmed.starts_with('.') {
                    handle_repl_command(trimmed);
                    continue;
                }

                let _ = editor.add_history_entry(trimmed);

                let command = match parse_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        continue;
                    }
                };
                match execute(runtime, command) {
                    Ok(output) => println!("{}", output),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type 'exit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Handle special REPL commands
fn handle_repl_command(command: &str) {
    match command {
        ".help" => {
            println!("Commands (A, B: rN, integer or nil):");
            println!("  set rD A       - rD := A");
            println!("  cons rD A B    - rD := (A . B)");
            println!("  car rD rS      - rD := car of rS");
            println!("  cdr rD rS      - rD := cdr of rS");
            println!("  rplaca rS A    - car of rS := A");
            println!("  rplacd rS A    - cdr of rS := A");
            println!("  eq A B         - identity comparison");
            println!("  atom A         - whether A is not a cell");
            println!("  show [rN]      - print one or all registers");
            println!("  map            - print the heap map");
            println!("  stats          - print collector counters");
            println!("  .help          - Show this help message");
            println!("  exit           - Exit the REPL");
        }
        _ => {
            println!("Unknown command: {}. Type .help for help.", command);
        }
    }
}
