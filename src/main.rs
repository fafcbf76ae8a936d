use std::io::IsTerminal;

use anyhow::{Context, Result};

use slisp::printer;
use slisp::{Interp, LispError};

/// Cons-cell budget for the standalone interpreter.
const HEAP_CELLS: usize = 1 << 22;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut interp = Interp::new(HEAP_CELLS).context("failed to initialize interpreter")?;

    if args.is_empty() {
        let interactive = std::io::stdin().is_terminal();
        if interactive {
            println!("slisp ({} symbols interned, ready)", interp.symbols.count());
        }
        interp.ports.push_stdin();
        run(&mut interp, interactive)
    } else {
        // Push in reverse so the first argument is read first.
        for path in args.iter().rev() {
            interp
                .ports
                .push_file(path)
                .with_context(|| format!("cannot open '{}'", path))?;
        }
        run(&mut interp, false)
    }
}

/// The read-eval-print loop. Reader errors have already resynchronized the
/// input to the next line, and eval errors leave the interpreter usable,
/// so both are reported and reading continues.
fn run(interp: &mut Interp, interactive: bool) -> Result<()> {
    loop {
        match interp.read() {
            Ok(Some(form)) => match interp.eval_top(form) {
                Ok(val) => {
                    if interactive {
                        println!(
                            "{}",
                            printer::print_val(val, &interp.heap, &interp.symbols)
                        );
                    }
                }
                Err(err) => eprintln!("error: {}", err),
            },
            Ok(None) => return Ok(()),
            Err(err @ LispError::Io(_)) => {
                return Err(err).context("reading input");
            }
            Err(err) => eprintln!("error: {}", err),
        }
    }
}
