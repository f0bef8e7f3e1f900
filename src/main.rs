use std::panic;
use std::process;

use lispy::repl;

fn main() {
    repl::init_tracing();

    println!("Lispy Version {}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, or Ctrl+C to exit.");
    println!();

    let result = panic::catch_unwind(repl::run);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("{e}");
            process::exit(1);
        }
        Err(panic_info) => {
            eprintln!("The REPL encountered an unexpected error and must exit.");

            if let Some(msg) = panic_info.downcast_ref::<&str>() {
                eprintln!("Error: {msg}");
            } else if let Some(msg) = panic_info.downcast_ref::<String>() {
                eprintln!("Error: {msg}");
            } else {
                eprintln!("Error: Unknown panic occurred");
            }

            process::exit(1);
        }
    }
}
