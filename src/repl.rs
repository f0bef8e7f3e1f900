//! Interactive read-eval-print loop.
//!
//! Each line is parsed, read as an implicit S-expression, evaluated against one
//! long-lived global environment and printed. Lines starting with `:` are REPL
//! commands rather than expressions.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::sync::Once;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::ast::Value;
use crate::environment::{create_global_env, Environment};
use crate::{run_line, Error};

pub const PROMPT: &str = "lispy> ";

/// File the line history is loaded from and saved to, relative to the working directory
pub const HISTORY_FILE: &str = ".lispy_history";

static TRACING_INIT: Once = Once::new();

/// Formatting layer for log events. Results own stdout, so the binary hands
/// this stderr; colour is only wanted when the writer is a terminal.
fn log_layer<S, W>(writer: W, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
}

/// Initialize tracing for debug output on stderr.
///
/// Safe to call multiple times. Enable with `RUST_LOG=lispy=debug` or
/// `RUST_LOG=lispy=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let ansi = std::io::stderr().is_terminal();
            tracing_subscriber::registry()
                .with(log_layer(std::io::stderr, ansi))
                .with(filter)
                .init();
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    Env,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line {
        ":help" => Some(Command::Help),
        ":env" => Some(Command::Env),
        ":quit" | ":exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Evaluate one line and render what the REPL prints for it
pub fn evaluate_line(env: &mut Environment, line: &str) -> String {
    match run_line(env, line) {
        Ok(value) => value.to_string(),
        Err(e) => e.to_string(),
    }
}

fn help_text() -> &'static str {
    "\
Commands:
  :help      - Show this help message
  :env       - Show current environment bindings
  :quit      - Exit the interpreter
  :exit      - Exit the interpreter
  Ctrl+C/D   - Exit the interpreter

Builtins:
  list head tail join eval  - Q-expression manipulation
  def                       - (def {x y} 1 2) binds x and y
  + - * / %                 - integer arithmetic

Examples:
  + 1 2 3
  (head {1 2 3})
  (eval (tail {tail tail {5 6 7}}))
  (def {arglist} {a b})
  (def arglist 1 2)"
}

fn format_environment(env: &Environment) -> String {
    if env.is_empty() {
        return "Environment is empty.".to_owned();
    }

    let (builtins, user_defined): (Vec<_>, Vec<_>) = env
        .bindings()
        .partition(|(_, value)| matches!(value, Value::Builtin(_)));

    let mut out = String::new();
    let _ = writeln!(out, "Environment bindings ({} total):", env.len());

    if !builtins.is_empty() {
        let names: Vec<&str> = builtins.iter().map(|(name, _)| *name).collect();
        let _ = writeln!(out, "Builtins ({}): {}", names.len(), names.join(" "));
    }

    if !user_defined.is_empty() {
        let _ = writeln!(out, "User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            let _ = writeln!(out, "  {name} = {value}");
        }
    }

    out.trim_end().to_owned()
}

/// Run the interactive loop until `:quit`, Ctrl-C or end of input
pub fn run() -> Result<(), Error> {
    let mut rl = DefaultEditor::new().map_err(|e| Error::ReplError(e.to_string()))?;
    if rl.load_history(HISTORY_FILE).is_err() {
        tracing::debug!(file = HISTORY_FILE, "no previous history");
    }

    let mut env = create_global_env();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match parse_command(line) {
                    Some(Command::Help) => println!("{}", help_text()),
                    Some(Command::Env) => println!("{}", format_environment(&env)),
                    Some(Command::Quit) => break,
                    None => println!("{}", evaluate_line(&mut env, line)),
                }
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => return Err(Error::ReplError(err.to_string())),
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        tracing::warn!(file = HISTORY_FILE, %err, "could not save history");
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::prelude::*;

    /// In-memory log sink standing in for stderr
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_logs_go_to_the_given_writer_without_colour() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::registry().with(log_layer(logs.clone(), false));

        let printed = tracing::subscriber::with_default(subscriber, || {
            let mut env = create_global_env();
            evaluate_line(&mut env, "(def {x} 1)")
        });

        // the printed result carries no log text
        assert_eq!(printed, "()");

        let output = logs.contents();
        assert!(output.contains("DEBUG"), "got {output:?}");
        assert!(output.contains("applying builtin"), "got {output:?}");
        assert!(!output.contains('\u{1b}'), "ANSI escapes in {output:?}");
    }

    #[test]
    fn test_commands() {
        let test_cases = vec![
            (":help", Some(Command::Help)),
            (":env", Some(Command::Env)),
            (":quit", Some(Command::Quit)),
            (":exit", Some(Command::Quit)),
            (":unknown", None),
            ("(+ 1 2)", None),
        ];

        for (line, expected) in test_cases {
            assert_eq!(parse_command(line), expected, "command {line:?}");
        }
    }

    #[test]
    fn test_evaluate_line_output() {
        let mut env = create_global_env();
        let test_cases = vec![
            ("+ 1 2", "3"),
            ("(list 1 2 {3})", "{1 2 {3}}"),
            ("(def {x} 10)", "()"),
            ("x", "10"),
            ("head", "<function>"),
            ("(/ x 0)", "Error: Division by Zero"),
            ("nope", "Error: Unbound symbol 'nope'"),
        ];

        for (line, expected) in test_cases {
            assert_eq!(evaluate_line(&mut env, line), expected, "line {line:?}");
        }

        let parse_failure = evaluate_line(&mut env, "(+ 1");
        assert!(parse_failure.starts_with("ParseError: "), "got {parse_failure}");
    }

    #[test]
    fn test_format_environment() {
        assert_eq!(format_environment(&Environment::new()), "Environment is empty.");

        let mut env = create_global_env();
        env.define("xs", Value::qexpr());
        let listing = format_environment(&env);

        assert!(listing.starts_with("Environment bindings (12 total):"));
        assert!(listing.contains("Builtins (11): def list head tail eval join + - * / %"));
        assert!(listing.ends_with("User-defined values (1):\n  xs = {}"));
    }
}
