//! REPL (Read-Eval-Print Loop) for cpqp
//!
//! Backed by the tree-walking interpreter, so functions and globals persist
//! across inputs.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use cpqp_core::bytecode::{disassemble_chunk, Value};
use cpqp_core::{Compiler, Interpreter, Parser};

/// REPL prompt shown at the start of each line
const PROMPT: &str = ">>> ";
/// Continuation prompt for multi-line input
const CONTINUATION_PROMPT: &str = "... ";
/// History file name
const HISTORY_FILE: &str = ".cpqp_history";

/// Result of processing a REPL command
enum CommandResult {
    /// Not a command, evaluate it
    Continue,
    /// Exit the REPL
    Exit,
    /// Input was handled as a command
    Handled,
}

/// The cpqp REPL
pub struct Repl {
    interpreter: Interpreter,
    editor: Editor<(), DefaultHistory>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if let Some(home) = home_dir() {
            let _ = editor.load_history(&home.join(HISTORY_FILE));
        }

        Ok(Self {
            interpreter: Interpreter::new(),
            editor,
        })
    }

    /// Run the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("cpqp v{}", cpqp_core::VERSION);
        println!("Type :help for help, :quit to exit");
        println!();

        loop {
            match self.read_input() {
                Ok(Some(input)) => match handle_command(&input) {
                    CommandResult::Exit => break,
                    CommandResult::Handled => {}
                    CommandResult::Continue => match eval(&mut self.interpreter, &input) {
                        Ok(Some(value)) => println!("{value}"),
                        Ok(None) => {}
                        Err(message) => eprintln!("{message}"),
                    },
                },
                Ok(None) => {}
                Err(ReadlineError::Interrupted) => println!("^C"),
                Err(ReadlineError::Eof) => {
                    println!("Tchau!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    break;
                }
            }
        }

        if let Some(home) = home_dir() {
            let _ = self.editor.save_history(&home.join(HISTORY_FILE));
        }

        Ok(())
    }

    /// Read input from the user, handling multi-line input
    fn read_input(&mut self) -> Result<Option<String>, ReadlineError> {
        let mut input = String::new();
        let mut prompt = PROMPT;

        loop {
            let line = self.editor.readline(prompt)?;

            if input.is_empty() && line.trim().is_empty() {
                return Ok(None);
            }

            if !input.is_empty() {
                input.push('\n');
            }
            input.push_str(&line);

            if is_complete(&input) {
                let _ = self.editor.add_history_entry(&input);
                return Ok(Some(input));
            }

            prompt = CONTINUATION_PROMPT;
        }
    }
}

/// Handle REPL commands (starting with :)
fn handle_command(input: &str) -> CommandResult {
    let trimmed = input.trim();
    let Some(cmd) = trimmed.strip_prefix(':') else {
        return CommandResult::Continue;
    };
    let (cmd_name, args) = cmd.trim().split_once(' ').unwrap_or((cmd.trim(), ""));

    match cmd_name.to_lowercase().as_str() {
        "quit" | "q" | "exit" => CommandResult::Exit,
        "help" | "h" | "?" => {
            print_help();
            CommandResult::Handled
        }
        "ast" => {
            match show_ast(args) {
                Ok(tree) => print!("{tree}"),
                Err(message) => eprintln!("{message}"),
            }
            CommandResult::Handled
        }
        "disasm" | "dis" => {
            match show_disassembly(args) {
                Ok(listing) => print!("{listing}"),
                Err(message) => eprintln!("{message}"),
            }
            CommandResult::Handled
        }
        _ => {
            eprintln!("Unknown command ':{cmd_name}'. Type :help for help.");
            CommandResult::Handled
        }
    }
}

/// Evaluate one input
///
/// A bare expression has its value returned for printing; anything else runs
/// as a program.
fn eval(interpreter: &mut Interpreter, input: &str) -> Result<Option<Value>, String> {
    if let Ok(expr) = Parser::parse_expression(input) {
        debug!("evaluating expression");
        return interpreter.evaluate(&expr).map(Some).map_err(|e| e.to_string());
    }

    let program = Parser::parse_program(input).map_err(|errors| join_errors(&errors))?;
    interpreter.interpret(&program).map_err(|e| e.to_string())?;
    Ok(None)
}

/// The parsed statements of `source`, one debug tree per statement
fn show_ast(source: &str) -> Result<String, String> {
    if source.trim().is_empty() {
        return Err("Usage: :ast <source>".to_string());
    }
    let program = Parser::parse_program(source).map_err(|errors| join_errors(&errors))?;
    Ok(program.iter().map(|stmt| format!("{stmt:#?}\n")).collect())
}

/// The bytecode listing of `source`
fn show_disassembly(source: &str) -> Result<String, String> {
    if source.trim().is_empty() {
        return Err("Usage: :disasm <source>".to_string());
    }
    let program = Parser::parse_program(source).map_err(|errors| join_errors(&errors))?;
    let chunk = Compiler::new().compile(&program).map_err(|e| e.to_string())?;
    Ok(disassemble_chunk(&chunk, "repl"))
}

fn join_errors(errors: &[impl std::fmt::Display]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Check if the input is complete (balanced delimiters, closed strings and comments)
fn is_complete(input: &str) -> bool {
    let mut paren_depth = 0i32;
    let mut brace_depth = 0i32;
    let mut in_string = false;

    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Strings have no escapes
        if c == '"' {
            in_string = !in_string;
            i += 1;
            continue;
        }

        if in_string {
            i += 1;
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            loop {
                if i + 1 >= chars.len() {
                    return false;
                }
                if chars[i] == '*' && chars[i + 1] == '/' {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '{' => brace_depth += 1,
            '}' => brace_depth -= 1,
            _ => {}
        }

        i += 1;
    }

    !in_string && paren_depth <= 0 && brace_depth <= 0
}

/// Print REPL help
fn print_help() {
    println!(
        r#"
cpqp REPL Commands:
  :help, :h, :?      Show this help message
  :quit, :q          Exit the REPL
  :ast <source>      Show the parsed statements of <source>
  :disasm <source>   Show the bytecode of <source>

Tips:
  - Globals and functions persist across inputs
  - An expression without ';' prints its value
  - Unclosed braces or parentheses continue on the next line
  - Press Ctrl+D to exit

Examples:
  >>> 1 + 2 * 3
  7
  >>> FUNCAO dobro(n) {{ RETORNA n * 2; }}
  >>> dobro(21)
  42
"#
    );
}

/// Get the user's home directory
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpqp_core::with_output_capture;

    fn interpreter() -> Interpreter {
        Interpreter::with_input(std::io::empty())
    }

    #[test]
    fn test_is_complete_simple() {
        assert!(is_complete("1 + 2"));
        assert!(is_complete("ESCREVEAI x;"));
        assert!(is_complete(""));
    }

    #[test]
    fn test_is_complete_unbalanced() {
        assert!(!is_complete("(1 + 2"));
        assert!(!is_complete("SE (x) {"));
        assert!(!is_complete("FUNCAO f(a) {\n  RETORNA a;"));
        assert!(is_complete("FUNCAO f(a) {\n  RETORNA a;\n}"));
    }

    #[test]
    fn test_is_complete_strings_and_comments() {
        assert!(!is_complete("ESCREVEAI \"abc"));
        assert!(is_complete("ESCREVEAI \"{(\";"));
        assert!(is_complete("ESCREVEAI 1; // {"));
        assert!(!is_complete("/* aberto"));
        assert!(is_complete("/* { */ ESCREVEAI 1;"));
    }

    #[test]
    fn expressions_print_their_value() {
        let mut interp = interpreter();
        assert_eq!(eval(&mut interp, "1 + 2 * 3"), Ok(Some(Value::Int(7))));
        assert_eq!(
            eval(&mut interp, "\"a\" + 1"),
            Ok(Some(Value::string("a1")))
        );
    }

    #[test]
    fn state_persists_between_inputs() {
        let mut interp = interpreter();
        let (result, _) = with_output_capture(|| {
            eval(&mut interp, "VAR x = 20; FUNCAO soma(a, b) { RETORNA a + b; }")
        });
        assert_eq!(result, Ok(None));
        assert_eq!(eval(&mut interp, "soma(x, 22)"), Ok(Some(Value::Int(42))));
        assert_eq!(eval(&mut interp, "x = 1"), Ok(Some(Value::Int(1))));
        assert_eq!(interp.global("x"), Some(Value::Int(1)));
    }

    #[test]
    fn statements_write_output() {
        let mut interp = interpreter();
        let (result, capture) = with_output_capture(|| eval(&mut interp, "ESCREVEAI 5;"));
        assert_eq!(result, Ok(None));
        assert_eq!(capture.stdout, ["5"]);
    }

    #[test]
    fn errors_are_reported_as_messages() {
        let mut interp = interpreter();
        let err = eval(&mut interp, "ESCREVEAI nada;").unwrap_err();
        assert_eq!(err, "Variável 'nada' não definida. [linha 1]");

        let err = eval(&mut interp, "VAR = 1;").unwrap_err();
        assert!(err.ends_with("[linha 1]"), "{err}");
    }

    #[test]
    fn ast_and_disassembly_views() {
        let tree = show_ast("ESCREVEAI 1;").unwrap();
        assert!(tree.contains("Print"), "{tree}");

        let listing = show_disassembly("ESCREVEAI 1 + 1;").unwrap();
        assert!(listing.contains("== repl =="), "{listing}");
        assert!(listing.contains("ADD"), "{listing}");

        assert!(show_ast("  ").is_err());
        assert!(show_disassembly("ESCREVEAI 10 % 3;").is_err());
    }
}
