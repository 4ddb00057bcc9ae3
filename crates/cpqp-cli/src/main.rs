//! cpqp CLI - Command-line interface for the cpqp programming language

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cpqp_core::ast::Stmt;
use cpqp_core::bytecode::{disassemble_chunk, Chunk};
use cpqp_core::{html, Compiler, CompilerOptions, Interpreter, Lexer, VM};

mod repl;

/// Environment variable holding a tracing filter that overrides `-v`
const LOG_ENV: &str = "CPQP_LOG";

#[derive(Parser)]
#[command(name = "cpqp")]
#[command(version = cpqp_core::VERSION)]
#[command(about = "Compiler, VM and interpreter for the cpqp language", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a cpqp source file
    Run {
        /// Path to the source file
        file: PathBuf,

        /// Use the tree-walking interpreter instead of the bytecode VM
        #[arg(long)]
        tree: bool,

        /// Reject constructs the bytecode compiler cannot lower
        #[arg(long, conflicts_with = "tree")]
        strict: bool,

        /// Print the compiled chunk before running it
        #[arg(long, conflicts_with = "tree")]
        disassemble: bool,

        /// Also write the AST as an HTML page to this path
        #[arg(long, value_name = "PATH")]
        ast_html: Option<PathBuf>,
    },

    /// Compile a file and print its bytecode
    Disasm {
        /// Path to the source file
        file: PathBuf,

        /// Reject constructs the bytecode compiler cannot lower
        #[arg(long)]
        strict: bool,
    },

    /// Render the AST of a file as an HTML page
    Ast {
        /// Path to the source file
        file: PathBuf,

        /// Output path (defaults to `<file>.ast.html`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the token stream of a file
    Tokens {
        /// Path to the source file
        file: PathBuf,
    },

    /// Start the interactive REPL
    Repl,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli.command.unwrap_or(Commands::Repl)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            file,
            tree,
            strict,
            disassemble,
            ast_html,
        } => {
            let program = parse_file(&file)?;
            if let Some(path) = ast_html {
                write_ast(&program, &path)?;
            }
            if tree {
                run_tree(&program)
            } else {
                let chunk = compile(&file, &program, strict)?;
                if disassemble {
                    print!("{}", disassemble_chunk(&chunk, &file.display().to_string()));
                }
                run_vm(&chunk)
            }
        }
        Commands::Disasm { file, strict } => {
            let program = parse_file(&file)?;
            let chunk = compile(&file, &program, strict)?;
            print!("{}", disassemble_chunk(&chunk, &file.display().to_string()));
            Ok(())
        }
        Commands::Ast { file, output } => {
            let program = parse_file(&file)?;
            let output = output.unwrap_or_else(|| file.with_extension("ast.html"));
            write_ast(&program, &output)?;
            println!("AST written to {}", output.display());
            Ok(())
        }
        Commands::Tokens { file } => {
            let source = read_source(&file)?;
            let (tokens, errors) = Lexer::tokenize(&source);
            for token in &tokens {
                println!("{:>4}  {:<16} {}", token.line, format!("{:?}", token.kind), token.lexeme);
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(error_list("Lex errors", &file, &errors))
            }
        }
        Commands::Repl => repl::Repl::new()?.run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cpqp", &mut io::stdout());
            Ok(())
        }
    }
}

/// Install the stderr subscriber; `CPQP_LOG` wins over the `-v` count
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn parse_file(path: &Path) -> Result<Vec<Stmt>> {
    let source = read_source(path)?;
    let program = cpqp_core::Parser::parse_program(&source)
        .map_err(|errors| error_list("Parse errors", path, &errors))?;
    info!(file = %path.display(), statements = program.len(), "parsed");
    Ok(program)
}

fn compile(path: &Path, program: &[Stmt], strict: bool) -> Result<Chunk> {
    let chunk = Compiler::with_options(CompilerOptions { strict })
        .compile(program)
        .map_err(|e| anyhow::anyhow!("Compile error in '{}':\n  {e}", path.display()))?;
    info!(bytes = chunk.len(), constants = chunk.constants().len(), "compiled");
    Ok(chunk)
}

fn write_ast(program: &[Stmt], path: &Path) -> Result<()> {
    html::write_program(program, path)
        .with_context(|| format!("Failed to write AST to '{}'", path.display()))?;
    debug!(path = %path.display(), "AST written");
    Ok(())
}

fn run_vm(chunk: &Chunk) -> Result<()> {
    let mut vm = VM::new();
    vm.run(chunk).map_err(|e| anyhow::anyhow!("Runtime error: {e}"))?;
    if !vm.diagnostics().is_empty() {
        info!(count = vm.diagnostics().len(), "run completed with recovered errors");
    }
    Ok(())
}

fn run_tree(program: &[Stmt]) -> Result<()> {
    Interpreter::new()
        .interpret(program)
        .map_err(|e| anyhow::anyhow!("Runtime error: {e}"))
}

fn error_list(title: &str, path: &Path, errors: &[impl std::fmt::Display]) -> anyhow::Error {
    let error_msgs: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
    anyhow::anyhow!("{title} in '{}':\n{}", path.display(), error_msgs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_repl() {
        let cli = Cli::try_parse_from(["cpqp"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "cpqp",
            "-vv",
            "run",
            "prog.cpqp",
            "--strict",
            "--disassemble",
            "--ast-html",
            "out.html",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Run {
                file,
                tree,
                strict,
                disassemble,
                ast_html,
            }) => {
                assert_eq!(file, PathBuf::from("prog.cpqp"));
                assert!(!tree);
                assert!(strict);
                assert!(disassemble);
                assert_eq!(ast_html, Some(PathBuf::from("out.html")));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn tree_conflicts_with_strict() {
        assert!(Cli::try_parse_from(["cpqp", "run", "a.cpqp", "--tree", "--strict"]).is_err());
    }

    #[test]
    fn parse_errors_name_the_file_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.cpqp");
        fs::write(&path, "VAR = 1;\nESCREVEAI (1;\n").unwrap();

        let err = parse_file(&path).unwrap_err().to_string();
        assert!(err.starts_with("Parse errors in '"), "{err}");
        assert!(err.contains("[linha 1]"), "{err}");
        assert!(err.contains("[linha 2]"), "{err}");
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_source(Path::new("/nonexistent/x.cpqp")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read file"));
    }

    #[test]
    fn strict_compile_reports_unsupported() {
        let program = cpqp_core::Parser::parse_program("FUNCAO f() { }").unwrap();
        assert!(compile(Path::new("f.cpqp"), &program, false).is_ok());
        let err = compile(Path::new("f.cpqp"), &program, true).unwrap_err();
        assert!(err.to_string().starts_with("Compile error in 'f.cpqp'"));
    }

    #[test]
    fn ast_subcommand_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.cpqp");
        fs::write(&path, "ESCREVEAI 1;").unwrap();

        dispatch(Commands::Ast {
            file: path.clone(),
            output: None,
        })
        .unwrap();
        let html = fs::read_to_string(path.with_extension("ast.html")).unwrap();
        assert!(html.contains("<b>Print</b>"));
    }
}
