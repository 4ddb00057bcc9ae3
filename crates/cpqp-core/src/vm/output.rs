//! Output routing for program execution
//!
//! `ESCREVEAI` lines and runtime diagnostics normally go to stdout and
//! stderr. Inside [`with_output_capture`] they are collected into a
//! thread-local buffer instead, which is how tests and the REPL observe a run.

use std::cell::RefCell;
use std::io::Write;

thread_local! {
    static OUTPUT_BUFFER: RefCell<Option<OutputCapture>> = const { RefCell::new(None) };
}

/// Captured output from one execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputCapture {
    /// Lines written by the program
    pub stdout: Vec<String>,

    /// Diagnostic lines (runtime errors)
    pub stderr: Vec<String>,
}

impl OutputCapture {
    /// Create a new empty output capture
    pub fn new() -> Self {
        Self::default()
    }
}

/// Execute a function with output capture enabled.
///
/// Program output and diagnostics produced while `f` runs are returned in
/// the `OutputCapture` instead of reaching the process streams. Captures
/// nest: the previous buffer is restored afterwards.
///
/// # Example
/// ```ignore
/// let (result, output) = with_output_capture(|| vm.run(&chunk));
/// for line in output.stdout {
///     println!("Captured: {}", line);
/// }
/// ```
pub fn with_output_capture<F, R>(f: F) -> (R, OutputCapture)
where
    F: FnOnce() -> R,
{
    let previous = OUTPUT_BUFFER.with(|cell| cell.replace(Some(OutputCapture::new())));

    let result = f();

    let captured = OUTPUT_BUFFER.with(|cell| cell.replace(previous));
    (result, captured.unwrap_or_default())
}

/// Run `capture` against the active buffer, if any.
/// Returns true if output was captured.
fn with_buffer(capture: impl FnOnce(&mut OutputCapture)) -> bool {
    OUTPUT_BUFFER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(buffer) => {
            capture(buffer);
            true
        }
        None => false,
    })
}

/// Write one line of program output
pub(crate) fn write_line(text: &str) {
    if !with_buffer(|buffer| buffer.stdout.push(text.to_string())) {
        println!("{text}");
    }
}

/// Write one diagnostic line
pub(crate) fn write_error(text: &str) {
    if !with_buffer(|buffer| buffer.stderr.push(text.to_string())) {
        eprintln!("{text}");
    }
}

/// Show an input prompt. Suppressed while capturing.
pub(crate) fn write_prompt(text: &str) {
    if !with_buffer(|_| {}) {
        let mut stdout = std::io::stdout().lock();
        // A prompt that cannot be shown does not stop the read.
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_capture_basic() {
        let ((), output) = with_output_capture(|| {
            write_line("Olá, mundo!");
            write_error("erro [linha 1]");
        });

        assert_eq!(output.stdout, vec!["Olá, mundo!"]);
        assert_eq!(output.stderr, vec!["erro [linha 1]"]);
    }

    #[test]
    fn test_output_capture_multiple_lines() {
        let ((), output) = with_output_capture(|| {
            write_line("Line 1");
            write_prompt("> ");
            write_line("Line 2");
        });

        assert_eq!(output.stdout, vec!["Line 1", "Line 2"]);
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_nested_capture_restores_outer() {
        let (inner, outer) = with_output_capture(|| {
            write_line("outer");
            let ((), inner) = with_output_capture(|| write_line("inner"));
            write_line("outer again");
            inner
        });

        assert_eq!(inner.stdout, vec!["inner"]);
        assert_eq!(outer.stdout, vec!["outer", "outer again"]);
    }

    #[test]
    fn test_no_capture_returns_false() {
        assert!(!with_buffer(|_| {}));
    }
}
