//! AST visualizer: renders a parsed program as a standalone HTML page
//!
//! Every node becomes an `<li>` with a bold label; its children are nested
//! in a `<ul>`. Rendering is read-only over the tree.

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::Path;

use crate::ast::{Expr, ExprKind, Stmt, StmtKind};

const TITLE: &str = "Árvore Sintática (AST)";

const STYLES: &str = "\
    body { font-family: Arial, sans-serif; background: #fff; }
    ul { margin-left: 30px; }
    li { margin-bottom: 6px; font-size: 16px; }
    b { font-weight: 600; color: #222; }";

/// Render `program` to a complete HTML document
#[must_use]
pub fn render_program(program: &[Stmt]) -> String {
    let mut writer = TreeWriter::default();
    // Writing into a String cannot fail
    let _ = writer.document(program);
    writer.output
}

/// Render `program` and write it to `path`
pub fn write_program(program: &[Stmt], path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, render_program(program))
}

/// Escape text for use in HTML content
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Default)]
struct TreeWriter {
    output: String,
    depth: usize,
}

impl TreeWriter {
    fn document(&mut self, program: &[Stmt]) -> fmt::Result {
        writeln!(self.output, "<!DOCTYPE html>")?;
        writeln!(self.output, "<html lang=\"pt\">")?;
        writeln!(self.output, "<head>")?;
        writeln!(self.output, "  <meta charset=\"UTF-8\">")?;
        writeln!(self.output, "  <title>{TITLE}</title>")?;
        writeln!(self.output, "  <style>\n{STYLES}\n  </style>")?;
        writeln!(self.output, "</head>")?;
        writeln!(self.output, "<body>")?;
        writeln!(self.output, "<h2>{TITLE}</h2>")?;
        writeln!(self.output, "<ul>")?;
        self.depth = 1;
        for stmt in program {
            self.stmt(stmt)?;
        }
        writeln!(self.output, "</ul>")?;
        writeln!(self.output, "</body>")?;
        writeln!(self.output, "</html>")
    }

    /// Write one node: `children` writes its subtree, if any
    fn node(
        &mut self,
        label: &str,
        children: impl FnOnce(&mut Self) -> fmt::Result,
    ) -> fmt::Result {
        let indent = "  ".repeat(self.depth);
        writeln!(self.output, "{indent}<li><b>{}</b>", escape_html(label))?;

        let start = self.output.len();
        writeln!(self.output, "{indent}  <ul>")?;
        let list_start = self.output.len();
        self.depth += 2;
        children(self)?;
        self.depth -= 2;
        if self.output.len() == list_start {
            // Leaf: drop the empty list
            self.output.truncate(start);
        } else {
            writeln!(self.output, "{indent}  </ul>")?;
        }

        writeln!(self.output, "{indent}</li>")
    }

    fn leaf(&mut self, label: &str) -> fmt::Result {
        self.node(label, |_| Ok(()))
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> fmt::Result {
        stmts.iter().try_for_each(|stmt| self.stmt(stmt))
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match &stmt.kind {
            StmtKind::Print(expr) => self.node("Print", |w| w.expr(expr)),
            StmtKind::Var {
                ty,
                name,
                initializer,
            } => {
                let label = match ty {
                    Some(ty) => format!("Var: {name} ({})", ty.as_str()),
                    None => format!("Var: {name}"),
                };
                self.node(&label, |w| initializer.as_ref().map_or(Ok(()), |e| w.expr(e)))
            }
            StmtKind::Function(decl) => {
                let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
                let label = format!("Function: {}({})", decl.name, params.join(", "));
                self.node(&label, |w| w.stmts(&decl.body))
            }
            StmtKind::Return(value) => {
                self.node("Return", |w| value.as_ref().map_or(Ok(()), |e| w.expr(e)))
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.node("If", |w| {
                w.expr(condition)?;
                w.stmt(then_branch)?;
                match else_branch {
                    Some(else_branch) => w.node("Else", |w| w.stmt(else_branch)),
                    None => Ok(()),
                }
            }),
            StmtKind::Block(stmts) => self.node("Block", |w| w.stmts(stmts)),
            StmtKind::Expression(expr) => self.node("Expression", |w| w.expr(expr)),
            StmtKind::While { condition, body } => self.node("While", |w| {
                w.expr(condition)?;
                w.stmt(body)
            }),
            StmtKind::Break => self.leaf("Break"),
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => self.node("Switch", |w| {
                w.expr(subject)?;
                for case in cases {
                    w.node("Case", |w| {
                        w.expr(&case.value)?;
                        w.stmt(&case.body)
                    })?;
                }
                match default {
                    Some(body) => w.node("Default", |w| w.stmt(body)),
                    None => Ok(()),
                }
            }),
            StmtKind::Input(name) => self.leaf(&format!("Input: {name}")),
        }
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::Assign { name, value } => {
                self.node(&format!("Assign: {name}"), |w| w.expr(value))
            }
            ExprKind::Binary { left, op, right } => {
                self.node(&format!("Binary ({})", op.as_str()), |w| {
                    w.expr(left)?;
                    w.expr(right)
                })
            }
            ExprKind::Call { callee, args } => self.node("Call", |w| {
                w.expr(callee)?;
                args.iter().try_for_each(|arg| w.expr(arg))
            }),
            ExprKind::Grouping(inner) => self.node("Grouping", |w| w.expr(inner)),
            ExprKind::Literal(literal) => self.leaf(&format!("Literal: {literal}")),
            ExprKind::Unary { op, operand } => {
                self.node(&format!("Unary ({})", op.as_str()), |w| w.expr(operand))
            }
            ExprKind::Variable(name) => self.leaf(&format!("Variable: {name}")),
            ExprKind::Increment(name) => self.leaf(&format!("Increment: {name}")),
            ExprKind::Decrement(name) => self.leaf(&format!("Decrement: {name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn render(source: &str) -> String {
        render_program(&Parser::parse_program(source).expect("Parse error"))
    }

    #[test]
    fn renders_a_complete_page() {
        let html = render("ESCREVEAI 1 + 2;");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>Árvore Sintática (AST)</h2>"));
        assert!(html.contains("<li><b>Print</b>"));
        assert!(html.contains("<li><b>Binary (+)</b>"));
        assert!(html.contains("<li><b>Literal: 1</b>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn leaves_have_no_nested_list() {
        let html = render("PAREI;");
        assert!(html.contains("<li><b>Break</b>\n  </li>"));
        assert_eq!(html.matches("<ul>").count(), 1);
    }

    #[test]
    fn labels_cover_declarations_and_control_flow() {
        let html = render(
            "INTEIRO x = 1;
             FUNCAO soma(a, b) { RETORNA a + b; }
             SE (x > 0) { LEIA x; } SENAO x = soma(x, 2);
             VOLTAINFINITA (x < 3) { ++x; }
             ESCOLHEAI x { CASO 1: PAREI; PADRAO: ESCREVEAI -x; }",
        );
        for label in [
            "Var: x (INTEIRO)",
            "Function: soma(a, b)",
            "Return",
            "If",
            "Block",
            "Input: x",
            "Else",
            "Assign: x",
            "Call",
            "While",
            "Increment: x",
            "Switch",
            "Case",
            "Default",
            "Unary (-)",
            "Variable: x",
        ] {
            assert!(html.contains(&format!("<b>{label}</b>")), "missing {label}");
        }
    }

    #[test]
    fn text_is_escaped() {
        let html = render("ESCREVEAI \"<b>&\" + 1 < 2;");
        assert!(html.contains("<b>Literal: &quot;&lt;b&gt;&amp;&quot;</b>"));
        assert!(html.contains("<b>Binary (&lt;)</b>"));
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ast.html");
        let program = Parser::parse_program("VAR y = NULO;").unwrap();
        write_program(&program, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_program(&program));
        assert!(written.contains("Literal: NULO"));
    }
}
