//! Test-suite intermediate representation.
//!
//! The synthesis engine produces a `TestSuite` per run; a `Lowering`
//! consumes it and produces host-language source text. Statements carry
//! structural bodies (`If`) as nested lists so the lowering chooses its
//! own control-flow layout. IR values are created fresh per synthesis
//! run, handed to the renderer once, and never mutated afterwards.

use std::fmt;

use crate::ast::Expr;

// ─── Statements ───────────────────────────────────────────────────

/// A single generated statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Materialize one symbolic input covering the widest value set of
    /// its type: `int x = Symbolic.input("x");`
    SymbolicInput { ty: String, name: String },
    /// Declaration with initializer. A re-declaration of an existing
    /// name renders as a plain assignment.
    VarDecl { ty: String, name: String, init: Expr },
    Assign { name: String, value: Expr },
    /// Constrain the symbolic search space.
    Assume(Expr),
    /// Expression statement; the expression is a call.
    Call(Expr),
    /// Conditional. With `returns_on_true` the body ends in an early
    /// return (validity guard); without it the body simply runs before
    /// the following statements.
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        returns_on_true: bool,
    },
    Assert(Expr),
}

/// One generated test procedure; one exists per distinct specified
/// function.
#[derive(Clone, Debug, PartialEq)]
pub struct TestProc {
    pub name: String,
    /// Whether the host framework's test annotation is attached. The
    /// driver invokes the procedure either way.
    pub test_annotated: bool,
    pub body: Vec<Stmt>,
}

/// A full synthesized suite: helpers plus the driver that replays the
/// original invocation order.
#[derive(Clone, Debug, PartialEq)]
pub struct TestSuite {
    pub package: String,
    pub class_name: String,
    pub imports: Vec<String>,
    pub procs: Vec<TestProc>,
    pub driver: Vec<Stmt>,
}

// ─── Display ──────────────────────────────────────────────────────

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::SymbolicInput { ty, name } => write!(f, "symbolic {} {}", ty, name),
            Stmt::VarDecl { ty, name, init } => write!(f, "decl {} {} = {}", ty, name, init),
            Stmt::Assign { name, value } => write!(f, "assign {} = {}", name, value),
            Stmt::Assume(cond) => write!(f, "assume {}", cond),
            Stmt::Call(expr) => write!(f, "call {}", expr),
            Stmt::If {
                cond,
                then_body,
                returns_on_true,
            } => write!(
                f,
                "if {} (then={}, returns={})",
                cond,
                then_body.len(),
                returns_on_true
            ),
            Stmt::Assert(cond) => write!(f, "assert {}", cond),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr};

    #[test]
    fn test_stmt_display() {
        let decl = Stmt::VarDecl {
            ty: "int".to_string(),
            name: "x_old".to_string(),
            init: Expr::name("x"),
        };
        assert_eq!(format!("{}", decl), "decl int x_old = x");

        let assume = Stmt::Assume(Expr::binary(BinOp::Gt, Expr::name("x"), Expr::int(0)));
        assert_eq!(format!("{}", assume), "assume (x > 0)");
    }

    #[test]
    fn test_structural_display() {
        let guard = Stmt::If {
            cond: Expr::binary(BinOp::Eq, Expr::name("data"), Expr::name("null")),
            then_body: vec![],
            returns_on_true: true,
        };
        assert_eq!(format!("{}", guard), "if (data == null) (then=0, returns=true)");
    }

    #[test]
    fn test_suite_clone_is_independent() {
        let suite = TestSuite {
            package: "specgen.generated".to_string(),
            class_name: "GeneratedSuite".to_string(),
            imports: vec!["java.util.*".to_string()],
            procs: vec![TestProc {
                name: "f_helper".to_string(),
                test_annotated: true,
                body: vec![Stmt::Assert(Expr::boolean(true))],
            }],
            driver: vec![],
        };
        let cloned = suite.clone();
        assert_eq!(suite, cloned);
    }
}
