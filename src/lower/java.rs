//! Java lowering — produces a JUnit-style suite source file.

use std::collections::HashSet;

use super::Lowering;
use crate::ast::Expr;
use crate::ir::{Stmt, TestProc, TestSuite};
use crate::types::{self, TypeClass};

const INDENT: &str = "    ";

/// Reserved name for the hoisted recompute-expected-result call, kept
/// stable so downstream tooling can recognize it.
const EXPECTED_RESULT: &str = "expectedResult";

#[derive(Default)]
pub struct JavaLowering;

impl JavaLowering {
    pub fn new() -> Self {
        Self
    }
}

impl Lowering for JavaLowering {
    fn lower(&self, suite: &TestSuite) -> Vec<String> {
        let mut out = Vec::new();
        out.push(format!("package {};", suite.package));
        out.push(String::new());
        for import in &suite.imports {
            out.push(format!("import {};", import));
        }
        out.push(String::new());
        out.push(format!("public class {} {{", suite.class_name));

        for proc_ in &suite.procs {
            lower_proc(proc_, &mut out);
        }
        lower_driver(suite, &mut out);

        out.push("}".to_string());
        out
    }
}

fn lower_proc(proc_: &TestProc, out: &mut Vec<String>) {
    out.push(String::new());
    if proc_.test_annotated {
        out.push(format!("{}@Test", INDENT));
    }
    out.push(format!("{}public void {}() {{", INDENT, proc_.name));

    // Declared names are tracked explicitly and threaded through every
    // statement; a second declaration of a name renders as an
    // update-in-place assignment.
    let mut declared: HashSet<String> = HashSet::new();
    let mut hoister = Hoister::default();
    for stmt in &proc_.body {
        lower_stmt(stmt, 2, &mut declared, &mut hoister, out);
    }

    out.push(format!("{}}}", INDENT));
}

fn lower_driver(suite: &TestSuite, out: &mut Vec<String>) {
    out.push(String::new());
    out.push(format!("{}public static void main(String[] args) {{", INDENT));
    let mut declared: HashSet<String> = HashSet::new();
    let mut hoister = Hoister::default();
    for stmt in &suite.driver {
        lower_stmt(stmt, 2, &mut declared, &mut hoister, out);
    }
    out.push(format!("{}}}", INDENT));
}

fn lower_stmt(
    stmt: &Stmt,
    depth: usize,
    declared: &mut HashSet<String>,
    hoister: &mut Hoister,
    out: &mut Vec<String>,
) {
    let pad = INDENT.repeat(depth);
    match stmt {
        Stmt::SymbolicInput { ty, name } => {
            declared.insert(name.clone());
            let host = types::host_type(ty);
            match types::classify(types::base_type(ty)) {
                TypeClass::Scalar | TypeClass::Text => {
                    out.push(format!("{}{} {} = Symbolic.input(\"{}\");", pad, host, name, name));
                }
                TypeClass::SetLike | TypeClass::MapLike => {
                    out.push(format!(
                        "{}{} {} = ({}) Symbolic.input(\"{}\");",
                        pad, host, name, host, name
                    ));
                }
            }
        }
        Stmt::VarDecl { ty, name, init } => {
            if declared.contains(name) {
                out.push(format!("{}{} = {};", pad, name, init));
            } else {
                declared.insert(name.clone());
                out.push(format!("{}{} {} = {};", pad, types::host_type(ty), name, init));
            }
        }
        Stmt::Assign { name, value } => {
            out.push(format!("{}{} = {};", pad, name, value));
        }
        Stmt::Assume(cond) => {
            out.push(format!("{}assume({});", pad, cond));
        }
        Stmt::Call(expr) => {
            out.push(format!("{}{};", pad, expr));
        }
        Stmt::If {
            cond,
            then_body,
            returns_on_true,
        } => {
            out.push(format!("{}if ({}) {{", pad, cond));
            for inner in then_body {
                lower_stmt(inner, depth + 1, declared, hoister, out);
            }
            if *returns_on_true {
                out.push(format!("{}{}return;", pad, INDENT));
            }
            out.push(format!("{}}}", pad));
        }
        Stmt::Assert(cond) => {
            let flattened = hoister.flatten(cond, &pad, declared, out);
            out.push(format!("{}assert({});", pad, flattened));
        }
    }
}

// ─── Assertion Flattening ─────────────────────────────────────────

/// Per-procedure hoist state: the synthetic-name counter and whether the
/// reserved recompute name has been claimed.
#[derive(Default)]
struct Hoister {
    tmp_counter: usize,
    reserved_used: bool,
}

impl Hoister {
    /// Hoist each distinct call embedded in an assertion condition into
    /// a named intermediate declared immediately before the assertion,
    /// and return the condition with every call site replaced by the
    /// intermediate's name. The same call written twice hoists once and
    /// runs once. A condition without calls is returned untouched, so
    /// an already-flattened assertion is a no-op.
    fn flatten(
        &mut self,
        cond: &Expr,
        pad: &str,
        declared: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) -> Expr {
        let mut seen: Vec<(String, String)> = Vec::new();
        self.walk(cond, pad, declared, &mut seen, out)
    }

    /// Post-order rebuild: children are flattened first so an outer call
    /// is hoisted with its inner call already replaced by a name.
    fn walk(
        &mut self,
        expr: &Expr,
        pad: &str,
        declared: &mut HashSet<String>,
        seen: &mut Vec<(String, String)>,
        out: &mut Vec<String>,
    ) -> Expr {
        match expr {
            Expr::Name(_) | Expr::Literal(_) => expr.clone(),
            Expr::Unary { op, operand } => {
                Expr::unary(*op, self.walk(operand, pad, declared, seen, out))
            }
            Expr::Binary { op, lhs, rhs } => Expr::binary(
                *op,
                self.walk(lhs, pad, declared, seen, out),
                self.walk(rhs, pad, declared, seen, out),
            ),
            Expr::Construct { ty, args } => Expr::Construct {
                ty: ty.clone(),
                args: args
                    .iter()
                    .map(|a| self.walk(a, pad, declared, seen, out))
                    .collect(),
            },
            Expr::Call { scope, name, args } => {
                let rebuilt = Expr::Call {
                    scope: scope
                        .as_ref()
                        .map(|s| Box::new(self.walk(s, pad, declared, seen, out))),
                    name: name.clone(),
                    args: args
                        .iter()
                        .map(|a| self.walk(a, pad, declared, seen, out))
                        .collect(),
                };
                let key = rebuilt.render();
                if let Some((_, var)) = seen.iter().find(|(k, _)| k == &key) {
                    return Expr::name(var.as_str());
                }

                let (var, decl_ty) = if !self.reserved_used && is_recompute(&rebuilt) {
                    self.reserved_used = true;
                    (EXPECTED_RESULT.to_string(), "Map<?,?>")
                } else {
                    let var = format!("tmp{}", self.tmp_counter);
                    self.tmp_counter += 1;
                    (var, "var")
                };

                if declared.contains(&var) {
                    out.push(format!("{}{} = {};", pad, var, rebuilt));
                } else {
                    declared.insert(var.clone());
                    out.push(format!("{}{} {} = {};", pad, decl_ty, var, rebuilt));
                }
                seen.push((key, var.clone()));
                Expr::name(var)
            }
        }
    }
}

/// A call recomputes the expected result when every argument is an
/// `_old` snapshot reference.
fn is_recompute(call: &Expr) -> bool {
    match call {
        Expr::Call { args, .. } => {
            !args.is_empty()
                && args
                    .iter()
                    .all(|a| matches!(a, Expr::Name(n) if n.ends_with("_old")))
        }
        _ => false,
    }
}
