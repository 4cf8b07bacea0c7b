//! Expression model shared by specifications and generated code.
//!
//! Trees are immutable once built: the specification model owns the parsed
//! clause trees, and the synthesis engine only ever builds new trees or
//! wraps existing ones. Every traversal is an exhaustive match over the
//! closed `Expr` union, so adding a variant breaks every site at compile
//! time instead of silently falling through.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ─── Operators ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Or,  // ||
    And, // &&
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Le,  // <=
    Gt,  // >
    Ge,  // >=
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
}

impl BinOp {
    /// Host-language symbol for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    /// Canonical operator name, the inverse of [`BinOp::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            BinOp::Or => "OR",
            BinOp::And => "AND",
            BinOp::Eq => "EQUALS",
            BinOp::Ne => "NOT_EQUALS",
            BinOp::Lt => "LESS",
            BinOp::Le => "LESS_EQUALS",
            BinOp::Gt => "GREATER",
            BinOp::Ge => "GREATER_EQUALS",
            BinOp::Add => "PLUS",
            BinOp::Sub => "MINUS",
            BinOp::Mul => "TIMES",
            BinOp::Div => "DIVIDE",
        }
    }

    /// Resolve an operator name. Building a tree with a name outside the
    /// enumeration is a programmer error and fails fast.
    pub fn from_name(name: &str) -> Result<BinOp, UnknownOperator> {
        match name {
            "OR" => Ok(BinOp::Or),
            "AND" => Ok(BinOp::And),
            "EQUALS" => Ok(BinOp::Eq),
            "NOT_EQUALS" => Ok(BinOp::Ne),
            "LESS" => Ok(BinOp::Lt),
            "LESS_EQUALS" => Ok(BinOp::Le),
            "GREATER" => Ok(BinOp::Gt),
            "GREATER_EQUALS" => Ok(BinOp::Ge),
            "PLUS" => Ok(BinOp::Add),
            "MINUS" => Ok(BinOp::Sub),
            "TIMES" => Ok(BinOp::Mul),
            "DIVIDE" => Ok(BinOp::Div),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Not, // !
    Neg, // -
    /// Post-state marker: `x'` denotes the value of `x` after the call.
    /// Decided at construction/parse time, never re-derived from text.
    Post,
}

impl UnOp {
    pub fn name(&self) -> &'static str {
        match self {
            UnOp::Not => "NOT",
            UnOp::Neg => "NEGATE",
            UnOp::Post => "POST",
        }
    }

    pub fn from_name(name: &str) -> Result<UnOp, UnknownOperator> {
        match name {
            "NOT" => Ok(UnOp::Not),
            "NEGATE" => Ok(UnOp::Neg),
            "POST" => Ok(UnOp::Post),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// An operator name outside the known enumeration was requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

// ─── Expressions ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
}

/// An expression tree. Used both for specification clauses and for the
/// code the synthesis engine generates.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Name(String),
    Literal(Literal),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `scope.name(args)`, or a bare `name(args)` when scope is absent.
    Call {
        scope: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    /// Object construction: `new Ty(args)`, or `new T[]{args}` for an
    /// array type (`ty` ending in `[]`).
    Construct {
        ty: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Expr {
        Expr::Name(name.into())
    }

    pub fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Literal(Literal::Str(value.into()))
    }

    pub fn boolean(value: bool) -> Expr {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn unary(op: UnOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Build a binary node from an operator name, validating the name
    /// against the operator enumeration.
    pub fn binary_named(op: &str, lhs: Expr, rhs: Expr) -> Result<Expr, UnknownOperator> {
        Ok(Expr::binary(BinOp::from_name(op)?, lhs, rhs))
    }

    /// Build a unary node from an operator name, validating the name
    /// against the operator enumeration.
    pub fn unary_named(op: &str, operand: Expr) -> Result<Expr, UnknownOperator> {
        Ok(Expr::unary(UnOp::from_name(op)?, operand))
    }

    pub fn call(scope: Option<Expr>, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            scope: scope.map(Box::new),
            name: name.into(),
            args,
        }
    }

    pub fn construct(ty: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Construct {
            ty: ty.into(),
            args,
        }
    }

    /// Render to host-language source text. Total and deterministic.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Collect free identifiers denoting pre-call state. Operands of a
    /// post-state marker are not free pre-state reads and are skipped;
    /// call and constructor names are not identifiers.
    pub fn free_names(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Name(name) => {
                out.insert(name.clone());
            }
            Expr::Literal(_) => {}
            Expr::Unary { op: UnOp::Post, .. } => {}
            Expr::Unary { operand, .. } => operand.free_names(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.free_names(out);
                rhs.free_names(out);
            }
            Expr::Call { scope, args, .. } => {
                if let Some(scope) = scope {
                    scope.free_names(out);
                }
                for arg in args {
                    arg.free_names(out);
                }
            }
            Expr::Construct { args, .. } => {
                for arg in args {
                    arg.free_names(out);
                }
            }
        }
    }

    /// Free identifiers in first-occurrence order (pre-order walk), with
    /// duplicates. Used to report the first offending identifier of a
    /// malformed clause deterministically.
    pub fn names_in_order(&self, out: &mut Vec<String>) {
        match self {
            Expr::Name(name) => out.push(name.clone()),
            Expr::Literal(_) => {}
            Expr::Unary { op: UnOp::Post, .. } => {}
            Expr::Unary { operand, .. } => operand.names_in_order(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.names_in_order(out);
                rhs.names_in_order(out);
            }
            Expr::Call { scope, args, .. } => {
                if let Some(scope) = scope {
                    scope.names_in_order(out);
                }
                for arg in args {
                    arg.names_in_order(out);
                }
            }
            Expr::Construct { args, .. } => {
                for arg in args {
                    arg.names_in_order(out);
                }
            }
        }
    }

    /// Collect embedded `Call` nodes in pre-order (position order).
    pub fn find_calls<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Expr::Name(_) | Expr::Literal(_) => {}
            Expr::Unary { operand, .. } => operand.find_calls(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.find_calls(out);
                rhs.find_calls(out);
            }
            Expr::Call { scope, args, .. } => {
                out.push(self);
                if let Some(scope) = scope {
                    scope.find_calls(out);
                }
                for arg in args {
                    arg.find_calls(out);
                }
            }
            Expr::Construct { args, .. } => {
                for arg in args {
                    arg.find_calls(out);
                }
            }
        }
    }

    /// Collect the operands of post-state markers in pre-order.
    pub fn post_marks<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Expr::Name(_) | Expr::Literal(_) => {}
            Expr::Unary {
                op: UnOp::Post,
                operand,
            } => out.push(operand),
            Expr::Unary { operand, .. } => operand.post_marks(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.post_marks(out);
                rhs.post_marks(out);
            }
            Expr::Call { scope, args, .. } => {
                if let Some(scope) = scope {
                    scope.post_marks(out);
                }
                for arg in args {
                    arg.post_marks(out);
                }
            }
            Expr::Construct { args, .. } => {
                for arg in args {
                    arg.post_marks(out);
                }
            }
        }
    }

    /// Substitution: produce a new tree with every `Name` renamed per the
    /// mapping. The original tree is untouched.
    pub fn substitute(&self, renames: &BTreeMap<String, String>) -> Expr {
        match self {
            Expr::Name(name) => match renames.get(name) {
                Some(renamed) => Expr::Name(renamed.clone()),
                None => self.clone(),
            },
            Expr::Literal(_) => self.clone(),
            Expr::Unary { op, operand } => Expr::unary(*op, operand.substitute(renames)),
            Expr::Binary { op, lhs, rhs } => {
                Expr::binary(*op, lhs.substitute(renames), rhs.substitute(renames))
            }
            Expr::Call { scope, name, args } => Expr::Call {
                scope: scope.as_ref().map(|s| Box::new(s.substitute(renames))),
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(renames)).collect(),
            },
            Expr::Construct { ty, args } => Expr::Construct {
                ty: ty.clone(),
                args: args.iter().map(|a| a.substitute(renames)).collect(),
            },
        }
    }
}

// ─── Rendering ────────────────────────────────────────────────────

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Literal(Literal::Int(value)) => write!(f, "{}", value),
            Expr::Literal(Literal::Bool(value)) => write!(f, "{}", value),
            Expr::Literal(Literal::Str(value)) => write!(f, "\"{}\"", escape_str(value)),
            Expr::Unary {
                op: UnOp::Post,
                operand,
            } => write!(f, "{}'", operand),
            Expr::Unary { op: UnOp::Not, operand } => write!(f, "!{}", operand),
            Expr::Unary { op: UnOp::Neg, operand } => write!(f, "-{}", operand),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.as_str(), rhs),
            Expr::Call { scope, name, args } => {
                if let Some(scope) = scope {
                    write!(f, "{}.", scope)?;
                }
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expr::Construct { ty, args } => {
                if let Some(element) = ty.strip_suffix("[]") {
                    write!(f, "new {}[]{{", element)?;
                    write_args(f, args)?;
                    write!(f, "}}")
                } else {
                    write!(f, "new {}(", ty)?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

fn escape_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

// ─── Tests ────────────────────────────────────────────────────────
