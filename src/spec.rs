//! Specification model: one function's contract plus the lookup service
//! the synthesis engine consumes.

use std::collections::HashMap;

use crate::ast::{BinOp, Expr};
use crate::span::{Span, Spanned};

/// A typed formal parameter. The type descriptor is opaque text; see
/// [`crate::types`] for capability queries over it.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

/// A function signature. Parameter order is significant and is preserved
/// in generated call argument order.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Param>,
}

impl FunctionSignature {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// One function's contract. The individual clause lists are retained for
/// traceability; the combined condition is always their left-fold
/// conjunction in declaration order, and absent (never a literal `true`)
/// when there are no clauses.
#[derive(Clone, Debug)]
pub struct FormalSpec {
    pub name: String,
    pub signature: FunctionSignature,
    pub requires: Vec<Expr>,
    pub ensures: Vec<Expr>,
    pub precondition: Option<Expr>,
    pub postcondition: Option<Expr>,
    pub span: Span,
}

impl FormalSpec {
    pub fn new(signature: FunctionSignature, requires: Vec<Expr>, ensures: Vec<Expr>, span: Span) -> Self {
        let precondition = conjoin(&requires);
        let postcondition = conjoin(&ensures);
        Self {
            name: signature.name.clone(),
            signature,
            requires,
            ensures,
            precondition,
            postcondition,
            span,
        }
    }
}

/// Left-fold conjunction of clauses in declaration order.
pub fn conjoin(clauses: &[Expr]) -> Option<Expr> {
    let mut iter = clauses.iter();
    let first = iter.next()?.clone();
    Some(iter.fold(first, |acc, clause| Expr::binary(BinOp::And, acc, clause.clone())))
}

/// Decompose a combined condition back into `count` conjuncts by walking
/// the left-associated `&&` spine. Inverse of [`conjoin`] for the clause
/// count it was built from.
pub fn split_conjuncts(combined: &Expr, count: usize) -> Vec<&Expr> {
    let mut parts = Vec::with_capacity(count);
    let mut node = combined;
    for _ in 1..count {
        match node {
            Expr::Binary {
                op: BinOp::And,
                lhs,
                rhs,
            } => {
                parts.push(rhs.as_ref());
                node = lhs;
            }
            other => {
                parts.push(other);
                break;
            }
        }
    }
    parts.push(node);
    parts.reverse();
    parts
}

/// A parsed spec file: the declared contracts plus the ordered invocation
/// list from its `run` statements.
#[derive(Clone, Debug)]
pub struct SpecFile {
    pub specs: Vec<FormalSpec>,
    pub run_list: Vec<Spanned<String>>,
}

/// Read-only specification lookup. Absence is a normal outcome: a call
/// may target an unspecified helper.
pub trait SpecLookup {
    fn find_spec(&self, name: &str) -> Option<&FormalSpec>;
}

/// Lookup over an owned spec list. At most one spec per name; the first
/// definition wins.
pub struct SpecIndex {
    specs: Vec<FormalSpec>,
    by_name: HashMap<String, usize>,
}

impl SpecIndex {
    pub fn build(specs: Vec<FormalSpec>) -> Self {
        let mut by_name = HashMap::new();
        for (idx, spec) in specs.iter().enumerate() {
            by_name.entry(spec.name.clone()).or_insert(idx);
        }
        Self { specs, by_name }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl SpecLookup for SpecIndex {
    fn find_spec(&self, name: &str) -> Option<&FormalSpec> {
        self.by_name.get(name).map(|&idx| &self.specs[idx])
    }
}
