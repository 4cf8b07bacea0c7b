//! Synthesis engine: turns specifications plus an ordered invocation
//! list into a test-suite IR.
//!
//! One helper procedure is synthesized per distinct specified function,
//! in first-use order; the driver replays the original (non-deduplicated)
//! invocation list. A call name with no spec is skipped silently — it may
//! target an unspecified helper. A malformed spec fails alone: its error
//! is surfaced and every other spec in the run is unaffected.


use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ast::{BinOp, Expr, UnOp};
use crate::ir::{Stmt, TestProc, TestSuite};
use crate::spec::{FormalSpec, Param, SpecLookup};
use crate::types;

// ─── Options & Errors ─────────────────────────────────────────────

/// Options controlling suite synthesis: output naming + lowering target.
#[derive(Clone, Debug)]
pub struct SuiteOptions {
    /// Package of the generated suite file.
    pub package: String,
    /// Class name of the generated suite.
    pub class_name: String,
    /// Class hosting the functions under test.
    pub subject: String,
    /// Lowering target id (e.g. "java").
    pub target: String,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            package: "specgen.generated".to_string(),
            class_name: "GeneratedSuite".to_string(),
            subject: "Helper".to_string(),
            target: "java".to_string(),
        }
    }
}

/// A specification clause references an identifier with no matching
/// parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecResolutionError {
    pub function: String,
    pub identifier: String,
}

impl fmt::Display for SpecResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "specification '{}': unresolved identifier '{}'",
            self.function, self.identifier
        )
    }
}

impl std::error::Error for SpecResolutionError {}

/// Result of one synthesis run. A failing spec contributes no helper and
/// no driver statements; the rest of the suite is complete.
#[derive(Clone, Debug)]
pub struct Synthesis {
    pub suite: TestSuite,
    pub errors: Vec<SpecResolutionError>,
}

// ─── Suite Synthesis ──────────────────────────────────────────────

/// Synthesize a test suite for an ordered call list.
pub fn synthesize(lookup: &dyn SpecLookup, calls: &[String], options: &SuiteOptions) -> Synthesis {
    let mut attempted: BTreeSet<String> = BTreeSet::new();
    let mut synthesized: BTreeSet<String> = BTreeSet::new();
    let mut procs = Vec::new();
    let mut errors = Vec::new();

    for name in calls {
        if !attempted.insert(name.clone()) {
            continue;
        }
        let spec = match lookup.find_spec(name) {
            Some(spec) => spec,
            None => continue, // lookup miss: not an error
        };
        match build_helper(spec, options) {
            Ok(proc_) => {
                synthesized.insert(name.clone());
                procs.push(proc_);
            }
            Err(err) => errors.push(err),
        }
    }

    // Driver: declare one suite instance, then replay the original call
    // list against the helpers that exist.
    let mut driver = vec![Stmt::VarDecl {
        ty: options.class_name.clone(),
        name: "instance".to_string(),
        init: Expr::construct(options.class_name.as_str(), vec![]),
    }];
    for name in calls {
        if synthesized.contains(name) {
            driver.push(Stmt::Call(Expr::call(
                Some(Expr::name("instance")),
                format!("{}_helper", name),
                vec![],
            )));
        }
    }

    Synthesis {
        suite: TestSuite {
            package: options.package.clone(),
            class_name: options.class_name.clone(),
            imports: vec!["org.junit.Test".to_string(), "java.util.*".to_string()],
            procs,
            driver,
        },
        errors,
    }
}

// ─── Per-Function Synthesis ───────────────────────────────────────

/// Build the helper procedure for one specification.
fn build_helper(spec: &FormalSpec, options: &SuiteOptions) -> Result<TestProc, SpecResolutionError> {
    validate_spec(spec)?;

    let params = &spec.signature.params;
    let subject = options.subject.as_str();
    let mut body = Vec::new();

    // 1. Materialize one symbolic input per parameter, in signature order.
    for p in params {
        body.push(Stmt::SymbolicInput {
            ty: p.ty.clone(),
            name: p.name.clone(),
        });
    }

    // 2. Partition parameters on the base type's capability.
    let collections: Vec<&Param> = params
        .iter()
        .filter(|p| types::is_collection(&p.ty))
        .collect();

    let pre = spec
        .precondition
        .as_ref()
        .map(|p| qualify_calls(p, subject));
    let post = spec
        .postcondition
        .as_ref()
        .map(|p| qualify_calls(p, subject));

    // 3. Collection-typed symbolic inputs may legitimately be null, so
    // validity is established before any precondition reading their
    // contents is assumed. Scalar-only specs assume the precondition
    // immediately.
    if collections.is_empty() {
        if let Some(pre) = &pre {
            body.push(Stmt::Assume(pre.clone()));
        }
    } else {
        let any_null = fold_binary(BinOp::Or, collections.iter().map(|p| eq_null(&p.name)))
            .expect("at least one collection parameter");
        body.push(Stmt::If {
            cond: any_null,
            then_body: vec![],
            returns_on_true: true,
        });
        for p in &collections {
            body.push(Stmt::Assume(ne_null(&p.name)));
        }
        if let Some(pre) = &pre {
            body.push(Stmt::Assume(pre.clone()));
        }
    }

    // 4. Snapshot the pre-call state of every parameter the postcondition
    // reads. Collections get a structural copy — the call may mutate them
    // in place, and the assertion must compare against pre-call contents.
    let mut snapshots: BTreeMap<String, String> = BTreeMap::new();
    if let Some(post) = &post {
        let mut free = BTreeSet::new();
        post.free_names(&mut free);
        free.remove("null");
        for p in params {
            if !free.contains(&p.name) {
                continue;
            }
            let old_name = format!("{}_old", p.name);
            let init = match types::copy_constructor(&p.ty) {
                Some(ctor) => Expr::construct(ctor, vec![Expr::name(p.name.as_str())]),
                None => Expr::name(p.name.as_str()),
            };
            body.push(Stmt::VarDecl {
                ty: p.ty.clone(),
                name: old_name.clone(),
                init,
            });
            snapshots.insert(p.name.clone(), old_name);
        }
    }

    // 5. One trace print of the input that determined this outcome:
    // the first collection parameter, else the first scalar/textual one.
    let print_target = collections
        .first()
        .copied()
        .or_else(|| params.iter().find(|p| !types::is_collection(&p.ty)));
    if let Some(p) = print_target {
        body.push(trace_input(&p.name));
    }

    // 6. Post-state target: the first post-marked parameter. A
    // scalar/textual target receives its result through an indirection
    // the function mutates in place.
    let first_mark = post.as_ref().and_then(|post| {
        let mut marks = Vec::new();
        post.post_marks(&mut marks);
        marks.first().and_then(|mark| match mark {
            Expr::Name(name) => spec.signature.param(name),
            _ => None,
        })
    });
    let aliasing_target = first_mark.filter(|p| !types::is_collection(&p.ty));

    // 7. Invocation.
    if let Some(target) = aliasing_target {
        let ref_name = format!("{}Ref", target.name);
        let ref_ty = format!("{}[]", target.ty);
        body.push(Stmt::VarDecl {
            ty: ref_ty.clone(),
            name: ref_name.clone(),
            // The construction expression carries the host spelling
            // directly; the declaration type is host-mapped on rendering.
            init: Expr::construct(
                types::host_type(&ref_ty),
                vec![Expr::name(target.name.as_str())],
            ),
        });
        let args: Vec<Expr> = params
            .iter()
            .map(|p| {
                if p.name == target.name {
                    Expr::name(ref_name.as_str())
                } else {
                    Expr::name(p.name.as_str())
                }
            })
            .collect();
        body.push(Stmt::Call(Expr::call(
            Some(Expr::name(subject)),
            spec.name.as_str(),
            args,
        )));
        body.push(Stmt::Assign {
            name: target.name.clone(),
            value: Expr::name(format!("{}[0]", ref_name)),
        });
    } else {
        let args: Vec<Expr> = params.iter().map(|p| Expr::name(p.name.as_str())).collect();
        let call = Stmt::Call(Expr::call(
            Some(Expr::name(subject)),
            spec.name.as_str(),
            args,
        ));
        if collections.is_empty() {
            body.push(call);
        } else {
            // Skip (not abort) the invocation when a collection input is
            // null; the completion notice prints either way.
            let all_present =
                fold_binary(BinOp::And, collections.iter().map(|p| ne_null(&p.name)))
                    .expect("at least one collection parameter");
            body.push(Stmt::If {
                cond: all_present,
                then_body: vec![call],
                returns_on_true: false,
            });
            body.push(trace_text(format!(
                "Test Input: {}.{} completed",
                subject, spec.name
            )));
        }
    }

    // 8. Assert the postcondition against the captured pre-call state.
    if let Some(post) = &post {
        body.push(Stmt::Assert(rewrite_post(post, &snapshots)));
    }

    Ok(TestProc {
        name: format!("{}_helper", spec.name),
        test_annotated: true,
        body,
    })
}

// ─── Clause Validation & Rewriting ────────────────────────────────

/// Every free identifier of a clause must be a parameter (or the host
/// null literal), and every post-state marker must wrap a parameter name.
fn validate_spec(spec: &FormalSpec) -> Result<(), SpecResolutionError> {
    let mut conditions: Vec<&Expr> = Vec::new();
    if let Some(pre) = &spec.precondition {
        conditions.push(pre);
    }
    if let Some(post) = &spec.postcondition {
        conditions.push(post);
    }

    for cond in conditions {
        let mut names = Vec::new();
        cond.names_in_order(&mut names);
        for name in names {
            if name != "null" && spec.signature.param(&name).is_none() {
                return Err(SpecResolutionError {
                    function: spec.name.clone(),
                    identifier: name,
                });
            }
        }

        let mut marks = Vec::new();
        cond.post_marks(&mut marks);
        for mark in marks {
            let identifier = match mark {
                Expr::Name(name) if spec.signature.param(name).is_some() => continue,
                Expr::Name(name) => name.clone(),
                other => other.render(),
            };
            return Err(SpecResolutionError {
                function: spec.name.clone(),
                identifier,
            });
        }
    }
    Ok(())
}

/// Rewrite a postcondition for assertion after the call, in one pass:
/// post-marked references become the plain variable (which holds the
/// post-call value), and plain references to snapshotted parameters
/// become their `_old` snapshot.
fn rewrite_post(expr: &Expr, snapshots: &BTreeMap<String, String>) -> Expr {
    match expr {
        Expr::Unary {
            op: UnOp::Post,
            operand,
        } => (**operand).clone(),
        Expr::Name(name) => match snapshots.get(name) {
            Some(old) => Expr::name(old.as_str()),
            None => expr.clone(),
        },
        Expr::Literal(_) => expr.clone(),
        Expr::Unary { op, operand } => Expr::unary(*op, rewrite_post(operand, snapshots)),
        Expr::Binary { op, lhs, rhs } => Expr::binary(
            *op,
            rewrite_post(lhs, snapshots),
            rewrite_post(rhs, snapshots),
        ),
        Expr::Call { scope, name, args } => Expr::Call {
            scope: scope
                .as_ref()
                .map(|s| Box::new(rewrite_post(s, snapshots))),
            name: name.clone(),
            args: args.iter().map(|a| rewrite_post(a, snapshots)).collect(),
        },
        Expr::Construct { ty, args } => Expr::Construct {
            ty: ty.clone(),
            args: args.iter().map(|a| rewrite_post(a, snapshots)).collect(),
        },
    }
}

/// Resolve bare calls in a clause against the subject class:
/// `update(…)` becomes `Helper.update(…)`. Receiver-scoped calls like
/// `data.size()` are untouched.
fn qualify_calls(expr: &Expr, subject: &str) -> Expr {
    match expr {
        Expr::Name(_) | Expr::Literal(_) => expr.clone(),
        Expr::Unary { op, operand } => Expr::unary(*op, qualify_calls(operand, subject)),
        Expr::Binary { op, lhs, rhs } => Expr::binary(
            *op,
            qualify_calls(lhs, subject),
            qualify_calls(rhs, subject),
        ),
        Expr::Call { scope, name, args } => Expr::Call {
            scope: Some(Box::new(match scope {
                Some(s) => qualify_calls(s, subject),
                None => Expr::name(subject),
            })),
            name: name.clone(),
            args: args.iter().map(|a| qualify_calls(a, subject)).collect(),
        },
        Expr::Construct { ty, args } => Expr::Construct {
            ty: ty.clone(),
            args: args.iter().map(|a| qualify_calls(a, subject)).collect(),
        },
    }
}

// ─── Small Builders ───────────────────────────────────────────────

fn eq_null(name: &str) -> Expr {
    Expr::binary(BinOp::Eq, Expr::name(name), Expr::name("null"))
}

fn ne_null(name: &str) -> Expr {
    Expr::binary(BinOp::Ne, Expr::name(name), Expr::name("null"))
}

fn fold_binary(op: BinOp, mut exprs: impl Iterator<Item = Expr>) -> Option<Expr> {
    let first = exprs.next()?;
    Some(exprs.fold(first, |acc, e| Expr::binary(op, acc, e)))
}

fn trace_input(name: &str) -> Stmt {
    Stmt::Call(Expr::call(
        Some(Expr::name("System.out")),
        "println",
        vec![Expr::binary(
            BinOp::Add,
            Expr::string(format!("Test Input: {} = ", name)),
            Expr::name(name),
        )],
    ))
}

fn trace_text(text: String) -> Stmt {
    Stmt::Call(Expr::call(
        Some(Expr::name("System.out")),
        "println",
        vec![Expr::string(text)],
    ))
}
