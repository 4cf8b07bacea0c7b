use super::*;
use crate::ast::{BinOp, Expr};
use crate::ir::{Stmt, TestProc, TestSuite};

fn suite_with(body: Vec<Stmt>) -> TestSuite {
    TestSuite {
        package: "specgen.generated".to_string(),
        class_name: "GeneratedSuite".to_string(),
        imports: vec!["org.junit.Test".to_string(), "java.util.*".to_string()],
        procs: vec![TestProc {
            name: "t_helper".to_string(),
            test_annotated: true,
            body,
        }],
        driver: vec![],
    }
}

fn lower_lines(body: Vec<Stmt>) -> Vec<String> {
    JavaLowering::new().lower(&suite_with(body))
}

/// The statement lines of the single helper procedure.
fn body_lines(body: Vec<Stmt>) -> Vec<String> {
    let lines = lower_lines(body);
    let start = lines
        .iter()
        .position(|l| l.contains("public void t_helper()"))
        .expect("helper opens")
        + 1;
    let end = lines[start..]
        .iter()
        .position(|l| l == "    }")
        .expect("helper closes")
        + start;
    lines[start..end].to_vec()
}

#[test]
fn test_header_and_class_layout() {
    let lines = lower_lines(vec![]);
    assert_eq!(lines[0], "package specgen.generated;");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "import org.junit.Test;");
    assert_eq!(lines[3], "import java.util.*;");
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], "public class GeneratedSuite {");
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "    @Test");
    assert_eq!(lines[8], "    public void t_helper() {");
    assert_eq!(lines.last().unwrap(), "}");
}

#[test]
fn test_annotation_can_be_absent() {
    let mut suite = suite_with(vec![]);
    suite.procs[0].test_annotated = false;
    let lines = JavaLowering::new().lower(&suite);
    assert!(!lines.iter().any(|l| l.contains("@Test")));
}

#[test]
fn test_symbolic_input_forms() {
    let lines = body_lines(vec![
        Stmt::SymbolicInput {
            ty: "int".to_string(),
            name: "x".to_string(),
        },
        Stmt::SymbolicInput {
            ty: "Set<int>".to_string(),
            name: "data".to_string(),
        },
        Stmt::SymbolicInput {
            ty: "string".to_string(),
            name: "label".to_string(),
        },
    ]);
    assert_eq!(
        lines,
        vec![
            "        int x = Symbolic.input(\"x\");",
            "        Set<Integer> data = (Set<Integer>) Symbolic.input(\"data\");",
            "        String label = Symbolic.input(\"label\");",
        ]
    );
}

#[test]
fn test_redeclaration_renders_as_assignment() {
    let lines = body_lines(vec![
        Stmt::VarDecl {
            ty: "int".to_string(),
            name: "y".to_string(),
            init: Expr::int(1),
        },
        Stmt::VarDecl {
            ty: "int".to_string(),
            name: "y".to_string(),
            init: Expr::int(2),
        },
    ]);
    assert_eq!(lines, vec!["        int y = 1;", "        y = 2;"]);
}

#[test]
fn test_early_return_guard() {
    let lines = body_lines(vec![Stmt::If {
        cond: Expr::binary(BinOp::Eq, Expr::name("data"), Expr::name("null")),
        then_body: vec![],
        returns_on_true: true,
    }]);
    assert_eq!(
        lines,
        vec![
            "        if ((data == null)) {",
            "            return;",
            "        }",
        ]
    );
}

#[test]
fn test_guarded_call_runs_without_return() {
    let lines = body_lines(vec![Stmt::If {
        cond: Expr::binary(BinOp::Ne, Expr::name("data"), Expr::name("null")),
        then_body: vec![Stmt::Call(Expr::call(
            Some(Expr::name("Helper")),
            "process",
            vec![Expr::name("data")],
        ))],
        returns_on_true: false,
    }]);
    assert_eq!(
        lines,
        vec![
            "        if ((data != null)) {",
            "            Helper.process(data);",
            "        }",
        ]
    );
}

#[test]
fn test_assume_and_assign() {
    let lines = body_lines(vec![
        Stmt::Assume(Expr::binary(BinOp::Gt, Expr::name("x"), Expr::int(0))),
        Stmt::Assign {
            name: "x".to_string(),
            value: Expr::name("xRef[0]"),
        },
    ]);
    assert_eq!(
        lines,
        vec!["        assume((x > 0));", "        x = xRef[0];"]
    );
}

#[test]
fn test_assert_without_calls_is_untouched() {
    let lines = body_lines(vec![Stmt::Assert(Expr::binary(
        BinOp::Gt,
        Expr::name("x"),
        Expr::name("x_old"),
    ))]);
    assert_eq!(lines, vec!["        assert((x > x_old));"]);
}

#[test]
fn test_flatten_hoists_same_call_once() {
    let update = Expr::call(Some(Expr::name("Helper")), "update", vec![Expr::name("x_old")]);
    let lines = body_lines(vec![Stmt::Assert(Expr::binary(
        BinOp::Eq,
        update.clone(),
        update,
    ))]);
    assert_eq!(
        lines,
        vec![
            "        Map<?,?> expectedResult = Helper.update(x_old);",
            "        assert((expectedResult == expectedResult));",
        ]
    );
}

#[test]
fn test_flatten_nested_calls_innermost_first() {
    let cond = Expr::call(
        Some(Expr::name("result")),
        "equals",
        vec![Expr::call(
            Some(Expr::name("Helper")),
            "update",
            vec![Expr::name("result_old"), Expr::name("data_old")],
        )],
    );
    let lines = body_lines(vec![Stmt::Assert(cond)]);
    assert_eq!(
        lines,
        vec![
            "        Map<?,?> expectedResult = Helper.update(result_old, data_old);",
            "        var tmp0 = result.equals(expectedResult);",
            "        assert(tmp0);",
        ]
    );
}

#[test]
fn test_reserved_name_claimed_once() {
    let cond = Expr::binary(
        BinOp::Eq,
        Expr::call(Some(Expr::name("Helper")), "update", vec![Expr::name("a_old")]),
        Expr::call(Some(Expr::name("Helper")), "refresh", vec![Expr::name("a_old")]),
    );
    let lines = body_lines(vec![Stmt::Assert(cond)]);
    assert_eq!(
        lines,
        vec![
            "        Map<?,?> expectedResult = Helper.update(a_old);",
            "        var tmp0 = Helper.refresh(a_old);",
            "        assert((expectedResult == tmp0));",
        ]
    );
}

#[test]
fn test_calls_with_plain_arguments_get_synthetic_names() {
    let cond = Expr::binary(
        BinOp::Gt,
        Expr::call(Some(Expr::name("data")), "size", vec![]),
        Expr::int(0),
    );
    let lines = body_lines(vec![Stmt::Assert(cond)]);
    assert_eq!(
        lines,
        vec![
            "        var tmp0 = data.size();",
            "        assert((tmp0 > 0));",
        ]
    );
}

#[test]
fn test_driver_renders_all_statements_in_order() {
    let mut suite = suite_with(vec![]);
    suite.driver = vec![
        Stmt::VarDecl {
            ty: "GeneratedSuite".to_string(),
            name: "instance".to_string(),
            init: Expr::construct("GeneratedSuite", vec![]),
        },
        Stmt::Call(Expr::call(Some(Expr::name("instance")), "t_helper", vec![])),
        Stmt::Call(Expr::call(Some(Expr::name("instance")), "t_helper", vec![])),
    ];
    let lines = JavaLowering::new().lower(&suite);
    let main_start = lines
        .iter()
        .position(|l| l.contains("public static void main"))
        .expect("driver present");
    assert_eq!(
        lines[main_start + 1],
        "        GeneratedSuite instance = new GeneratedSuite();"
    );
    assert_eq!(lines[main_start + 2], "        instance.t_helper();");
    assert_eq!(lines[main_start + 3], "        instance.t_helper();");
}

#[test]
fn test_render_is_deterministic() {
    let body = vec![
        Stmt::SymbolicInput {
            ty: "int".to_string(),
            name: "x".to_string(),
        },
        Stmt::Assert(Expr::binary(
            BinOp::Eq,
            Expr::call(Some(Expr::name("Helper")), "probe", vec![Expr::name("x")]),
            Expr::int(0),
        )),
    ];
    let first = super::render(&suite_with(body.clone()), "java");
    let second = super::render(&suite_with(body), "java");
    assert_eq!(first, second);
}
