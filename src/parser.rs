use crate::ast::{BinOp, Expr, UnOp};
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};
use crate::spec::{FormalSpec, FunctionSignature, Param, SpecFile};

const MAX_NESTING_DEPTH: u32 = 128;

pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    pub fn parse_file(mut self) -> Result<SpecFile, Vec<Diagnostic>> {
        let mut specs = Vec::new();
        let mut run_list = Vec::new();

        loop {
            if self.at(&Lexeme::Eof) {
                break;
            }
            if self.at(&Lexeme::Spec) {
                specs.push(self.parse_spec());
            } else if self.at(&Lexeme::Run) {
                self.parse_run(&mut run_list);
            } else {
                let tok = self.advance();
                self.error_at(
                    format!(
                        "expected 'spec' or 'run' at top level, found {}",
                        tok.node.describe()
                    ),
                    tok.span,
                );
            }
        }

        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(SpecFile { specs, run_list })
    }

    // ─── Declarations ─────────────────────────────────────────────

    fn parse_spec(&mut self) -> FormalSpec {
        let start = self.current_span();
        self.expect(&Lexeme::Spec);
        let name = self.expect_ident();

        self.expect(&Lexeme::LParen);
        let mut params = Vec::new();
        if !self.at(&Lexeme::RParen) {
            loop {
                let param_name = self.expect_ident();
                self.expect(&Lexeme::Colon);
                let ty = self.parse_type();
                params.push(Param {
                    name: param_name.node,
                    ty,
                });
                if !self.eat(&Lexeme::Comma) {
                    break;
                }
            }
        }
        self.expect(&Lexeme::RParen);

        self.expect(&Lexeme::LBrace);
        let mut requires = Vec::new();
        let mut ensures = Vec::new();
        loop {
            if self.eat(&Lexeme::Requires) {
                let clause_span = self.current_span();
                let clause = self.parse_expr();
                self.expect(&Lexeme::Semicolon);
                let mut marks = Vec::new();
                clause.post_marks(&mut marks);
                if !marks.is_empty() {
                    self.error_at(
                        "post-state marker is not allowed in a requires clause".to_string(),
                        clause_span,
                    );
                }
                requires.push(clause);
            } else if self.eat(&Lexeme::Ensures) {
                let clause = self.parse_expr();
                self.expect(&Lexeme::Semicolon);
                ensures.push(clause);
            } else if self.at(&Lexeme::RBrace) || self.at(&Lexeme::Eof) {
                break;
            } else {
                let tok = self.advance();
                self.error_at(
                    format!(
                        "expected 'requires', 'ensures' or '}}', found {}",
                        tok.node.describe()
                    ),
                    tok.span,
                );
            }
        }
        let end = self.current_span();
        self.expect(&Lexeme::RBrace);

        FormalSpec::new(
            FunctionSignature {
                name: name.node,
                params,
            },
            requires,
            ensures,
            start.merge(end),
        )
    }

    fn parse_run(&mut self, out: &mut Vec<Spanned<String>>) {
        self.expect(&Lexeme::Run);
        loop {
            let name = self.expect_ident();
            if !name.node.is_empty() {
                out.push(name);
            }
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::Semicolon);
    }

    /// A type descriptor, rendered to its canonical opaque string:
    /// `Map<int, int>`, `Set<Set<int>>`.
    fn parse_type(&mut self) -> String {
        let base = self.expect_ident().node;
        if !self.eat(&Lexeme::Lt) {
            return base;
        }
        let mut args = vec![self.parse_type()];
        while self.eat(&Lexeme::Comma) {
            args.push(self.parse_type());
        }
        self.expect(&Lexeme::Gt);
        format!("{}<{}>", base, args.join(", "))
    }

    // ─── Expressions ──────────────────────────────────────────────

    fn parse_expr(&mut self) -> Expr {
        if !self.enter_nesting() {
            return Expr::int(0);
        }
        let expr = self.parse_or();
        self.exit_nesting();
        expr
    }

    fn parse_or(&mut self) -> Expr {
        let mut lhs = self.parse_and();
        while self.eat(&Lexeme::PipePipe) {
            let rhs = self.parse_and();
            lhs = Expr::binary(BinOp::Or, lhs, rhs);
        }
        lhs
    }

    fn parse_and(&mut self) -> Expr {
        let mut lhs = self.parse_equality();
        while self.eat(&Lexeme::AmpAmp) {
            let rhs = self.parse_equality();
            lhs = Expr::binary(BinOp::And, lhs, rhs);
        }
        lhs
    }

    fn parse_equality(&mut self) -> Expr {
        let mut lhs = self.parse_relational();
        loop {
            let op = if self.eat(&Lexeme::EqEq) {
                BinOp::Eq
            } else if self.eat(&Lexeme::BangEq) {
                BinOp::Ne
            } else {
                break;
            };
            let rhs = self.parse_relational();
            lhs = Expr::binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_relational(&mut self) -> Expr {
        let mut lhs = self.parse_additive();
        loop {
            let op = if self.eat(&Lexeme::Lt) {
                BinOp::Lt
            } else if self.eat(&Lexeme::Le) {
                BinOp::Le
            } else if self.eat(&Lexeme::Gt) {
                BinOp::Gt
            } else if self.eat(&Lexeme::Ge) {
                BinOp::Ge
            } else {
                break;
            };
            let rhs = self.parse_additive();
            lhs = Expr::binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_additive(&mut self) -> Expr {
        let mut lhs = self.parse_multiplicative();
        loop {
            let op = if self.eat(&Lexeme::Plus) {
                BinOp::Add
            } else if self.eat(&Lexeme::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let rhs = self.parse_multiplicative();
            lhs = Expr::binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            let op = if self.eat(&Lexeme::Star) {
                BinOp::Mul
            } else if self.eat(&Lexeme::Slash) {
                BinOp::Div
            } else {
                break;
            };
            let rhs = self.parse_unary();
            lhs = Expr::binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        if self.eat(&Lexeme::Bang) {
            return Expr::unary(UnOp::Not, self.parse_unary());
        }
        if self.eat(&Lexeme::Minus) {
            return Expr::unary(UnOp::Neg, self.parse_unary());
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            if self.at(&Lexeme::LParen) {
                match expr {
                    Expr::Name(name) => {
                        self.advance();
                        let args = self.parse_args();
                        expr = Expr::call(None, name, args);
                    }
                    other => {
                        self.error("call target must be a name".to_string());
                        self.advance();
                        let _ = self.parse_args();
                        expr = other;
                    }
                }
            } else if self.eat(&Lexeme::Dot) {
                let method = self.expect_ident();
                self.expect(&Lexeme::LParen);
                let args = self.parse_args();
                expr = Expr::call(Some(expr), method.node, args);
            } else if self.at(&Lexeme::Prime) {
                match &expr {
                    Expr::Name(_) => {
                        self.advance();
                        expr = Expr::unary(UnOp::Post, expr);
                    }
                    _ => {
                        self.error_with_help(
                            "post-state marker must follow a parameter name",
                            "write `x'` (or `x_post`) where x is a parameter",
                        );
                        self.advance();
                    }
                }
            } else {
                break;
            }
        }
        expr
    }

    /// Arguments after an already-consumed `(`.
    fn parse_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.eat(&Lexeme::RParen) {
            return args;
        }
        loop {
            args.push(self.parse_expr());
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen);
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let tok = self.current().clone();
        match tok.node {
            Lexeme::Integer(value) => {
                self.advance();
                Expr::int(value)
            }
            Lexeme::Str(value) => {
                self.advance();
                Expr::string(value)
            }
            Lexeme::True => {
                self.advance();
                Expr::boolean(true)
            }
            Lexeme::False => {
                self.advance();
                Expr::boolean(false)
            }
            // The host null literal behaves as a name in conditions.
            Lexeme::Null => {
                self.advance();
                Expr::name("null")
            }
            Lexeme::Ident(name) => {
                self.advance();
                normalize_post_ident(name)
            }
            Lexeme::LParen => {
                self.advance();
                let expr = self.parse_expr();
                self.expect(&Lexeme::RParen);
                expr
            }
            other => {
                self.error_at(
                    format!("expected expression, found {}", other.describe()),
                    tok.span,
                );
                self.advance();
                Expr::int(0)
            }
        }
    }

    // ─── Token helpers ────────────────────────────────────────────

    fn current(&self) -> &Spanned<Lexeme> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn at(&self, lexeme: &Lexeme) -> bool {
        &self.current().node == lexeme
    }

    fn advance(&mut self) -> Spanned<Lexeme> {
        let tok = self.current().clone();
        if tok.node != Lexeme::Eof {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, lexeme: &Lexeme) -> bool {
        if self.at(lexeme) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, lexeme: &Lexeme) -> Span {
        if self.at(lexeme) {
            return self.advance().span;
        }
        let found = self.current().clone();
        self.error_at(
            format!(
                "expected {}, found {}",
                lexeme.describe(),
                found.node.describe()
            ),
            found.span,
        );
        found.span
    }

    fn expect_ident(&mut self) -> Spanned<String> {
        let tok = self.current().clone();
        if let Lexeme::Ident(name) = tok.node {
            self.advance();
            return Spanned::new(name, tok.span);
        }
        self.error_at(
            format!("expected identifier, found {}", tok.node.describe()),
            tok.span,
        );
        Spanned::new(String::new(), tok.span)
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "expression nesting depth exceeded (maximum 128 levels)",
                "split the clause into several requires/ensures clauses",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn error(&mut self, message: String) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    fn error_at(&mut self, message: String, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    fn error_with_help(&mut self, message: &str, help: &str) {
        let span = self.current_span();
        self.diagnostics
            .push(Diagnostic::error(message.to_string(), span).with_help(help.to_string()));
    }
}

/// Normalize the `name_post` identifier spelling to the post-state marker
/// tag, so downstream code never inspects identifier text.
fn normalize_post_ident(name: String) -> Expr {
    if let Some(base) = name.strip_suffix("_post") {
        if !base.is_empty() {
            return Expr::unary(UnOp::Post, Expr::name(base));
        }
    }
    Expr::Name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> SpecFile {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        Parser::new(tokens).parse_file().expect("parse failed")
    }

    fn parse_errors(source: &str) -> Vec<Diagnostic> {
        let (tokens, _) = Lexer::new(source).tokenize();
        Parser::new(tokens).parse_file().expect_err("expected errors")
    }

    #[test]
    fn test_parse_scalar_spec() {
        let file = parse("spec increment(x: int) { requires x > 0; ensures x' > x; }");
        assert_eq!(file.specs.len(), 1);
        let spec = &file.specs[0];
        assert_eq!(spec.name, "increment");
        assert_eq!(spec.signature.params.len(), 1);
        assert_eq!(spec.signature.params[0].name, "x");
        assert_eq!(spec.signature.params[0].ty, "int");
        assert_eq!(spec.precondition.as_ref().unwrap().render(), "(x > 0)");
        assert_eq!(spec.postcondition.as_ref().unwrap().render(), "(x' > x)");
    }

    #[test]
    fn test_parse_generic_types() {
        let file = parse(
            "spec process(data: Set<int>, result: Map<int, int>) { ensures result.size() == data.size(); }",
        );
        let spec = &file.specs[0];
        assert_eq!(spec.signature.params[0].ty, "Set<int>");
        assert_eq!(spec.signature.params[1].ty, "Map<int, int>");
        assert_eq!(
            spec.postcondition.as_ref().unwrap().render(),
            "(result.size() == data.size())"
        );
    }

    #[test]
    fn test_multiple_clauses_conjoined_in_order() {
        let file = parse("spec f(x: int, y: int) { requires x > 0; requires y > 0; requires x < y; }");
        let spec = &file.specs[0];
        assert_eq!(spec.requires.len(), 3);
        assert_eq!(
            spec.precondition.as_ref().unwrap().render(),
            "(((x > 0) && (y > 0)) && (x < y))"
        );
        assert!(spec.postcondition.is_none());
    }

    #[test]
    fn test_post_spellings_normalize_to_same_tag() {
        let primed = parse("spec f(x: int) { ensures x' > x; }");
        let suffixed = parse("spec f(x: int) { ensures x_post > x; }");
        assert_eq!(
            primed.specs[0].postcondition.as_ref().unwrap(),
            suffixed.specs[0].postcondition.as_ref().unwrap()
        );
    }

    #[test]
    fn test_run_list_keeps_order_and_repeats() {
        let file = parse("spec f(x: int) {}\nrun f, g, f;\nrun f;");
        let names: Vec<&str> = file.run_list.iter().map(|s| s.node.as_str()).collect();
        assert_eq!(names, vec!["f", "g", "f", "f"]);
    }

    #[test]
    fn test_precedence() {
        let file = parse("spec f(x: int, y: int) { requires x + 1 > y * 2 && x != y; }");
        assert_eq!(
            file.specs[0].precondition.as_ref().unwrap().render(),
            "(((x + 1) > (y * 2)) && (x != y))"
        );
    }

    #[test]
    fn test_null_parses_as_name() {
        let file = parse("spec f(data: Set<int>) { requires data != null; }");
        assert_eq!(
            file.specs[0].precondition.as_ref().unwrap().render(),
            "(data != null)"
        );
    }

    #[test]
    fn test_missing_semicolon_is_reported() {
        let errors = parse_errors("spec f(x: int) { requires x > 0 }");
        assert!(errors.iter().any(|d| d.message.contains("expected Semicolon")));
    }

    #[test]
    fn test_top_level_garbage_is_reported() {
        let errors = parse_errors("bogus spec f(x: int) {}");
        assert!(errors[0].message.contains("expected 'spec' or 'run'"));
    }

    #[test]
    fn test_post_marker_rejected_in_requires() {
        let errors = parse_errors("spec f(x: int) { requires x' > 0; }");
        assert!(errors
            .iter()
            .any(|d| d.message.contains("not allowed in a requires clause")));
    }

    #[test]
    fn test_prime_after_non_name_is_rejected() {
        let errors = parse_errors("spec f(x: int) { ensures (x + 1)' > 0; }");
        assert!(errors
            .iter()
            .any(|d| d.message.contains("post-state marker")));
    }
}
