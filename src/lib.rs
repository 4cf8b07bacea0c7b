//! specgen — compiles formal function specifications into symbolic test
//! drivers.
//!
//! Pipeline: spec text → [`spec::SpecFile`] → [`synth::synthesize`] →
//! [`ir::TestSuite`] → [`lower::render`] → host source text. The core is
//! a synchronous, side-effect-free batch transformation; all I/O lives
//! in the CLI and the runner wrapper.

pub mod ast;
pub mod diagnostic;
pub mod ir;
pub mod lexeme;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod runner;
pub mod span;
pub mod spec;
pub mod synth;
pub mod types;

pub use lower::{create_lowering, render, Lowering};
pub use synth::{synthesize, SpecResolutionError, SuiteOptions, Synthesis};

use std::collections::HashMap;

use diagnostic::{render_diagnostics, Diagnostic};
use lexer::Lexer;
use parser::Parser;
use span::Span;
use spec::{SpecFile, SpecIndex};

pub(crate) fn parse_source(source: &str, filename: &str) -> Result<SpecFile, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        render_diagnostics(&lex_errors, filename, source);
        return Err(lex_errors);
    }

    match Parser::new(tokens).parse_file() {
        Ok(file) => Ok(file),
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

pub fn parse_source_silent(source: &str) -> Result<SpecFile, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_file()
}

/// Compile a spec source string to rendered suite text.
pub fn generate(source: &str, filename: &str) -> Result<String, Vec<Diagnostic>> {
    generate_with_options(source, filename, &SuiteOptions::default())
}

/// Compile a spec source string to rendered suite text with options.
pub fn generate_with_options(
    source: &str,
    filename: &str,
    options: &SuiteOptions,
) -> Result<String, Vec<Diagnostic>> {
    let file = parse_source(source, filename)?;

    let calls: Vec<String> = file.run_list.iter().map(|c| c.node.clone()).collect();
    let spec_spans: HashMap<String, Span> = file
        .specs
        .iter()
        .map(|s| (s.name.clone(), s.span))
        .collect();

    let index = SpecIndex::build(file.specs);
    let result = synth::synthesize(&index, &calls, options);

    if !result.errors.is_empty() {
        let diagnostics: Vec<Diagnostic> = result
            .errors
            .iter()
            .map(|err| {
                let span = spec_spans
                    .get(&err.function)
                    .copied()
                    .unwrap_or_else(Span::dummy);
                Diagnostic::from_resolution(err, span)
            })
            .collect();
        render_diagnostics(&diagnostics, filename, source);
        return Err(diagnostics);
    }

    Ok(lower::render(&result.suite, &options.target))
}
