//! Lowering: consumes a `TestSuite` IR and produces host-language
//! source text.
//!
//! Each target implements `Lowering` to control statement layout and
//! assertion flattening. Lowering is a pure function of the IR: no
//! hidden state survives a call, and the IR is never mutated.

#[cfg(test)]
mod tests;

mod java;

use crate::ir::TestSuite;

pub use java::JavaLowering;

/// Lowers a test-suite IR into source lines.
pub trait Lowering {
    fn lower(&self, suite: &TestSuite) -> Vec<String>;
}

/// Create a lowering backend for the given target name.
pub fn create_lowering(_target: &str) -> Box<dyn Lowering> {
    Box::new(JavaLowering::new())
}

/// Render a suite to source text for the given target.
pub fn render(suite: &TestSuite, target: &str) -> String {
    let mut text = create_lowering(target).lower(suite).join("\n");
    text.push('\n');
    text
}
