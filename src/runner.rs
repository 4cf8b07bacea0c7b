//! Wrapper around the external symbolic-execution engine.
//!
//! The rendered suite text is the sole handoff artifact. This wrapper
//! persists it under a content-addressed name and returns the concrete
//! inputs the engine reports. Engine invocation itself is an integration
//! seam: the current implementation writes the artifact and reports no
//! inputs.

use std::fs;
use std::io;
use std::path::PathBuf;

/// One concrete input assignment reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcreteInput {
    pub variable: String,
    pub value: String,
}

/// Outcome of one engine run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Where the rendered suite was written.
    pub artifact: PathBuf,
    /// Concrete inputs discovered by the engine.
    pub inputs: Vec<ConcreteInput>,
}

pub struct SymRunner {
    out_dir: PathBuf,
}

impl SymRunner {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write the rendered suite to a content-addressed artifact and run
    /// the engine on it.
    pub fn run(&self, class_name: &str, source: &str) -> io::Result<RunReport> {
        fs::create_dir_all(&self.out_dir)?;
        let digest = blake3::hash(source.as_bytes()).to_hex();
        let artifact = self
            .out_dir
            .join(format!("{}-{}.java", class_name, &digest.as_str()[..16]));
        fs::write(&artifact, source)?;

        // TODO: spawn the engine on the artifact and parse the concrete
        // inputs it reports back.
        Ok(RunReport {
            artifact,
            inputs: Vec::new(),
        })
    }
}
