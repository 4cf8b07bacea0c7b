use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use specgen::runner::SymRunner;
use specgen::SuiteOptions;

#[derive(Parser)]
#[command(
    name = "specgen",
    version,
    about = "Compile formal function specifications into symbolic test drivers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a test-suite source file from a spec file
    Gen {
        /// Input .spec file
        input: PathBuf,
        /// Output file (default: <input>.java)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Package of the generated suite
        #[arg(long, default_value = "specgen.generated")]
        package: String,
        /// Class name of the generated suite
        #[arg(long, default_value = "GeneratedSuite")]
        class_name: String,
        /// Class hosting the functions under test
        #[arg(long, default_value = "Helper")]
        subject: String,
        /// Lowering target (default: java)
        #[arg(long, default_value = "java")]
        target: String,
    },
    /// Parse and synthesize without writing output
    Check {
        /// Input .spec file
        input: PathBuf,
    },
    /// Generate and hand the suite to the symbolic-execution runner
    Run {
        /// Input .spec file
        input: PathBuf,
        /// Artifact directory
        #[arg(long, default_value = "specgen-out")]
        out_dir: PathBuf,
        /// Class hosting the functions under test
        #[arg(long, default_value = "Helper")]
        subject: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Gen {
            input,
            output,
            package,
            class_name,
            subject,
            target,
        } => {
            let options = SuiteOptions {
                package,
                class_name,
                subject,
                target,
            };
            let text = generate_or_exit(&input, &options);
            let out_path = output.unwrap_or_else(|| input.with_extension("java"));
            if let Err(err) = std::fs::write(&out_path, &text) {
                eprintln!("error: cannot write {}: {}", out_path.display(), err);
                process::exit(1);
            }
            println!("wrote {}", out_path.display());
        }
        Command::Check { input } => {
            let _ = generate_or_exit(&input, &SuiteOptions::default());
            println!("ok: {}", input.display());
        }
        Command::Run {
            input,
            out_dir,
            subject,
        } => {
            let options = SuiteOptions {
                subject,
                ..SuiteOptions::default()
            };
            let text = generate_or_exit(&input, &options);
            match SymRunner::new(out_dir).run(&options.class_name, &text) {
                Ok(report) => {
                    println!("artifact: {}", report.artifact.display());
                    if report.inputs.is_empty() {
                        println!("no concrete inputs reported (engine integration pending)");
                    } else {
                        for concrete in &report.inputs {
                            println!("{} = {}", concrete.variable, concrete.value);
                        }
                    }
                }
                Err(err) => {
                    eprintln!("error: runner failed: {}", err);
                    process::exit(1);
                }
            }
        }
    }
}

fn generate_or_exit(input: &Path, options: &SuiteOptions) -> String {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", input.display(), err);
            process::exit(1);
        }
    };
    let filename = input.display().to_string();
    match specgen::generate_with_options(&source, &filename, options) {
        Ok(text) => text,
        // Diagnostics were already rendered to stderr.
        Err(_) => process::exit(1),
    }
}
