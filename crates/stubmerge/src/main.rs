//! stubmerge: detect and merge consecutive stubbing calls in test sources.
//!
//! Three modes:
//!
//! 1. **analyze**: report every mergeable run of consecutive stubbing
//!    calls as JSON, one diagnostic per run with its proposed actions.
//! 2. **fix**: apply merge rewrites until no run remains, re-analyzing
//!    after each merge so later runs are rewritten against current text.
//! 3. **convert**: flip homogeneous `*Throw()` argument lists between
//!    class-literal and constructed-throwable form.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use serde::Serialize;
use stubmerge_analysis::{
    Diagnostic, MergeStrategy, ProposedAction, analyze_document,
    applicable_conversion, apply_merge, convert_throw_arguments,
};
use stubmerge_syntax::{Document, Handle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Detect and merge consecutive stubbing calls (`thenReturn`, `doThrow`,
/// `willReturn`, ...) in Mockito-style test sources.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report mergeable consecutive stubbing calls as JSON
    Analyze {
        /// Source file to analyze
        file: String,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Also analyze files that do not look like test sources
        #[arg(long)]
        include_non_test: bool,
    },

    /// Merge every detected run and print (or write back) the result
    Fix {
        /// Source file to rewrite
        file: String,

        /// Conversion to pick when a mixed run offers both forms
        #[arg(long, value_enum, default_value_t = Prefer::Classes)]
        prefer: Prefer,

        /// Rewrite the file in place instead of printing to stdout
        #[arg(long)]
        write: bool,

        /// Also rewrite files that do not look like test sources
        #[arg(long)]
        include_non_test: bool,
    },

    /// Flip homogeneous *Throw() argument lists between class-literal and
    /// constructed-throwable form
    Convert {
        /// Source file to rewrite
        file: String,

        /// Rewrite the file in place instead of printing to stdout
        #[arg(long)]
        write: bool,
    },
}

/// Which strategy to apply when a mixed throw-merge run offers a choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Prefer {
    /// Convert arguments to class literals (`IOException.class`)
    Classes,
    /// Convert arguments to constructed throwables (`new IOException()`)
    Throwables,
}

/// JSON report for one analyzed file.
#[derive(Serialize)]
struct Report<'a> {
    file: &'a str,
    diagnostics: &'a [Diagnostic],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize structured logging. Output goes to stderr so JSON output
    // on stdout remains clean for piping. Default to warn, allowlist our crates.
    const CRATES: &[&str] =
        &["stubmerge", "stubmerge_analysis", "stubmerge_syntax"];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            output,
            include_non_test,
        } => {
            if !include_non_test && !looks_like_test_source(Path::new(&file))
            {
                warn!(
                    file,
                    "skipping non-test source; pass --include-non-test to analyze anyway"
                );
                return Ok(());
            }
            let doc = read_document(&file)?;
            let diagnostics = analyze_document(&doc);
            info!(count = diagnostics.len(), "analysis complete");

            let report = Report {
                file: &file,
                diagnostics: &diagnostics,
            };
            // Lock stdout once up front rather than on each write call.
            // Stdout must outlive the lock, so we bind it here first.
            let stdout = std::io::stdout();
            let mut writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(stdout.lock()),
            };
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
            Ok(())
        }
        Commands::Fix {
            file,
            prefer,
            write,
            include_non_test,
        } => {
            if !include_non_test && !looks_like_test_source(Path::new(&file))
            {
                warn!(
                    file,
                    "skipping non-test source; pass --include-non-test to rewrite anyway"
                );
                return Ok(());
            }
            let mut doc = read_document(&file)?;
            let merged = fix_all(&mut doc, prefer)?;
            info!(merged, "fix complete");
            emit(&file, doc.text(), write)
        }
        Commands::Convert { file, write } => {
            let mut doc = read_document(&file)?;
            let converted = convert_all(&mut doc)?;
            info!(converted, "conversion complete");
            emit(&file, doc.text(), write)
        }
    }
}

fn read_document(file: &str) -> Result<Document> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {file}"))?;
    Ok(Document::new(text))
}

fn emit(file: &str, text: &str, write: bool) -> Result<()> {
    if write {
        std::fs::write(file, text)
            .with_context(|| format!("failed to write {file}"))?;
    } else {
        print!("{text}");
    }
    Ok(())
}

/// Merges runs until re-analysis reports none, applying one action per
/// pass. Each merge invalidates the other diagnostics of its pass, so the
/// document is re-analyzed before every application.
fn fix_all(doc: &mut Document, prefer: Prefer) -> Result<usize> {
    let mut merged = 0usize;
    loop {
        let diagnostics = analyze_document(doc);
        let Some(diagnostic) = diagnostics.first() else {
            return Ok(merged);
        };
        let action = pick_action(diagnostic, prefer);
        apply_merge(doc, action).with_context(|| {
            format!("failed to apply: {}", action.label)
        })?;
        merged += 1;

        // Every merge strictly shrinks the call count, so analysis must
        // converge; a guard protects against a rewrite that fails to.
        anyhow::ensure!(
            merged <= 10_000,
            "merge loop did not converge after {merged} rewrites"
        );
    }
}

fn pick_action(diagnostic: &Diagnostic, prefer: Prefer) -> &ProposedAction {
    if diagnostic.actions.len() == 1 {
        return &diagnostic.actions[0];
    }
    let wanted = match prefer {
        Prefer::Classes => MergeStrategy::ToTypeLiteral,
        Prefer::Throwables => MergeStrategy::ToConstructedInstance,
    };
    diagnostic
        .actions
        .iter()
        .find(|a| a.strategy == wanted)
        .unwrap_or(&diagnostic.actions[0])
}

/// Flips every convertible `*Throw()` call in the document.
///
/// Handles are structural (chain ordinal, call index) and conversions
/// neither add nor remove calls, so all eligible calls can be collected up
/// front and converted one transaction at a time.
fn convert_all(doc: &mut Document) -> Result<usize> {
    let mut eligible = Vec::new();
    let model = doc.model();
    for chain in 0..model.roots().len() {
        let mut call = 0;
        while let Some(id) = doc.resolve(Handle { chain, call }) {
            if applicable_conversion(model.get(id)).is_some() {
                eligible.push(Handle { chain, call });
            }
            call += 1;
        }
    }

    for handle in &eligible {
        convert_throw_arguments(doc, *handle)
            .context("throw-argument conversion failed")?;
    }
    Ok(eligible.len())
}

/// Heuristic for test-source gating: the analysis is only meaningful in
/// test code, mirroring how the original inspections restrict themselves
/// to test source roots.
fn looks_like_test_source(path: &Path) -> bool {
    let in_test_dir = path.components().any(|c| {
        matches!(
            c.as_os_str().to_str(),
            Some("test" | "tests" | "testData")
        )
    });
    let test_named = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with("Test") || s.ends_with("Tests"));
    in_test_dir || test_named
}
