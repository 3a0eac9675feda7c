//! Pseudo-Java to Java source translation.
//!
//! `pseudojava-compiler` turns indentation-structured pseudo-code with
//! class-like templates into compilable Java. Every surface synonym collapses
//! to one canonical keyword before parsing, so the later stages only ever see
//! canonical forms.
//!
//! # Architecture
//!
//! ```text
//! source ─> synonyms ─> lexer ─> input ─> Program ─> resolve ─> output ─> .java units
//!           (normalize)  (blocks)  (parse)   (ir.rs)   (in place)  (JavaWriter)
//! ```
//!
//! # Example
//!
//! ```
//! use pseudojava_compiler::{CompileOptions, compile};
//!
//! let units = compile("main:\n    print \"hello\"\n", &CompileOptions::default()).unwrap();
//! assert_eq!(units[0].file_name, "MainProgram.java");
//! assert!(units[0].source.contains("System.out.println(\"hello\");"));
//! ```
//!
//! Each call owns its model; nothing is shared between compilations, so
//! independent inputs can be compiled in parallel.

pub mod error;
pub mod input;
pub mod ir;
pub mod lexer;
pub mod options;
pub mod output;
pub mod resolve;
pub mod synonyms;
pub mod traits;

// Re-exports: model and errors
pub use error::{CompileError, Stage};
pub use ir::Program;
pub use options::{CompileOptions, Layout, SynonymOverrides};

// Re-exports: traits
pub use traits::{Reader, Writer};

// Re-exports: built-in reader and writer
pub use input::{PSEUDOJAVA_READER, PseudoJavaReader, read_pseudojava};
pub use output::{CompilationUnit, JAVA_WRITER, JavaWriter, JavaWriterImpl};

/// Parse and resolve `source` without generating code.
pub fn analyze(source: &str, options: &CompileOptions) -> Result<Program, CompileError> {
    let mut program = PSEUDOJAVA_READER.read(source, options)?;
    tracing::debug!(
        templates = program.templates.len(),
        has_main = program.entry.is_some(),
        "parsed"
    );
    resolve::resolve(&mut program, options)?;
    Ok(program)
}

/// Compile pseudo-Java `source` into Java compilation units.
///
/// Either every unit is produced or an error is returned; there is no
/// partial output.
#[tracing::instrument(skip_all, fields(bytes = source.len(), layout = ?options.layout))]
pub fn compile(
    source: &str,
    options: &CompileOptions,
) -> Result<Vec<CompilationUnit>, CompileError> {
    let program = analyze(source, options)?;
    JAVA_WRITER.write(&program, options)
}
