//! Traits for source readers and target writers.

use crate::error::CompileError;
use crate::ir::Program;
use crate::options::CompileOptions;
use crate::output::CompilationUnit;

/// A reader parses source text into the model.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "pseudojava").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["pj"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source text into an unresolved [`Program`].
    fn read(&self, source: &str, options: &CompileOptions) -> Result<Program, CompileError>;
}

/// A writer emits a resolved model as target source.
pub trait Writer: Send + Sync {
    /// Language identifier (e.g., "java").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "java").
    fn extension(&self) -> &'static str;

    /// Emit the model as one or more compilation units.
    fn write(
        &self,
        program: &Program,
        options: &CompileOptions,
    ) -> Result<Vec<CompilationUnit>, CompileError>;
}
