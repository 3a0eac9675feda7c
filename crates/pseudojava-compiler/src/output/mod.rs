//! Output writers - emit the resolved model as Java source.

pub mod java;

pub use java::{JAVA_WRITER, JavaWriter, JavaWriterImpl};

use serde::Serialize;

/// One generated Java source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    /// `<Type>.java`
    pub file_name: String,
    /// The file's public type.
    pub type_name: String,
    pub source: String,
}
