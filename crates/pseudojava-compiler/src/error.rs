//! Errors raised by the compilation pipeline.
//!
//! Every stage fails fast with a single [`CompileError`]. Each variant carries
//! the 1-based source line it concerns (0 when no line applies) and a
//! human-readable message.

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Resolver,
    Generator,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Lexer => "lexer",
            Stage::Parser => "parser",
            Stage::Resolver => "resolver",
            Stage::Generator => "generator",
        })
    }
}

/// A terminal compilation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("line {line}: structure error: {message}")]
    Structure { line: usize, message: String },

    #[error("line {line}: syntax error: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: declaration error: {message}")]
    Declaration { line: usize, message: String },

    #[error("line {line}: resolution error: {message}")]
    Resolution { line: usize, message: String },

    #[error("line {line}: incomplete implementation: {message}")]
    IncompleteImplementation { line: usize, message: String },

    #[error("line {line}: semantic error: {message}")]
    Semantic { line: usize, message: String },

    #[error("line {line}: generation error: {message}")]
    Generation { line: usize, message: String },
}

impl CompileError {
    pub fn structure(line: usize, message: impl Into<String>) -> Self {
        Self::Structure {
            line,
            message: message.into(),
        }
    }

    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn declaration(line: usize, message: impl Into<String>) -> Self {
        Self::Declaration {
            line,
            message: message.into(),
        }
    }

    pub fn resolution(line: usize, message: impl Into<String>) -> Self {
        Self::Resolution {
            line,
            message: message.into(),
        }
    }

    pub fn incomplete(line: usize, message: impl Into<String>) -> Self {
        Self::IncompleteImplementation {
            line,
            message: message.into(),
        }
    }

    pub fn semantic(line: usize, message: impl Into<String>) -> Self {
        Self::Semantic {
            line,
            message: message.into(),
        }
    }

    pub fn generation(line: usize, message: impl Into<String>) -> Self {
        Self::Generation {
            line,
            message: message.into(),
        }
    }

    /// Source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            CompileError::Structure { line, .. }
            | CompileError::Syntax { line, .. }
            | CompileError::Declaration { line, .. }
            | CompileError::Resolution { line, .. }
            | CompileError::IncompleteImplementation { line, .. }
            | CompileError::Semantic { line, .. }
            | CompileError::Generation { line, .. } => *line,
        }
    }

    /// Human-readable message without the line prefix.
    pub fn message(&self) -> &str {
        match self {
            CompileError::Structure { message, .. }
            | CompileError::Syntax { message, .. }
            | CompileError::Declaration { message, .. }
            | CompileError::Resolution { message, .. }
            | CompileError::IncompleteImplementation { message, .. }
            | CompileError::Semantic { message, .. }
            | CompileError::Generation { message, .. } => message,
        }
    }

    /// Pipeline stage that raised the error.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Structure { .. } => Stage::Lexer,
            CompileError::Syntax { .. } | CompileError::Declaration { .. } => Stage::Parser,
            CompileError::Resolution { .. }
            | CompileError::IncompleteImplementation { .. }
            | CompileError::Semantic { .. } => Stage::Resolver,
            CompileError::Generation { .. } => Stage::Generator,
        }
    }
}
