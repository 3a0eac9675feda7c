//! Check a pseudo-Java file without writing any output.

use anyhow::Context;
use pseudojava_compiler::{CompileOptions, JAVA_WRITER, Writer, analyze};
use std::path::Path;

/// Parse, resolve and generate in memory; report a one-line summary.
pub fn cmd_check(input: &Path, options: &CompileOptions) -> anyhow::Result<String> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let program = analyze(&source, options)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    let units = JAVA_WRITER
        .write(&program, options)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    Ok(format!(
        "{}: ok ({} templates, {} units)",
        input.display(),
        program.templates.len(),
        units.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_reports_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.pj");
        std::fs::write(&path, "main:\n    print \"hi\"\n").unwrap();
        let summary = cmd_check(&path, &CompileOptions::default()).unwrap();
        assert!(summary.ends_with("ok (1 templates, 1 units)"), "{}", summary);
    }

    #[test]
    fn test_check_surfaces_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.pj");
        std::fs::write(&path, "main:\n    print f\"total {x\"\n").unwrap();
        let err = cmd_check(&path, &CompileOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2: syntax error"), "{:#}", err);
    }
}
