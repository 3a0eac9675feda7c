//! Compile a pseudo-Java file to Java sources or a JSON model dump.

use anyhow::Context;
use clap::ValueEnum;
use pseudojava_compiler::{CompileOptions, analyze, compile};
use std::path::{Path, PathBuf};

/// What the compile command writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Emit {
    /// Generated Java compilation units.
    #[default]
    Java,
    /// The resolved model as JSON.
    Ast,
}

/// Compile `input` and write the results into `output_dir`, returning the
/// paths written. Nothing is written when compilation fails.
pub fn cmd_compile(
    input: &Path,
    output_dir: &Path,
    emit: Emit,
    options: &CompileOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let files: Vec<(String, String)> = match emit {
        Emit::Java => compile(&source, options)
            .with_context(|| format!("failed to compile {}", input.display()))?
            .into_iter()
            .map(|unit| (unit.file_name, unit.source))
            .collect(),
        Emit::Ast => {
            let program = analyze(&source, options)
                .with_context(|| format!("failed to compile {}", input.display()))?;
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "program".to_string());
            let json = serde_json::to_string_pretty(&program)?;
            vec![(format!("{}.json", stem), json + "\n")]
        }
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = output_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote");
        written.push(path);
    }
    Ok(written)
}
