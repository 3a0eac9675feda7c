//! Configuration for the pseudojava CLI.
//!
//! Loads config from:
//! 1. Global: ~/.config/pseudojava/config.toml
//! 2. Per-project: .pseudojava/config.toml (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [compile]
//! layout = "per-template"
//! indent = 2
//! imports = ["java.util.*", "java.io.*"]
//!
//! [synonyms]
//! template = ["kind"]
//!
//! [output]
//! dir = "generated"
//! ```

use pseudojava_compiler::{CompileOptions, Layout, SynonymOverrides};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Code generation settings. Unset keys fall through to the next layer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CompileConfig {
    pub layout: Option<Layout>,
    /// Spaces per indentation level in generated Java.
    pub indent: Option<usize>,
    pub imports: Option<Vec<String>>,
    /// Driver class name when the source has no `program` line.
    pub program_name: Option<String>,
}

/// Where generated files go.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PseudoJavaConfig {
    pub compile: CompileConfig,
    /// Extra surface keywords; layers add to each other.
    pub synonyms: SynonymOverrides,
    pub output: OutputConfig,
}

impl PseudoJavaConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/pseudojava/config.toml,
    /// then merges with per-project config from .pseudojava/config.toml.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path()
            && let Some(global) = Self::load_file(&global_path)?
        {
            config = config.merge(global);
        }

        let project_path = root.join(".pseudojava").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }

        tracing::debug!(?config, "loaded config");
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("pseudojava").join("config.toml"))
    }

    /// A missing file is not an error; a malformed one is.
    fn load_file(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read {}", path.display())));
            }
        };
        let config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(Some(config))
    }

    /// Merge another config into this one. Keys set in `other` win; synonym
    /// lists accumulate.
    fn merge(self, other: Self) -> Self {
        let mut synonyms = self.synonyms;
        if !other.synonyms.is_empty() {
            synonyms.template.extend(other.synonyms.template);
            synonyms.abstract_.extend(other.synonyms.abstract_);
            synonyms.extends.extend(other.synonyms.extends);
            synonyms.implements.extend(other.synonyms.implements);
            synonyms.create.extend(other.synonyms.create);
        }
        Self {
            compile: CompileConfig {
                layout: other.compile.layout.or(self.compile.layout),
                indent: other.compile.indent.or(self.compile.indent),
                imports: other.compile.imports.or(self.compile.imports),
                program_name: other.compile.program_name.or(self.compile.program_name),
            },
            synonyms,
            output: OutputConfig {
                dir: other.output.dir.or(self.output.dir),
            },
        }
    }

    /// Library options with unset keys at their defaults.
    pub fn compile_options(&self) -> CompileOptions {
        let defaults = CompileOptions::default();
        CompileOptions {
            layout: self.compile.layout.unwrap_or(defaults.layout),
            indent: self.compile.indent.unwrap_or(defaults.indent),
            imports: self.compile.imports.clone().unwrap_or(defaults.imports),
            program_name: self.compile.program_name.clone(),
            synonyms: self.synonyms.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_project_config(dir: &TempDir, body: &str) {
        let config_dir = dir.path().join(".pseudojava");
        std::fs::create_dir_all(&config_dir).unwrap();
        let mut file = std::fs::File::create(config_dir.join("config.toml")).unwrap();
        writeln!(file, "{}", body).unwrap();
    }

    #[test]
    fn test_default_config() {
        let options = PseudoJavaConfig::default().compile_options();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_project_config(
            &dir,
            r#"
[compile]
layout = "per-template"
indent = 2

[synonyms]
template = ["kind"]

[output]
dir = "generated"
"#,
        );

        let config = PseudoJavaConfig::load(dir.path()).unwrap();
        let options = config.compile_options();
        assert_eq!(options.layout, Layout::PerTemplate);
        assert_eq!(options.indent, 2);
        assert_eq!(options.imports, vec!["java.util.*"]); // default
        assert!(options.synonyms.template.contains(&"kind".to_string()));
        assert_eq!(config.output.dir, Some(PathBuf::from("generated")));
    }

    #[test]
    fn test_project_overrides_only_what_it_sets() {
        let global: PseudoJavaConfig = toml::from_str(
            r#"
[compile]
indent = 8
program_name = "App"

[synonyms]
create = ["forge"]
"#,
        )
        .unwrap();
        let project: PseudoJavaConfig = toml::from_str(
            r#"
[compile]
indent = 2

[synonyms]
create = ["mint"]
"#,
        )
        .unwrap();

        let merged = PseudoJavaConfig::default().merge(global).merge(project);
        assert_eq!(merged.compile.indent, Some(2));
        assert_eq!(merged.compile.program_name.as_deref(), Some("App"));
        assert_eq!(merged.synonyms.create, vec!["forge", "mint"]);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_project_config(&dir, "[compile]\nlayout = \"sideways\"\n");
        let err = PseudoJavaConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config"), "{}", err);
    }
}
