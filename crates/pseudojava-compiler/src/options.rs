//! Compilation options.
//!
//! Options are plain data so hosts can load them from TOML; every field has a
//! default and missing keys fall back to it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How generated types are grouped into Java files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One file holding every type; the driver is the public one.
    #[default]
    SingleFile,
    /// One public type per file.
    PerTemplate,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-file" | "single" => Ok(Layout::SingleFile),
            "per-template" | "split" => Ok(Layout::PerTemplate),
            other => Err(format!(
                "unknown layout '{}' (expected single-file or per-template)",
                other
            )),
        }
    }
}

/// Extra surface keywords, merged into the built-in synonym families.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymOverrides {
    pub template: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Vec<String>,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub create: Vec<String>,
}

impl SynonymOverrides {
    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
            && self.abstract_.is_empty()
            && self.extends.is_empty()
            && self.implements.is_empty()
            && self.create.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub layout: Layout,
    /// Spaces per indentation level in generated code.
    pub indent: usize,
    /// Import lines emitted at the top of every file, without `import`/`;`.
    pub imports: Vec<String>,
    /// Overrides the `program <Name>` line as driver class name.
    pub program_name: Option<String>,
    pub synonyms: SynonymOverrides,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            layout: Layout::SingleFile,
            indent: 4,
            imports: vec!["java.util.*".to_string()],
            program_name: None,
            synonyms: SynonymOverrides::default(),
        }
    }
}
