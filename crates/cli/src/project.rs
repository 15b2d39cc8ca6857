//! Project files: `typegap.toml`, the API description and the generated
//! outputs on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use similar::{ChangeTag, TextDiff};
use tracing::debug;
use typegap_core::{ApiDescription, GeneratedOutput, GeneratorConfig};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "typegap.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    #[serde(flatten)]
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub definitions: String,
    pub enums: String,
    pub services: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            definitions: "definitions.d.ts".to_string(),
            enums: "enums.ts".to_string(),
            services: "services.ts".to_string(),
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, String> {
        toml::from_str(source).map_err(|err| format!("Failed to parse configuration: {err}"))
    }

    /// Read `path`, or `typegap.toml` if present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("No configuration file, using defaults.");
                    return Ok(Self::default());
                }
                default
            }
        };
        let source = fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        debug!(path = %path.display(), "Loaded configuration.");
        Self::from_toml_str(&source)
    }
}

/// Parse a description document; `.toml` files are TOML, anything else JSON.
pub fn load_description(path: &Path) -> Result<ApiDescription, String> {
    let source =
        fs::read_to_string(path).map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&source).map_err(|err| format!("Invalid description {}: {err}", path.display()))
    } else {
        serde_json::from_str(&source).map_err(|err| format!("Invalid description {}: {err}", path.display()))
    }
}

/// One generated file and where it belongs.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    /// Current contents on disk, if the file exists.
    pub fn existing(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|err| format!("Failed to read {}: {err}", self.path.display()))
    }

    pub fn is_current(&self) -> Result<bool, String> {
        Ok(self.existing()?.as_deref() == Some(self.contents.as_str()))
    }

    /// Write the contents to a temporary sibling of the target.
    fn stage(&self) -> Result<tempfile::NamedTempFile, String> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|err| format!("Failed to create temporary file in {}: {err}", parent.display()))?;
        temp.write_all(self.contents.as_bytes())
            .map_err(|err| format!("Failed to write {}: {err}", self.path.display()))?;
        Ok(temp)
    }

    /// Unified diff from the file on disk to the generated contents.
    pub fn diff(&self) -> Result<String, String> {
        let existing = self.existing()?.unwrap_or_default();
        Ok(unified_diff(&self.path.display().to_string(), &existing, &self.contents))
    }
}

/// Replace `files` on disk. Every file is staged before any target is
/// touched, so a failure while writing leaves all existing outputs as they
/// were.
pub fn write_files(files: &[&OutputFile]) -> Result<(), String> {
    let staged = files
        .iter()
        .map(|file| file.stage().map(|temp| (temp, *file)))
        .collect::<Result<Vec<_>, String>>()?;
    for (temp, file) in staged {
        temp.persist(&file.path)
            .map_err(|err| format!("Failed to write {}: {err}", file.path.display()))?;
        debug!(path = %file.path.display(), bytes = file.contents.len(), "Wrote output file.");
    }
    Ok(())
}

pub fn output_files(output: &GeneratedOutput, config: &OutputConfig, dir: &Path) -> Vec<OutputFile> {
    [
        (&config.definitions, &output.definitions),
        (&config.enums, &output.enums),
        (&config.services, &output.services),
    ]
    .into_iter()
    .map(|(name, contents)| OutputFile {
        path: dir.join(name),
        contents: contents.clone(),
    })
    .collect()
}

fn unified_diff(name: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut output = format!("--- {name} (on disk)\n+++ {name} (generated)\n");

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }
    output
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use typegap_core::EnumOutput;

    #[test]
    fn test_project_config_sections() {
        let source = r#"
transforms = ["moment-datetime"]

[render]
indent = "  "

[enums]
output = "type"

[output]
dir = "client/src/api"
services = "proxies.ts"
"#;
        let config = ProjectConfig::from_toml_str(source).unwrap();
        assert_eq!(config.generator.transforms, vec!["moment-datetime"]);
        assert_eq!(config.generator.render.indent, "  ");
        assert_eq!(config.generator.enums.output, EnumOutput::Type);
        assert_eq!(config.output.dir, PathBuf::from("client/src/api"));
        assert_eq!(config.output.services, "proxies.ts");
        assert_eq!(config.output.enums, "enums.ts");
    }

    #[test]
    fn test_empty_project_config() {
        let config = ProjectConfig::from_toml_str("").unwrap();
        assert_eq!(config.output.definitions, "definitions.d.ts");
        assert!(config.generator.render.banner);
    }

    #[test]
    fn test_invalid_project_config() {
        let err = ProjectConfig::from_toml_str("[output]\ndir = 3").unwrap_err();
        assert!(err.starts_with("Failed to parse configuration"));
    }

    #[test]
    fn test_description_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("api.json");
        fs::write(&json, r#"{ "roots": ["Shop.Order"] }"#).unwrap();
        assert_eq!(load_description(&json).unwrap().roots, vec!["Shop.Order"]);

        let toml = dir.path().join("api.toml");
        fs::write(&toml, "roots = [\"Shop.Order\"]\n\n[[controllers]]\nname = \"OrdersController\"\n").unwrap();
        let description = load_description(&toml).unwrap();
        assert_eq!(description.controllers[0].name, "OrdersController");

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(load_description(&broken).unwrap_err().starts_with("Invalid description"));
    }

    #[test]
    fn test_write_and_compare() {
        let dir = tempfile::tempdir().unwrap();
        let file = OutputFile {
            path: dir.path().join("nested").join("enums.ts"),
            contents: "enum A {\n}\n".to_string(),
        };
        assert!(!file.is_current().unwrap());
        write_files(&[&file]).unwrap();
        assert!(file.is_current().unwrap());
        assert_eq!(fs::read_to_string(&file.path).unwrap(), "enum A {\n}\n");
    }

    #[test]
    fn test_failed_write_leaves_outputs_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let enums = dir.path().join("enums.ts");
        fs::write(&enums, "// old\n").unwrap();
        // a regular file where the services directory should be
        let blocker = dir.path().join("api");
        fs::write(&blocker, "").unwrap();

        let files = [
            OutputFile {
                path: enums.clone(),
                contents: "// new\n".to_string(),
            },
            OutputFile {
                path: blocker.join("services.ts"),
                contents: "// new\n".to_string(),
            },
        ];
        let err = write_files(&files.iter().collect::<Vec<_>>()).unwrap_err();
        assert!(err.starts_with("Failed to create"));
        assert_eq!(fs::read_to_string(&enums).unwrap(), "// old\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff("services.ts", "a\nb\nc\n", "a\nB\nc\n");
        assert!(diff.starts_with("--- services.ts (on disk)\n+++ services.ts (generated)\n"));
        assert!(diff.contains("-b\n+B\n"));
        assert!(diff.contains(" a\n"));
    }
}
