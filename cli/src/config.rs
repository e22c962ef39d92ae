#![deny(missing_docs)]

//! # Configuration
//!
//! The list of declarations to deprecate, read from YAML (or JSON when the file
//! ends in `.json`):
//!
//! ```yaml
//! root: ../DnsBlocker/src/NextDnsBetBlocker.Core
//! targets:
//!   - file: Interfaces/Interfaces.cs
//!     kind: interface
//!     name: INextDnsClient
//!     message: This interface is not used in the current implementation.
//!     error: false
//! ```

use crate::error::CliResult;
use deprecator_core::{AppResult, DeclarationKind, DeclarationTarget, Marker, DEFAULT_ATTRIBUTE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Whole configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecationConfig {
    /// Directory that relative target paths (and discovery) start from.
    /// Relative to the configuration file; defaults to its directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// File extensions searched when a target has no `file`.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Overrides the lookback window of the already-marked check.
    #[serde(default)]
    pub lookback: Option<usize>,

    /// Declarations to mark, in order.
    pub targets: Vec<TargetEntry>,
}

/// One declaration to mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    /// File holding the declaration; discovered under `root` when absent.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// `interface` or `class`. Parsed per target so one typo fails one target.
    pub kind: String,

    /// Declaration name.
    pub name: String,

    /// Deprecation message.
    #[serde(default)]
    pub message: Option<String>,

    /// Whether usages should become compile errors.
    #[serde(default)]
    pub error: Option<bool>,

    /// Attribute to insert.
    #[serde(default = "default_attribute")]
    pub attribute: String,
}

fn default_extensions() -> Vec<String> {
    vec!["cs".to_string()]
}

fn default_attribute() -> String {
    DEFAULT_ATTRIBUTE.to_string()
}

impl TargetEntry {
    /// Builds the marker this entry asks for.
    pub fn marker(&self) -> Marker {
        let mut marker = Marker::new(self.attribute.clone());
        if let Some(message) = &self.message {
            marker = marker.with_message(message.clone());
        }
        if let Some(is_error) = self.error {
            marker = marker.with_error_flag(is_error);
        }
        marker
    }

    /// Converts the entry into a patcher target.
    pub fn to_target(&self) -> AppResult<DeclarationTarget> {
        let kind: DeclarationKind = self.kind.parse()?;
        DeclarationTarget::new(kind, self.name.clone(), self.marker())
    }
}

impl DeprecationConfig {
    /// Parses configuration text; `json` selects the JSON reader.
    pub fn parse(text: &str, json: bool) -> CliResult<Self> {
        if json {
            Ok(serde_json::from_str(text)?)
        } else {
            Ok(serde_yaml::from_str(text)?)
        }
    }

    /// Loads a configuration file and makes `root` absolute against its directory.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)?;
        let json = path.extension().is_some_and(|ext| ext == "json");
        let mut config = Self::parse(&text, json)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.root = Some(match config.root.take() {
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        });

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecator_core::AppError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const YAML: &str = r#"
root: src
targets:
  - file: Interfaces/Interfaces.cs
    kind: interface
    name: INextDnsClient
    message: Use ILogsProducer instead.
    error: false
  - kind: class
    name: CheckpointStore
"#;

    #[test]
    fn test_parse_yaml_defaults() {
        let config = DeprecationConfig::parse(YAML, false).unwrap();
        assert_eq!(config.extensions, vec!["cs"]);
        assert_eq!(config.lookback, None);
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[1].file, None);
        assert_eq!(config.targets[1].attribute, "Obsolete");
    }

    #[test]
    fn test_marker_rendering_from_entry() {
        let config = DeprecationConfig::parse(YAML, false).unwrap();
        assert_eq!(
            config.targets[0].marker().render(),
            r#"[Obsolete("Use ILogsProducer instead.", false)]"#
        );
        assert_eq!(config.targets[1].marker().render(), "[Obsolete]");
    }

    #[test]
    fn test_demo_list_is_valid() {
        let text = include_str!("../../demos/deprecations.yaml");
        let config = DeprecationConfig::parse(text, false).unwrap();
        assert_eq!(config.targets.len(), 8);
        assert!(config.targets.iter().all(|t| t.to_target().is_ok()));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"targets":[{"kind":"class","name":"A","attribute":"Deprecated"}]}"#;
        let config = DeprecationConfig::parse(json, true).unwrap();
        assert_eq!(config.targets[0].marker().render(), "[Deprecated]");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let res = DeprecationConfig::parse("targets: []\nbogus: 1\n", false);
        assert!(res.is_err());
    }

    #[test]
    fn test_bad_kind_fails_only_that_target() {
        let yaml = "targets:\n  - kind: struct\n    name: A\n  - kind: class\n    name: B\n";
        let config = DeprecationConfig::parse(yaml, false).unwrap();
        assert!(matches!(
            config.targets[0].to_target(),
            Err(AppError::UnsupportedKind(_))
        ));
        assert!(config.targets[1].to_target().is_ok());
    }

    #[test]
    fn test_load_resolves_root_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deprecations.yaml");
        File::create(&path)
            .unwrap()
            .write_all(YAML.as_bytes())
            .unwrap();

        let config = DeprecationConfig::load(&path).unwrap();
        assert_eq!(config.root, Some(dir.path().join("src")));
    }
}
