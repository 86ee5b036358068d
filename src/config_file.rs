//! YAML configuration files.
//!
//! Searched in the working directory as `.docauto.yml`, `.docauto.yaml`,
//! `docauto.yml`, `docauto.yaml`, then in the user config directory. All keys
//! are optional; the file is just one layer of the merge in `config`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// File names probed in the working directory, in order
pub const DEFAULT_FILES: [&str; 4] = [
    ".docauto.yml",
    ".docauto.yaml",
    "docauto.yml",
    "docauto.yaml",
];

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: FileApi,
    #[serde(default)]
    pub generation: FileGeneration,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileApi {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileGeneration {
    pub model: Option<String>,
    pub max_context: Option<usize>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub prompt_budget: Option<usize>,
}

/// Load the config file layer, if one exists
///
/// An explicit path that doesn't exist is an error; finding nothing during
/// the default search is not (presets and flags may be enough).
pub fn load(explicit: Option<&str>) -> Result<Option<(PathBuf, FileConfig)>> {
    let Some(path) = find(explicit)? else {
        return Ok(None);
    };
    let config = parse(&path)?;
    Ok(Some((path, config)))
}

fn find(explicit: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(raw) = explicit {
        let expanded = shellexpand::tilde(raw);
        let path = PathBuf::from(expanded.as_ref());
        if !path.exists() {
            bail!("Configuration file not found: {}", path.display());
        }
        return Ok(Some(path));
    }

    for name in DEFAULT_FILES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // User-level fallback, e.g. ~/.config/docauto/docauto.yaml
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("docauto").join("docauto.yaml");
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

fn parse(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid YAML configuration: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "api:\n  base_url: http://localhost:11434/v1\n  api_key: ollama\n\
             generation:\n  model: phi4\n  max_context: 8192\n  ignore:\n    - main\n  exclude:\n    - \"tests/**\"\n"
        )
        .unwrap();

        let config = parse(file.path()).unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert_eq!(config.generation.model.as_deref(), Some("phi4"));
        assert_eq!(config.generation.max_context, Some(8192));
        assert_eq!(config.generation.ignore, vec!["main"]);
        assert_eq!(config.generation.exclude, vec!["tests/**"]);
    }

    #[test]
    fn test_parse_empty_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "api:\n  api_key: abc\n").unwrap();

        let config = parse(file.path()).unwrap();
        assert_eq!(config.api.api_key.as_deref(), Some("abc"));
        assert!(config.generation.model.is_none());
        assert!(config.generation.constraints.is_empty());
    }

    #[test]
    fn test_malformed_yaml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "api: [unclosed\n").unwrap();

        let err = parse(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid YAML configuration"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let err = load(Some("/nonexistent/docauto.yaml")).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }
}
