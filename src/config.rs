//! Layered run configuration.
//!
//! Precedence, lowest to highest: vendor preset, config file, CLI flags.
//! Validation happens once, after merging, so every layer is checked by the
//! same rules.

use anyhow::{bail, Context, Result};

use crate::config_file::FileConfig;
use crate::presets::Preset;

pub const DEFAULT_MAX_CONTEXT: usize = 16_384;

/// Prompts longer than this many characters are trimmed before sending
pub const DEFAULT_PROMPT_BUDGET: usize = 10_000;

/// Built-in generation constraints, appended to the system prompt
pub fn default_constraints() -> Vec<String> {
    vec![
        "Don't respond with anything other than valid code".to_string(),
        "Strictly respond in Sphinx documentation format: a summary line, then \
         a pair of :param:/:type: directives per parameter, :raises: for each \
         raised error, and :return:/:rtype: when a value is returned. Omit the \
         params section when there are none and :return: when nothing is \
         returned."
            .to_string(),
        "Single line docstrings should not end with any spacing".to_string(),
    ]
}

/// Unit names skipped by default: the Python dunder protocol surface
pub fn default_ignore() -> Vec<String> {
    [
        "__init__",
        "__new__",
        "__del__",
        "__repr__",
        "__str__",
        "__format__",
        "__bytes__",
        "__hash__",
        "__bool__",
        "__eq__",
        "__ne__",
        "__lt__",
        "__le__",
        "__gt__",
        "__ge__",
        "__getattr__",
        "__getattribute__",
        "__setattr__",
        "__delattr__",
        "__dir__",
        "__sizeof__",
        "__reduce__",
        "__reduce_ex__",
        "__init_subclass__",
        "__subclasshook__",
        "__class_getitem__",
        "__enter__",
        "__exit__",
        "__iter__",
        "__next__",
        "__len__",
        "__getitem__",
        "__setitem__",
        "__delitem__",
        "__contains__",
        "__call__",
        "__copy__",
        "__deepcopy__",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// API endpoint settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            bail!("Base URL is required");
        }

        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL format: {}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Invalid base URL format: {} (expected http or https)",
                self.base_url
            );
        }
        if url.host_str().is_none() {
            bail!("Invalid base URL format: {} (missing host)", self.base_url);
        }

        Ok(())
    }

    /// Loopback endpoints (the Ollama case) don't check credentials
    pub fn is_local(&self) -> bool {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| {
                url.host_str()
                    .map(|host| matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]"))
            })
            .unwrap_or(false)
    }
}

/// Documentation generation settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub max_context: usize,
    pub constraints: Vec<String>,
    /// Unit names to skip
    pub ignore: Vec<String>,
    /// File glob patterns to skip during discovery
    pub exclude: Vec<String>,
    pub prompt_budget: usize,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            bail!("AI model is required");
        }
        if self.constraints.is_empty() {
            bail!("At least one constraint is required");
        }
        if self.max_context == 0 {
            bail!("max_context must be positive");
        }
        Ok(())
    }
}

/// Complete run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub overwrite: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Config {
    /// True when the endpoint needs a key and none was supplied by any layer
    pub fn missing_api_key(&self) -> bool {
        self.api.api_key.is_none() && !self.api.is_local()
    }
}

/// CLI-level overrides, the highest-precedence layer
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_context: Option<usize>,
    pub constraints: Vec<String>,
}

/// Run flags carried alongside the merged configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct RunFlags {
    pub overwrite: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Merge preset, config file and CLI overrides into a validated configuration
pub fn resolve(
    preset: Option<Preset>,
    file: Option<&FileConfig>,
    cli: &Overrides,
    flags: RunFlags,
) -> Result<Config> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| file.and_then(|f| f.api.base_url.clone()))
        .or_else(|| preset.map(|p| p.base_url().to_string()))
        .context("No API base URL configured (pick a preset, set one in the config file, or pass --base-url)")?;

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| file.and_then(|f| f.api.api_key.clone()))
        .or_else(|| preset.and_then(|p| p.api_key().map(String::from)));

    let model = cli
        .model
        .clone()
        .or_else(|| file.and_then(|f| f.generation.model.clone()))
        .or_else(|| preset.map(|p| p.model().to_string()))
        .context("No model configured (pick a preset, set one in the config file, or pass --model)")?;

    let max_context = cli
        .max_context
        .or_else(|| file.and_then(|f| f.generation.max_context))
        .or_else(|| preset.map(|p| p.max_context()))
        .unwrap_or(DEFAULT_MAX_CONTEXT);

    let constraints = if !cli.constraints.is_empty() {
        cli.constraints.clone()
    } else {
        match file {
            Some(f) if !f.generation.constraints.is_empty() => f.generation.constraints.clone(),
            _ => default_constraints(),
        }
    };

    // Ignore names merge additively: the dunder defaults always apply
    let mut ignore = default_ignore();
    if let Some(f) = file {
        for name in &f.generation.ignore {
            if !ignore.contains(name) {
                ignore.push(name.clone());
            }
        }
    }

    let exclude = file
        .map(|f| f.generation.exclude.clone())
        .unwrap_or_default();

    let prompt_budget = file
        .and_then(|f| f.generation.prompt_budget)
        .unwrap_or(DEFAULT_PROMPT_BUDGET);

    let config = Config {
        api: ApiConfig { base_url, api_key },
        generation: GenerationConfig {
            model,
            max_context,
            constraints,
            ignore,
            exclude,
            prompt_budget,
        },
        overwrite: flags.overwrite,
        dry_run: flags.dry_run,
        verbose: flags.verbose,
    };

    config.api.validate()?;
    config.generation.validate()?;

    Ok(config)
}
