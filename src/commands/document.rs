//! The `docauto` run: resolve configuration, discover files, document them.

use anyhow::{bail, Context, Result};
use clap::Args;
use zeroize::Zeroizing;

use docauto::config::{self, Overrides, RunFlags};
use docauto::config_file;
use docauto::discovery;
use docauto::generator::ChatGenerator;
use docauto::presets::Preset;
use docauto::service::DocumentationService;
use docauto::shutdown;

/// Arguments for a documentation run
#[derive(Args)]
#[command(group(clap::ArgGroup::new("preset").multiple(false)))]
pub struct DocumentArgs {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Use the Ollama preset (local, no API key)
    #[arg(long, group = "preset")]
    pub ollama: bool,

    /// Use the OpenAI preset
    #[arg(long, group = "preset")]
    pub openai: bool,

    /// Use the Gemini preset
    #[arg(long, group = "preset")]
    pub gemini: bool,

    /// Use the DeepSeek preset
    #[arg(long, group = "preset")]
    pub deepseek: bool,

    /// Custom API base URL
    #[arg(short = 'b', long)]
    pub base_url: Option<String>,

    /// API authentication key
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Model to use for generation
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Max context window size in tokens
    #[arg(short = 'M', long)]
    pub max_context: Option<usize>,

    /// Documentation constraints (repeatable)
    #[arg(short = 'c', long = "constraint")]
    pub constraints: Vec<String>,

    /// Configuration file path (default: search for .docauto.yaml)
    #[arg(long)]
    pub config: Option<String>,

    /// Simulate changes without writing
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Regenerate docstrings that already exist
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl DocumentArgs {
    fn preset(&self) -> Option<Preset> {
        if self.ollama {
            Some(Preset::Ollama)
        } else if self.openai {
            Some(Preset::OpenAi)
        } else if self.gemini {
            Some(Preset::Gemini)
        } else if self.deepseek {
            Some(Preset::DeepSeek)
        } else {
            None
        }
    }
}

pub fn execute(args: DocumentArgs) -> Result<()> {
    // Fail on bad paths before any configuration or network work
    discovery::validate_paths(&args.paths)?;

    let file = config_file::load(args.config.as_deref())?;
    if let Some((path, _)) = &file {
        if args.verbose {
            println!("🔧 Using config file: {}", path.display());
        }
    }

    let overrides = Overrides {
        base_url: args.base_url.clone(),
        api_key: args.api_key.clone(),
        model: args.model.clone(),
        max_context: args.max_context,
        constraints: args.constraints.clone(),
    };
    let flags = RunFlags {
        overwrite: args.overwrite,
        dry_run: args.dry_run,
        verbose: args.verbose,
    };

    let mut config = config::resolve(
        args.preset(),
        file.as_ref().map(|(_, f)| f),
        &overrides,
        flags,
    )?;

    if config.missing_api_key() {
        config.api.api_key = Some(prompt_api_key(&config.api.base_url)?);
    }

    let excludes = discovery::compile_excludes(&config.generation.exclude)?;
    let files = discovery::resolve_paths(&args.paths, &excludes)?;

    if files.is_empty() {
        println!("No Python files found under the given paths");
        return Ok(());
    }

    shutdown::install();

    println!(
        "📝 Documenting {} file{} with {} via {}{}\n",
        files.len(),
        if files.len() == 1 { "" } else { "s" },
        config.generation.model,
        config.api.base_url,
        if config.dry_run { " [dry-run]" } else { "" }
    );

    let generator = ChatGenerator::new(&config)?;
    let mut service = DocumentationService::new(generator, &config)?;

    for path in &files {
        if shutdown::requested() {
            break;
        }
        service.process_file(path, config.dry_run)?;
    }

    println!(
        "{}",
        service
            .tracker()
            .summary(shutdown::requested(), config.dry_run)
    );

    Ok(())
}

/// Ask for the API key interactively; masked, never echoed
fn prompt_api_key(base_url: &str) -> Result<String> {
    if !atty::is(atty::Stream::Stdin) || !atty::is(atty::Stream::Stderr) {
        bail!(
            "API key required for {} (pass --api-key or set api.api_key in the config file)",
            base_url
        );
    }

    let term = console::Term::stderr();
    term.write_str(&format!("🔑 API key for {}: ", base_url))?;
    let key = Zeroizing::new(
        term.read_secure_line()
            .context("Failed to read API key")?,
    );

    if key.trim().is_empty() {
        bail!("API key required for {}", base_url);
    }

    Ok(key.trim().to_string())
}
