use anyhow::{bail, Result};

/// Named vendor presets bundling an endpoint, default model and context size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Ollama,
    OpenAi,
    Gemini,
    DeepSeek,
}

impl Preset {
    /// Get all known presets
    pub fn all() -> Vec<Preset> {
        vec![
            Preset::Ollama,
            Preset::OpenAi,
            Preset::Gemini,
            Preset::DeepSeek,
        ]
    }

    /// Look up a preset by its CLI name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "ollama" => Ok(Preset::Ollama),
            "openai" => Ok(Preset::OpenAi),
            "gemini" => Ok(Preset::Gemini),
            "deepseek" => Ok(Preset::DeepSeek),
            _ => {
                let known: Vec<&str> = Preset::all().iter().map(|p| p.name()).collect();
                bail!("Unknown preset: {} (known: {})", name, known.join(", "))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Ollama => "ollama",
            Preset::OpenAi => "openai",
            Preset::Gemini => "gemini",
            Preset::DeepSeek => "deepseek",
        }
    }

    /// OpenAI-compatible API endpoint for this vendor
    pub fn base_url(&self) -> &'static str {
        match self {
            Preset::Ollama => "http://localhost:11434/v1",
            Preset::OpenAi => "https://api.openai.com/v1",
            Preset::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/",
            Preset::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    /// Placeholder key for endpoints that don't check one
    pub fn api_key(&self) -> Option<&'static str> {
        match self {
            Preset::Ollama => Some("ollama"),
            _ => None,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Preset::Ollama => "phi4",
            Preset::OpenAi => "gpt-4o-mini",
            Preset::Gemini => "gemini-2.0-flash-exp",
            Preset::DeepSeek => "deepseek-chat",
        }
    }

    pub fn max_context(&self) -> usize {
        match self {
            Preset::Ollama => 16_384,
            Preset::OpenAi => 16_384,
            Preset::Gemini => 131_072,
            Preset::DeepSeek => 65_536,
        }
    }
}
