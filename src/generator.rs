//! Docstring generation against an OpenAI-compatible chat-completions API.
//!
//! All four presets (ollama, openai, gemini, deepseek) speak this dialect, so
//! one blocking client covers them. The `DocsGenerator` trait is the seam the
//! service is generic over; tests substitute a stub.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Tokens reserved for the model's reply inside the context window
pub const MIN_RESPONSE_TOKENS: usize = 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Anything that can turn unit source code into docstring text
pub trait DocsGenerator {
    /// Generate documentation for one unit; `context` carries the enclosing
    /// class name when there is one.
    fn generate(&self, source: &str, context: Option<&str>) -> Result<String>;
}

/// Chat-completions client for docstring generation
pub struct ChatGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_context: usize,
    constraints: Vec<String>,
    prompt_budget: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Error payload shape shared by the OpenAI-compatible vendors
#[derive(Debug, Deserialize)]
struct ApiError {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ChatGenerator {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            api_key: config.api.api_key.clone(),
            model: config.generation.model.clone(),
            max_context: config.generation.max_context,
            constraints: config.generation.constraints.clone(),
            prompt_budget: config.generation.prompt_budget,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Construct the user prompt: fenced source plus optional class context
    pub(crate) fn build_prompt(&self, source: &str, context: Option<&str>) -> String {
        let mut prompt = format!("```python\n{}\n```", source.trim());
        if let Some(ctx) = context {
            prompt.push_str("\nAdditional context: ");
            prompt.push_str(ctx);
        }

        let chars = prompt.chars().count();
        if chars > self.prompt_budget {
            let trimmed = truncate_chars(&prompt, self.prompt_budget);
            eprintln!(
                "   ⚠️  Prompt trimmed from {} to {} characters to fit the budget",
                chars, self.prompt_budget
            );
            return trimmed;
        }

        prompt
    }

    pub(crate) fn system_prompt(&self) -> String {
        let user_constraints = self.constraints.join("\n");

        format!(
            "You're a professional documentation writer.\n\n\
             You'll be provided with function or class source code to document.\n\
             If a format is requested, stick to it; otherwise respond in Sphinx\n\
             docstring format.\n\n\
             System constraints:\n\
             1. Keep it short, precise and accurate.\n\
             2. Don't ask questions.\n\
             3. Don't make assumptions; use only the facts you're given.\n\
             4. Don't respond with the docstring quotes.\n\n\
             User constraints:\n{}",
            user_constraints
        )
    }

    fn post_chat(&self, system: &str, user: &str, max_tokens: usize) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.3,
            max_tokens,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().context("LLM API request failed")?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(body);
            bail!("LLM API returned {}: {}", status, detail.trim());
        }

        let parsed: ChatResponse = response
            .json()
            .context("Failed to parse LLM API response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            bail!("LLM API returned an empty response");
        }

        Ok(content)
    }
}

impl DocsGenerator for ChatGenerator {
    fn generate(&self, source: &str, context: Option<&str>) -> Result<String> {
        if source.trim().is_empty() {
            bail!("Source to document cannot be empty");
        }

        let prompt = self.build_prompt(source, context);
        let system = self.system_prompt();

        let used = estimate_tokens(&system) + estimate_tokens(&prompt);
        if used + MIN_RESPONSE_TOKENS > self.max_context {
            bail!(
                "Prompt exceeds max_context limit ({} tokens estimated, {} available for the prompt)",
                used,
                self.max_context.saturating_sub(MIN_RESPONSE_TOKENS)
            );
        }

        self.post_chat(&system, &prompt, self.max_context - used)
    }
}

/// Rough token estimate; code packs tighter than prose
pub(crate) fn estimate_tokens(text: &str) -> usize {
    let code_indicators = ["{", "}", "(", ")", "def ", "class ", "import ", "return"];
    let has_code = code_indicators.iter().any(|i| text.contains(i));

    let divisor = if has_code { 3 } else { 4 };
    text.chars().count().div_ceil(divisor)
}

fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((offset, _)) => text[..offset].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, GenerationConfig};

    fn generator(max_context: usize, prompt_budget: usize) -> ChatGenerator {
        let config = Config {
            api: ApiConfig {
                base_url: "http://localhost:11434/v1".to_string(),
                api_key: Some("ollama".to_string()),
            },
            generation: GenerationConfig {
                model: "phi4".to_string(),
                max_context,
                constraints: vec![
                    "Test constraint 1".to_string(),
                    "Test constraint 2".to_string(),
                ],
                ignore: Vec::new(),
                exclude: Vec::new(),
                prompt_budget,
            },
            overwrite: false,
            dry_run: false,
            verbose: false,
        };
        ChatGenerator::new(&config).unwrap()
    }

    #[test]
    fn test_prompt_fences_source_and_appends_context() {
        let generator = generator(16_384, 10_000);
        let prompt = generator.build_prompt("def test(): pass", Some("Class: Calculator"));

        assert!(prompt.starts_with("```python\ndef test(): pass\n```"));
        assert!(prompt.ends_with("Additional context: Class: Calculator"));
    }

    #[test]
    fn test_prompt_trimmed_to_budget() {
        let generator = generator(16_384, 50);
        let source = "x = 1\n".repeat(100);
        let prompt = generator.build_prompt(&source, None);

        assert_eq!(prompt.chars().count(), 50);
    }

    #[test]
    fn test_system_prompt_carries_constraints() {
        let generator = generator(16_384, 10_000);
        let system = generator.system_prompt();

        assert!(system.contains("Test constraint 1"));
        assert!(system.contains("Test constraint 2"));
    }

    #[test]
    fn test_empty_source_rejected() {
        let generator = generator(16_384, 10_000);
        assert!(generator.generate("", None).is_err());
        assert!(generator.generate("   \n", None).is_err());
    }

    #[test]
    fn test_context_budget_enforced() {
        let generator = generator(64, 10_000);
        let err = generator
            .generate("def very_long_function(): pass", None)
            .unwrap_err();
        assert!(err.to_string().contains("max_context"));
    }

    #[test]
    fn test_estimate_tokens_code_density() {
        let prose = "a plain sentence with no markers at all";
        let code = "def f(a, b): return a + b";

        assert_eq!(estimate_tokens(prose), prose.len().div_ceil(4));
        assert_eq!(estimate_tokens(code), code.len().div_ceil(3));
    }

    #[test]
    fn test_trailing_slash_base_url_normalized() {
        let config = Config {
            api: ApiConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
                api_key: Some("key".to_string()),
            },
            generation: GenerationConfig {
                model: "gemini-2.0-flash-exp".to_string(),
                max_context: 131_072,
                constraints: vec!["c".to_string()],
                ignore: Vec::new(),
                exclude: Vec::new(),
                prompt_budget: 10_000,
            },
            overwrite: false,
            dry_run: false,
            verbose: false,
        };
        let generator = ChatGenerator::new(&config).unwrap();
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
    }
}
