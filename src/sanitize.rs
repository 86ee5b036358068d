//! LLM response cleanup.
//!
//! Models wrap answers in markdown fences, echo the function header back, or
//! include the docstring quotes despite being told not to. The sanitizer runs
//! a fixed pipeline over the raw text; pattern steps are fail-silent (they
//! return their input untouched when nothing matches).

use anyhow::{bail, Context, Result};
use regex::Regex;

pub struct Sanitizer {
    fences: Regex,
    header: Regex,
    double_quoted: Regex,
    single_quoted: Regex,
}

impl Sanitizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fences: Regex::new(r"(?m)^```[\w-]*[ \t]*\r?\n|\r?\n```[ \t]*$")
                .context("fence pattern")?,
            header: Regex::new(r"(?m)^\s*def\s+\w+\([^)\n]*\)[^\n]*:[ \t]*\r?\n?")
                .context("header pattern")?,
            double_quoted: Regex::new(r#"(?s)"""(.*?)""""#).context("double-quote pattern")?,
            single_quoted: Regex::new(r"(?s)'''(.*?)'''").context("single-quote pattern")?,
        })
    }

    /// Run the full pipeline; an empty result is an error
    pub fn sanitize(&self, raw: &str) -> Result<String> {
        let mut text = raw.trim().to_string();
        text = self.strip_fences(&text);
        text = self.strip_header(&text);
        text = self.extract_quoted(&text);
        let text = text.trim();

        if text.is_empty() {
            bail!("Response was empty after sanitizing");
        }

        Ok(text.to_string())
    }

    /// Remove markdown code block fences
    fn strip_fences(&self, text: &str) -> String {
        self.fences.replace_all(text, "").into_owned()
    }

    /// Remove an echoed `def` header, first occurrence only
    fn strip_header(&self, text: &str) -> String {
        self.header.replacen(text, 1, "").into_owned()
    }

    /// When the model answered with docstring quotes included, keep the body
    fn extract_quoted(&self, text: &str) -> String {
        if let Some(captures) = self.double_quoted.captures(text) {
            return captures[1].to_string();
        }
        if let Some(captures) = self.single_quoted.captures(text) {
            return captures[1].to_string();
        }
        text.to_string()
    }
}
