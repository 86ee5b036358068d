//! Byte-offset docstring edits.
//!
//! Edits are computed against the original source and applied in descending
//! offset order, so earlier offsets stay valid while later spans are spliced.

use anyhow::{bail, Context, Result};

use crate::DocUnit;

/// A single splice into the original source
#[derive(Debug, Clone)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Edit {
    /// Build an edit inserting a fresh docstring at the head of a unit's body
    pub fn insert_docstring(unit: &DocUnit, content: &str) -> Result<Edit> {
        let content = content.trim();
        if content.is_empty() {
            bail!("Refusing to insert an empty docstring");
        }

        let literal = format_docstring(content, &unit.body_indent, "\"\"\"");
        let (start, end, breaks_line) = unit.insertion_span();

        let text = if breaks_line {
            // `def f(): pass` -> body moves onto its own indented line
            format!(
                "\n{indent}{literal}\n{indent}",
                indent = unit.body_indent,
                literal = literal
            )
        } else {
            format!(
                "{literal}\n{indent}",
                literal = literal,
                indent = unit.body_indent
            )
        };

        Ok(Edit { start, end, text })
    }

    /// Build an edit replacing a unit's existing docstring
    ///
    /// Triple-quote styles are preserved; single-quote docstrings are
    /// upgraded to `"""`.
    pub fn replace_docstring(unit: &DocUnit, content: &str) -> Result<Edit> {
        let content = content.trim();
        if content.is_empty() {
            bail!("Refusing to replace with an empty docstring");
        }

        let existing = unit
            .docstring
            .as_ref()
            .context("Unit has no docstring to replace")?;

        let quote = match existing.quote {
            "'''" => "'''",
            _ => "\"\"\"",
        };

        Ok(Edit {
            start: existing.start_byte,
            end: existing.end_byte,
            text: format_docstring(content, &unit.body_indent, quote),
        })
    }
}

/// Render docstring content as a quoted literal at the given indentation
///
/// Single-line content stays on one line (`"""Text."""`); multi-line content
/// opens with the summary on the quote line and closes on its own line, per
/// the usual Python convention.
pub fn format_docstring(content: &str, indent: &str, quote: &str) -> String {
    // A docstring cannot contain its own delimiter unescaped
    let escaped_quote: String = quote.chars().map(|c| format!("\\{}", c)).collect();
    let content = content.replace(quote, &escaped_quote);

    if !content.contains('\n') {
        return format!("{quote}{content}{quote}");
    }

    let mut out = String::from(quote);
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(indent);
            }
        }
        if !line.trim().is_empty() || i == 0 {
            out.push_str(line.trim_end());
        }
    }
    out.push('\n');
    out.push_str(indent);
    out.push_str(quote);
    out
}

/// Splice edits into the source, bottom-up
///
/// Edits must not overlap; they are sorted by descending start offset before
/// application so each splice leaves every earlier offset untouched.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.start.cmp(&a.start));

    for pair in sorted.windows(2) {
        if pair[1].end > pair[0].start {
            bail!(
                "Overlapping edits at bytes {}..{} and {}..{}",
                pair[1].start,
                pair[1].end,
                pair[0].start,
                pair[0].end
            );
        }
    }

    let mut bytes = source.as_bytes().to_vec();
    for edit in &sorted {
        if edit.start > edit.end || edit.end > bytes.len() {
            bail!("Edit out of bounds: {}..{}", edit.start, edit.end);
        }
        bytes.splice(edit.start..edit.end, edit.text.bytes());
    }

    String::from_utf8(bytes).context("Edited source is not valid UTF-8")
}
