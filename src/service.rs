//! The per-file documentation pipeline.
//!
//! Parse, walk units in source order, generate and sanitize docstrings, then
//! splice all edits in one pass and write the file back. A unit that fails is
//! recorded and left untouched; it never corrupts the edits of its neighbors.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use docauto_cst::{CstParser, DocUnit, Edit};

use crate::config::Config;
use crate::discovery;
use crate::generator::DocsGenerator;
use crate::sanitize::Sanitizer;
use crate::shutdown;
use crate::tracker::{ProgressSink, ProgressTracker, UnitState};

pub struct DocumentationService<G: DocsGenerator> {
    generator: G,
    parser: CstParser,
    sanitizer: Sanitizer,
    tracker: ProgressTracker,
    overwrite: bool,
    ignore: HashSet<String>,
}

impl<G: DocsGenerator> DocumentationService<G> {
    pub fn new(generator: G, config: &Config) -> Result<Self> {
        Ok(Self {
            generator,
            parser: CstParser::new()?,
            sanitizer: Sanitizer::new()?,
            tracker: ProgressTracker::new(config.verbose),
            overwrite: config.overwrite,
            ignore: config.generation.ignore.iter().cloned().collect(),
        })
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Document one file; returns true when the file was updated
    ///
    /// Parse failures are recorded and reported, not propagated: a file the
    /// tool cannot fully understand is never rewritten.
    pub fn process_file(&mut self, path: &Path, dry_run: bool) -> Result<bool> {
        let source = discovery::read_file(path)?;

        let module = match self.parser.parse(&source) {
            Ok(module) => module,
            Err(e) => {
                self.tracker.file_failed(path, &e.to_string());
                return Ok(false);
            }
        };

        let mut edits = Vec::new();
        for unit in module.units() {
            if shutdown::requested() {
                break;
            }

            if self.ignore.contains(&unit.name) {
                self.tracker
                    .record(path, &unit.qualified_name, UnitState::Skipped);
                continue;
            }

            if unit.docstring.is_some() && !self.overwrite {
                self.tracker
                    .record(path, &unit.qualified_name, UnitState::Skipped);
                continue;
            }

            match self.document_unit(&unit) {
                Ok(edit) => {
                    edits.push(edit);
                    self.tracker
                        .record(path, &unit.qualified_name, UnitState::Documented);
                }
                Err(e) => {
                    eprintln!(
                        "  ✗ {}:{} {} documentation failed: {:#}",
                        path.display(),
                        unit.line,
                        unit.qualified_name,
                        e
                    );
                    self.tracker
                        .record(path, &unit.qualified_name, UnitState::Failed);
                }
            }
        }

        if edits.is_empty() {
            self.tracker.file_done(path, false, dry_run);
            return Ok(false);
        }

        let updated = module.apply(&edits)?;
        if !dry_run {
            discovery::write_file(path, &updated)?;
        }

        self.tracker.file_done(path, true, dry_run);
        Ok(true)
    }

    fn document_unit(&self, unit: &DocUnit) -> Result<Edit> {
        let context = unit.class_context.as_ref().map(|c| format!("Class: {}", c));
        let raw = self
            .generator
            .generate(&unit.source_text, context.as_deref())?;
        let content = self.sanitizer.sanitize(&raw)?;

        if unit.docstring.is_some() {
            Edit::replace_docstring(unit, &content)
        } else {
            Edit::insert_docstring(unit, &content)
        }
    }
}
