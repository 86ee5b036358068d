//! Progress tracking for a documentation run.
//!
//! Every unit outcome is recorded as it happens; the CLI renders one line per
//! file (or one per unit in verbose mode) and a summary at the end.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use colored::Colorize;

/// Outcome of one documentable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Documented,
    Skipped,
    Failed,
}

impl UnitState {
    fn label(&self) -> &'static str {
        match self {
            UnitState::Pending => "pending",
            UnitState::Documented => "documented",
            UnitState::Skipped => "skipped",
            UnitState::Failed => "failed",
        }
    }
}

/// Receiver for unit-level progress events
pub trait ProgressSink {
    fn record(&mut self, file: &Path, unit: &str, state: UnitState);
}

/// Per-run counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub documented: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Tracks unit outcomes and renders progress output
pub struct ProgressTracker {
    verbose: bool,
    use_color: bool,
    started: Instant,
    pub started_at: DateTime<Utc>,
    files_seen: usize,
    files_updated: usize,
    files_failed: usize,
    counts: Counts,
    events: Vec<(PathBuf, String, UnitState)>,
    /// Counters for the file currently being processed
    file_counts: Counts,
}

impl ProgressTracker {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            use_color: atty::is(atty::Stream::Stdout),
            started: Instant::now(),
            started_at: Utc::now(),
            files_seen: 0,
            files_updated: 0,
            files_failed: 0,
            counts: Counts::default(),
            events: Vec::new(),
            file_counts: Counts::default(),
        }
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    pub fn files_updated(&self) -> usize {
        self.files_updated
    }

    pub fn events(&self) -> &[(PathBuf, String, UnitState)] {
        &self.events
    }

    /// Record a file whose source could not be parsed
    pub fn file_failed(&mut self, file: &Path, reason: &str) {
        self.files_seen += 1;
        self.files_failed += 1;
        let line = format!("  ✗ {}: {}", file.display(), reason);
        if self.use_color {
            eprintln!("{}", line.as_str().red());
        } else {
            eprintln!("{}", line);
        }
    }

    /// Record the end of a file, printing its one-line progress entry
    pub fn file_done(&mut self, file: &Path, updated: bool, dry_run: bool) {
        self.files_seen += 1;
        if updated {
            self.files_updated += 1;
        }

        let c = self.file_counts;
        self.file_counts = Counts::default();

        let marker = if dry_run && updated { " [dry-run]" } else { "" };
        println!(
            "  📄 {}: {} documented, {} skipped, {} failed{}",
            file.display(),
            c.documented,
            c.skipped,
            c.failed,
            marker
        );
    }

    /// Render the end-of-run summary
    pub fn summary(&self, interrupted: bool, dry_run: bool) -> String {
        let elapsed = self.started.elapsed();
        let mut out = String::from("\n📊 Documentation Summary:\n");
        if self.verbose {
            out.push_str(&format!(
                "  • Started: {}\n",
                self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        out.push_str(&format!(
            "  • Files processed: {} ({} updated)\n",
            self.files_seen, self.files_updated
        ));
        if self.files_failed > 0 {
            out.push_str(&format!("  • Files failed to parse: {}\n", self.files_failed));
        }
        out.push_str(&format!(
            "  • Units: {} documented, {} skipped, {} failed\n",
            self.counts.documented, self.counts.skipped, self.counts.failed
        ));
        out.push_str(&format!("  • Time elapsed: {:.1?}", elapsed));
        if dry_run {
            out.push_str("\n  • Dry run: no files were written");
        }
        if interrupted {
            out.push_str("\n  ⚠️  Run interrupted; remaining files untouched");
        }
        out
    }
}

impl ProgressSink for ProgressTracker {
    fn record(&mut self, file: &Path, unit: &str, state: UnitState) {
        match state {
            UnitState::Documented => {
                self.counts.documented += 1;
                self.file_counts.documented += 1;
            }
            UnitState::Skipped => {
                self.counts.skipped += 1;
                self.file_counts.skipped += 1;
            }
            UnitState::Failed => {
                self.counts.failed += 1;
                self.file_counts.failed += 1;
            }
            UnitState::Pending => {}
        }

        if self.verbose {
            let line = format!("    {} {} [{}]", file.display(), unit, state.label());
            match state {
                UnitState::Failed if self.use_color => println!("{}", line.as_str().red()),
                UnitState::Documented if self.use_color => println!("{}", line.as_str().green()),
                _ => println!("{}", line),
            }
        }

        self.events
            .push((file.to_path_buf(), unit.to_string(), state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut tracker = ProgressTracker::new(false);
        let file = Path::new("mod.py");

        tracker.record(file, "a", UnitState::Documented);
        tracker.record(file, "b", UnitState::Documented);
        tracker.record(file, "c", UnitState::Skipped);
        tracker.record(file, "d", UnitState::Failed);

        let counts = tracker.counts();
        assert_eq!(counts.documented, 2);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(tracker.events().len(), 4);
    }

    #[test]
    fn test_file_counters_reset_between_files() {
        let mut tracker = ProgressTracker::new(false);

        tracker.record(Path::new("a.py"), "f", UnitState::Documented);
        tracker.file_done(Path::new("a.py"), true, false);
        tracker.record(Path::new("b.py"), "g", UnitState::Skipped);
        tracker.file_done(Path::new("b.py"), false, false);

        assert_eq!(tracker.files_seen(), 2);
        assert_eq!(tracker.files_updated(), 1);
        assert_eq!(tracker.file_counts, Counts::default());
    }

    #[test]
    fn test_summary_reports_totals() {
        let mut tracker = ProgressTracker::new(false);
        tracker.record(Path::new("a.py"), "f", UnitState::Documented);
        tracker.file_done(Path::new("a.py"), true, false);

        let summary = tracker.summary(false, true);
        assert!(summary.contains("Files processed: 1 (1 updated)"));
        assert!(summary.contains("1 documented, 0 skipped, 0 failed"));
        assert!(summary.contains("Dry run"));
        assert!(!summary.contains("interrupted"));
    }

    #[test]
    fn test_summary_marks_interruption() {
        let tracker = ProgressTracker::new(false);
        assert!(tracker.summary(true, false).contains("interrupted"));
    }

    #[test]
    fn test_parse_failure_counted_separately() {
        let mut tracker = ProgressTracker::new(false);
        tracker.file_failed(Path::new("bad.py"), "syntax errors");

        assert_eq!(tracker.files_seen(), 1);
        assert_eq!(tracker.files_updated(), 0);
        assert!(tracker.summary(false, false).contains("Files failed to parse: 1"));
    }
}
