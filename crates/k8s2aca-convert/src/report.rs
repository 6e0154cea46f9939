//! Migration report
//!
//! An append-only, ordered list of diagnostics. Each workload gets its own
//! report; every approximation, default or omission made while translating
//! it adds exactly one entry.

use std::fmt;

/// Entry severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational - translation succeeded, nothing to do
    Info,
    /// Warning - a default or omission was applied, review recommended
    Warning,
    /// Unsupported - no ACA equivalent, manual migration needed
    Unsupported,
    /// Error - the output is known to be incomplete
    Error,
}

impl Severity {
    /// Bracketed prefix label
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Unsupported => "Unsupported",
            Self::Error => "Error",
        }
    }

    /// Get the display color for terminal output
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "cyan",
            Self::Warning => "yellow",
            Self::Unsupported => "magenta",
            Self::Error => "red",
        }
    }

    /// Get the icon for this severity
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Unsupported => "✗",
            Self::Error => "✗",
        }
    }
}

/// One line of the migration report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.tag(), self.message)
    }
}

/// Ordered diagnostics for one workload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    entries: Vec<ReportEntry>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(ReportEntry {
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn unsupported(&mut self, message: impl Into<String>) {
        self.push(Severity::Unsupported, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get count of entries by severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Check if any construct needs manual migration
    pub fn has_unsupported(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Unsupported)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }
}

impl fmt::Display for MigrationReport {
    /// One entry per line, each terminated by a newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
