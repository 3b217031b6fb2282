//! Positioned compile diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::newline::NEWLINE;

/// A single compile diagnostic with a 1-based source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(message: S, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

/// Ordered, de-duplicated collection of diagnostics.
///
/// Two diagnostics are duplicates when they render to the same line. The
/// first occurrence keeps its place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticList {
    items: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic unless an identical line is already present
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let rendered = diagnostic.to_string();
        if !self.items.iter().any(|d| d.to_string() == rendered) {
            self.items.push(diagnostic);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }
}

impl FromIterator<Diagnostic> for DiagnosticList {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let mut list = DiagnosticList::new();
        for diagnostic in iter {
            list.push(diagnostic);
        }
        list
    }
}

/// One diagnostic per line, joined with the host newline
impl fmt::Display for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, diagnostic) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(NEWLINE)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticList {}
