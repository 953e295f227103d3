use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    MissingRing,
    MissingSector,
}

impl fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRing => f.write_str("no ring for category"),
            Self::MissingSector => f.write_str("no sector for category/period"),
        }
    }
}

/// Non-fatal problems found while building a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    UnresolvedLink { source: usize, title: String },
    Unplaced { node: usize, reason: UnplacedReason },
}

#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnresolvedLink { source, title } => {
                tracing::warn!(source, target = %title, "dropping unresolved connection");
            }
            Diagnostic::Unplaced { node, reason } => {
                tracing::warn!(node, %reason, "node placed at fallback position");
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn unresolved_links(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Diagnostic::UnresolvedLink { .. }))
            .count()
    }

    pub fn unplaced_nodes(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Diagnostic::Unplaced { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
