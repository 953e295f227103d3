use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    #[default]
    Circle,
    Major,
    TimelineTrigger,
    CategorySummary,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Major => "major",
            Self::TimelineTrigger => "timeline-trigger",
            Self::CategorySummary => "category-summary",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "circle" | "ordinary" => Ok(Self::Circle),
            "major" => Ok(Self::Major),
            "timeline-trigger" | "timeline_trigger" => Ok(Self::TimelineTrigger),
            "category-summary" | "category_summary" => Ok(Self::CategorySummary),
            other => Err(other.to_owned()),
        }
    }
}

/// One validated input event. Titles are unique across a loaded set.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub title: String,
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub people: Vec<String>,
    pub category: String,
    pub period: String,
    pub kind: NodeKind,
    pub connections: Vec<String>,
}

impl EventRecord {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        period: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            title: title.into(),
            date: String::new(),
            location: None,
            description: None,
            image: None,
            people: Vec::new(),
            category: category.into(),
            period: period.into(),
            kind,
            connections: Vec::new(),
        }
    }

    pub fn with_connections<I, S>(mut self, connections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connections = connections.into_iter().map(Into::into).collect();
        self
    }
}
