use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::record::{EventRecord, NodeKind};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of events or an object with an `events` array")]
    UnexpectedShape,
    #[error("event #{index} has an empty title")]
    EmptyTitle { index: usize },
    #[error("duplicate event title `{title}` (events #{first} and #{second})")]
    DuplicateTitle {
        title: String,
        first: usize,
        second: usize,
    },
    #[error("event `{title}` has an empty {field}")]
    EmptyField { title: String, field: &'static str },
    #[error("event `{title}` has unknown node kind `{kind}`")]
    UnknownKind { title: String, kind: String },
}

#[derive(Clone, Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    people: Option<Vec<String>>,
    #[serde(default)]
    category: String,
    #[serde(default, alias = "timePeriod", alias = "time_period")]
    period: String,
    #[serde(default, alias = "type", alias = "nodeType")]
    kind: Option<String>,
    #[serde(default)]
    connections: Vec<String>,
}

pub fn load_events(path: &Path) -> Result<Vec<EventRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    let events =
        parse_events(&raw).with_context(|| format!("failed to ingest {}", path.display()))?;
    tracing::info!(count = events.len(), path = %path.display(), "loaded events");
    Ok(events)
}

pub fn parse_events(raw: &str) -> Result<Vec<EventRecord>, IngestError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("events") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(IngestError::UnexpectedShape),
        },
        _ => return Err(IngestError::UnexpectedShape),
    };

    let mut seen = HashMap::with_capacity(entries.len());
    let mut events = Vec::with_capacity(entries.len());
    for (index, value) in entries.into_iter().enumerate() {
        let raw = RawEvent::deserialize(value)?;
        let event = validate(index, raw)?;
        if let Some(first) = seen.insert(event.title.clone(), index) {
            return Err(IngestError::DuplicateTitle {
                title: event.title,
                first,
                second: index,
            });
        }
        events.push(event);
    }

    Ok(events)
}

fn validate(index: usize, raw: RawEvent) -> Result<EventRecord, IngestError> {
    let title = raw.title.trim().to_owned();
    if title.is_empty() {
        return Err(IngestError::EmptyTitle { index });
    }

    let category = raw.category.trim().to_owned();
    if category.is_empty() {
        return Err(IngestError::EmptyField {
            title,
            field: "category",
        });
    }

    let period = raw.period.trim().to_owned();
    if period.is_empty() {
        return Err(IngestError::EmptyField {
            title,
            field: "period",
        });
    }

    let kind = match raw.kind.as_deref() {
        None => NodeKind::Circle,
        Some(value) => value
            .parse::<NodeKind>()
            .map_err(|kind| IngestError::UnknownKind {
                title: title.clone(),
                kind,
            })?,
    };

    let connections = raw
        .connections
        .into_iter()
        .map(|connection| connection.trim().to_owned())
        .filter(|connection| !connection.is_empty())
        .collect::<Vec<_>>();

    Ok(EventRecord {
        title,
        date: raw.date.trim().to_owned(),
        location: raw.location.filter(|value| !value.trim().is_empty()),
        description: raw.description.filter(|value| !value.trim().is_empty()),
        image: raw.image.filter(|value| !value.trim().is_empty()),
        people: raw.people.unwrap_or_default(),
        category,
        period,
        kind,
        connections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_with_optional_fields() {
        let raw = r#"[
            {"title": "Fall of Rome", "date": "476", "category": "Politics",
             "timePeriod": "1a Antiquity", "type": "major",
             "connections": ["Printing Press"], "people": ["Odoacer"]},
            {"title": "Printing Press", "category": "Technology", "period": "2a Early Modern"}
        ]"#;

        let events = parse_events(raw).expect("valid input");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, NodeKind::Major);
        assert_eq!(events[0].period, "1a Antiquity");
        assert_eq!(events[0].people, vec!["Odoacer".to_owned()]);
        assert_eq!(events[1].kind, NodeKind::Circle);
        assert!(events[1].people.is_empty());
        assert!(events[1].location.is_none());
    }

    #[test]
    fn accepts_wrapped_events_object() {
        let raw = r#"{"events": [{"title": "A", "category": "X", "period": "1a"}]}"#;
        assert_eq!(parse_events(raw).map(|events| events.len()).ok(), Some(1));
    }

    #[test]
    fn rejects_duplicate_titles() {
        let raw = r#"[
            {"title": "A", "category": "X", "period": "1a"},
            {"title": " A ", "category": "Y", "period": "1b"}
        ]"#;
        match parse_events(raw) {
            Err(IngestError::DuplicateTitle { title, first, second }) => {
                assert_eq!(title, "A");
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("expected duplicate title error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind_and_empty_fields() {
        let unknown = r#"[{"title": "A", "category": "X", "period": "1a", "kind": "star"}]"#;
        assert!(matches!(
            parse_events(unknown),
            Err(IngestError::UnknownKind { kind, .. }) if kind == "star"
        ));

        let no_period = r#"[{"title": "A", "category": "X"}]"#;
        assert!(matches!(
            parse_events(no_period),
            Err(IngestError::EmptyField { field: "period", .. })
        ));

        let no_title = r#"[{"category": "X", "period": "1a"}]"#;
        assert!(matches!(
            parse_events(no_title),
            Err(IngestError::EmptyTitle { index: 0 })
        ));
    }

    #[test]
    fn rejects_scalars() {
        assert!(matches!(
            parse_events("42"),
            Err(IngestError::UnexpectedShape)
        ));
        assert!(matches!(parse_events("{"), Err(IngestError::Json(_))));
    }
}
