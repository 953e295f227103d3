use std::collections::HashMap;

use crate::events::EventRecord;

use super::diagnostics::{Diagnostic, Diagnostics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

/// One edge per resolved reference whose target comes later in data order. That ordering rule
/// is the only de-duplication: a mutual reference yields a single edge.
pub fn resolve_links(events: &[EventRecord], diagnostics: &mut Diagnostics) -> Vec<Edge> {
    let mut index_by_title = HashMap::with_capacity(events.len());
    for (index, event) in events.iter().enumerate() {
        index_by_title.entry(event.title.as_str()).or_insert(index);
    }

    let mut edges = Vec::new();
    for (source, event) in events.iter().enumerate() {
        for title in &event.connections {
            match index_by_title.get(title.as_str()) {
                Some(&target) if target > source => edges.push(Edge { source, target }),
                Some(_) => {}
                None => diagnostics.record(Diagnostic::UnresolvedLink {
                    source,
                    title: title.clone(),
                }),
            }
        }
    }

    edges
}
