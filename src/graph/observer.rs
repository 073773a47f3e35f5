// src/graph/observer.rs
//! Change notification for graph edits.
//!
//! Observers are owned by the graph and called synchronously after every
//! successful edit. Score caches do not subscribe; they compare the graph's
//! generation counter instead (see `predict::cache`).

use super::core::Graph;
use super::edge::Edge;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives notifications about structural changes of a graph.
pub trait GraphObserver: Send + Sync {
    fn on_add(&mut self, graph: &Graph, edge: &Edge);
    fn on_remove(&mut self, graph: &Graph, edge: &Edge);
    /// Fired once after `Graph::reset_graph` unwound the whole history.
    fn on_reset(&mut self, graph: &Graph);
}

/// Handle returned by `Graph::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphEvent {
    Added { edge: Edge },
    Removed { edge: Edge },
    Reset,
}

/// Observer that appends every notification to a shared log.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GraphEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything logged so far.
    #[must_use]
    pub fn events(&self) -> Vec<GraphEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The log as JSON lines.
    #[must_use]
    pub fn to_json_lines(&self) -> String {
        self.lock()
            .iter()
            .filter_map(|event| serde_json::to_string(event).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&self, event: GraphEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GraphEvent>> {
        // Logging is best-effort; a poisoned log is still readable.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GraphObserver for EventLog {
    fn on_add(&mut self, _graph: &Graph, edge: &Edge) {
        self.push(GraphEvent::Added { edge: *edge });
    }

    fn on_remove(&mut self, _graph: &Graph, edge: &Edge) {
        self.push(GraphEvent::Removed { edge: *edge });
    }

    fn on_reset(&mut self, _graph: &Graph) {
        self.push(GraphEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_one_per_event() {
        let mut g = Graph::new("log", 3, false);
        let log = EventLog::new();
        g.subscribe(Box::new(log.clone()));
        g.start_recording_history();
        g.add_edge(0, 1).unwrap();
        g.remove_edge(0, 1).unwrap();
        g.reset_graph().unwrap();

        let text = log.to_json_lines();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), log.events().len());
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok(), "not JSON: {line}");
        }
        assert!(lines[0].contains("added"), "got {}", lines[0]);
        assert!(lines[1].contains("removed"), "got {}", lines[1]);
        assert_eq!(lines[2], "\"reset\"");

        log.clear();
        assert!(log.to_json_lines().is_empty());
    }
}
