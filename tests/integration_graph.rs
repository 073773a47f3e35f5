// tests/integration_graph.rs
//! Mutation, history and notification behaviour of `Graph`.

use linkshield_core::graph::{Edge, EventLog, Graph, GraphEvent};
use linkshield_core::ShieldError;
use proptest::prelude::*;

fn arb_scenario() -> impl Strategy<Value = (usize, bool, Vec<(usize, usize)>, Vec<(u8, usize, usize)>)> {
    (2usize..12, any::<bool>()).prop_flat_map(|(n, directed)| {
        (
            Just(n),
            Just(directed),
            prop::collection::vec((0..n, 0..n), 0..30),
            prop::collection::vec((0u8..3, 0..n, 0..n), 0..40),
        )
    })
}

fn apply_edit(g: &mut Graph, op: u8, i: usize, j: usize) {
    let result = match op {
        0 => g.add_edge(i, j),
        1 => g.remove_edge(i, j),
        _ => g.swap_edge(i, j),
    };
    assert!(result.is_ok(), "in-range edit must succeed");
}

proptest! {
    #[test]
    fn reset_restores_any_edit_sequence((n, directed, initial, edits) in arb_scenario()) {
        let mut g = Graph::from_edges("p", n, directed, initial).unwrap();
        let before = g.clone();
        g.start_recording_history();
        for (op, i, j) in edits {
            apply_edit(&mut g, op, i, j);
        }
        g.reset_graph().unwrap();
        prop_assert!(g.same_structure(&before));
        prop_assert_eq!(g.edges_count(), before.edges_count());
        prop_assert_eq!(g.history_size(), 0);
        prop_assert!(g.verify_consistency().is_ok());
    }

    #[test]
    fn partial_revert_then_reset_restores((n, directed, initial, edits) in arb_scenario(), k in 0usize..50) {
        let mut g = Graph::from_edges("p", n, directed, initial).unwrap();
        let before = g.clone();
        g.start_recording_history();
        for (op, i, j) in edits {
            apply_edit(&mut g, op, i, j);
        }
        let size = g.history_size();
        let reverted = g.revert_changes(k).unwrap();
        prop_assert_eq!(reverted, k.min(size));
        prop_assert_eq!(g.history_size(), size - reverted);
        g.reset_graph().unwrap();
        prop_assert!(g.same_structure(&before));
    }

    #[test]
    fn undirected_membership_is_symmetric((n, _directed, initial, _edits) in arb_scenario()) {
        let g = Graph::from_edges("u", n, false, initial).unwrap();
        for i in g.nodes() {
            for j in g.nodes() {
                prop_assert_eq!(g.contains_edge(i, j).unwrap(), g.contains_edge(j, i).unwrap());
            }
        }
        let degree_sum: usize = g.nodes().map(|v| g.degree(v)).sum();
        prop_assert_eq!(degree_sum, 2 * g.edges_count());
    }
}

#[test]
fn test_out_of_range_leaves_graph_untouched() {
    let mut g = Graph::from_edges("g", 3, false, [(0, 1)]).unwrap();
    let generation = g.generation();
    let err = g.add_edge(0, 3).unwrap_err();
    assert!(
        matches!(err, ShieldError::NodeOutOfRange { node: 3, size: 3 }),
        "got {err:?}"
    );
    assert_eq!(g.edges_count(), 1);
    assert_eq!(g.generation(), generation, "failed edit must not bump generation");
}

#[test]
fn test_self_loops_are_ignored() {
    let mut g = Graph::new("g", 3, true);
    g.start_recording_history();
    assert!(!g.add_edge(1, 1).unwrap());
    assert!(!g.remove_edge(1, 1).unwrap());
    assert_eq!(g.history_size(), 0, "no-op edits are not recorded");
}

#[test]
fn test_history_requires_recording() {
    let mut g = Graph::new("g", 3, false);
    assert!(matches!(g.reset_graph(), Err(ShieldError::NoHistory)));
    assert!(matches!(g.revert_changes(1), Err(ShieldError::NoHistory)));
}

#[test]
fn test_observer_sees_edits_and_reset() {
    let mut g = Graph::new("g", 4, false);
    let log = EventLog::new();
    let id = g.subscribe(Box::new(log.clone()));
    g.start_recording_history();

    g.add_edge(0, 1).unwrap();
    g.add_edge(2, 3).unwrap();
    g.remove_edge(0, 1).unwrap();
    g.revert_changes(1).unwrap();
    g.reset_graph().unwrap();

    let expected = vec![
        GraphEvent::Added { edge: Edge::undirected(0, 1) },
        GraphEvent::Added { edge: Edge::undirected(2, 3) },
        GraphEvent::Removed { edge: Edge::undirected(0, 1) },
        GraphEvent::Added { edge: Edge::undirected(0, 1) },
        GraphEvent::Reset,
    ];
    assert_eq!(log.events(), expected);
    assert_eq!(g.edges_count(), 0);

    assert!(g.unsubscribe(id).is_some());
    g.add_edge(0, 2).unwrap();
    assert_eq!(log.events().len(), expected.len(), "detached observer is silent");
}

#[test]
fn test_directed_edges_are_ordered() {
    let mut g = Graph::new("d", 3, true);
    g.add_edge(0, 1).unwrap();
    assert!(g.contains_edge(0, 1).unwrap());
    assert!(!g.contains_edge(1, 0).unwrap());
    assert!(g.contains_any_direction(1, 0).unwrap());
    assert_eq!(g.non_edges_count(), 5);
}
