// src/graph/components.rs
//! Connected components by breadth-first search.
//!
//! Directed graphs are traversed along both successors and predecessors, so the
//! components are the weakly connected ones.

use super::core::Graph;
use super::edge::Edge;
use super::node_set::NodeSet;
use crate::error::Result;
use rand::Rng;
use std::collections::VecDeque;

impl Graph {
    /// Nodes reachable from `v`, optionally restricted to `allowed`.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if `v` is out of range.
    pub fn connected_component(&self, v: usize, allowed: Option<&NodeSet>) -> Result<NodeSet> {
        self.check_node(v)?;
        let admits = |w: usize| allowed.map_or(true, |a| a.contains(w));

        let mut component = NodeSet::from([v]);
        let mut queue = VecDeque::from([v]);
        while let Some(i) = queue.pop_front() {
            let outgoing = self.successors(i).iter();
            let incoming = self
                .is_directed()
                .then(|| self.predecessors(i).iter())
                .into_iter()
                .flatten();
            for j in outgoing.chain(incoming) {
                if admits(j) && component.insert(j) {
                    queue.push_back(j);
                }
            }
        }
        Ok(component)
    }

    /// Partition of `allowed` (all nodes by default) into components, in order
    /// of their smallest node.
    #[must_use]
    pub fn connected_components(&self, allowed: Option<&NodeSet>) -> Vec<NodeSet> {
        let mut rest: Vec<usize> = match allowed {
            Some(a) => a.sorted().into_iter().filter(|&v| v < self.size()).collect(),
            None => self.nodes().collect(),
        };
        rest.reverse();

        let mut seen = NodeSet::new();
        let mut components = Vec::new();
        while let Some(v) = rest.pop() {
            if seen.contains(v) {
                continue;
            }
            // v < size() holds for every entry of `rest`
            if let Ok(component) = self.connected_component(v, allowed) {
                seen.extend_from(&component);
                components.push(component);
            }
        }
        components
    }

    /// The largest component; the earliest one wins ties.
    #[must_use]
    pub fn giant_component(&self) -> NodeSet {
        let mut best = NodeSet::new();
        for component in self.connected_components(None) {
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.connected_components(None).len()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.size() == 0
            || self
                .connected_component(0, None)
                .map_or(false, |c| c.len() == self.size())
    }

    /// Links each component to the previous one with a random edge.
    /// Returns the edges that were added.
    ///
    /// # Errors
    /// Propagates mutation errors; none are expected for in-range nodes.
    pub fn force_connectivity<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Edge>> {
        let components = self.connected_components(None);
        let mut added = Vec::new();
        for pair in components.windows(2) {
            let [previous, current] = pair else {
                continue;
            };
            let (Some(i), Some(j)) = (current.random(rng), previous.random(rng)) else {
                continue;
            };
            if self.add_edge(i, j)? {
                added.push(self.edge(i, j));
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_triangles() -> Graph {
        Graph::from_edges(
            "tt",
            7,
            false,
            [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)],
        )
        .unwrap()
    }

    #[test]
    fn test_components_partition_nodes() {
        let g = two_triangles();
        let comps = g.connected_components(None);
        assert_eq!(comps.len(), 3, "two triangles plus isolated node 6");
        assert_eq!(comps[0].sorted(), vec![0, 1, 2]);
        assert_eq!(comps[1].sorted(), vec![3, 4, 5]);
        assert_eq!(comps[2].sorted(), vec![6]);
        assert!(!g.is_connected());
    }

    #[test]
    fn test_allowed_subset_restricts_traversal() {
        let g = Graph::from_edges("p", 4, false, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let allowed = NodeSet::from([0, 2, 3]);
        let comps = g.connected_components(Some(&allowed));
        let sizes: Vec<usize> = comps.iter().map(NodeSet::len).collect();
        assert_eq!(sizes, vec![1, 2]);
    }

    #[test]
    fn test_directed_uses_predecessors() {
        let g = Graph::from_edges("d", 3, true, [(1, 0), (1, 2)]).unwrap();
        assert_eq!(g.connected_component(0, None).unwrap().len(), 3);
        assert!(g.is_connected());
    }

    #[test]
    fn test_giant_component() {
        let mut g = two_triangles();
        g.add_edge(5, 6).unwrap();
        assert_eq!(g.giant_component().sorted(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_force_connectivity() {
        let mut g = two_triangles();
        let mut rng = StdRng::seed_from_u64(5);
        let added = g.force_connectivity(&mut rng).unwrap();
        assert_eq!(added.len(), 2);
        assert!(g.is_connected());
        assert_eq!(g.component_count(), 1);
    }
}
