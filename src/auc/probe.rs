// src/auc/probe.rs
//! Held-out edges used as the positive class.

use crate::error::{Result, ShieldError};
use crate::graph::{Edge, Graph};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Distinct probe edges in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProbeSet {
    edges: Vec<Edge>,
    members: HashSet<Edge>,
}

impl ProbeSet {
    /// Validates probes against `g`; duplicates are collapsed.
    ///
    /// # Errors
    /// Returns `InvalidProbe` for a self-loop, an edge present in `g`, an
    /// out-of-range endpoint or a directedness mismatch.
    pub fn new<I>(g: &Graph, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut probes = Self::default();
        for e in edges {
            if probes.members.insert(e) {
                probes.edges.push(e);
            }
        }
        probes.check(g)?;
        Ok(probes)
    }

    /// Removes `edges` from `g` and returns them as probes.
    ///
    /// # Errors
    /// Returns `InvalidProbe` if an edge is foreign to `g` or not present in it.
    /// The graph is untouched on error.
    pub fn hide<I>(g: &mut Graph, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        let edges: Vec<Edge> = edges.into_iter().collect();
        for e in &edges {
            let present = g.contains(e).map_err(|err| invalid(e, &err.to_string()))?;
            if !present {
                return Err(invalid(e, "not an edge of the graph"));
            }
        }
        for e in &edges {
            g.remove(e)?;
        }
        Self::new(g, edges)
    }

    /// Re-checks every probe against the current state of `g`.
    ///
    /// # Errors
    /// See [`ProbeSet::new`].
    pub fn check(&self, g: &Graph) -> Result<()> {
        for e in &self.edges {
            if e.is_loop() {
                return Err(invalid(e, "self-loop"));
            }
            match g.contains(e) {
                Ok(false) => {}
                Ok(true) => return Err(invalid(e, "present in the graph")),
                Err(err) => return Err(invalid(e, &err.to_string())),
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn contains(&self, edge: &Edge) -> bool {
        self.members.contains(edge)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Edge> {
        self.edges.choose(rng)
    }
}

impl<'a> IntoIterator for &'a ProbeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn invalid(e: &Edge, reason: &str) -> ShieldError {
    ShieldError::InvalidProbe(format!("{e}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_plus() -> Graph {
        Graph::from_edges("t", 4, false, [(0, 1), (1, 2), (2, 0)]).unwrap()
    }

    #[test]
    fn test_rejects_invalid_probes() {
        let g = triangle_plus();
        let cases = [
            Edge::undirected(0, 1),
            Edge::undirected(3, 3),
            Edge::undirected(0, 7),
            Edge::directed(0, 3),
        ];
        for e in cases {
            assert!(
                matches!(ProbeSet::new(&g, [e]), Err(ShieldError::InvalidProbe(_))),
                "{e} should be rejected"
            );
        }
    }

    #[test]
    fn test_collapses_duplicates() {
        let g = triangle_plus();
        let probes = ProbeSet::new(&g, [Edge::undirected(0, 3), Edge::undirected(3, 0)]).unwrap();
        assert_eq!(probes.len(), 1);
        assert!(probes.contains(&Edge::undirected(3, 0)));
    }

    #[test]
    fn test_hide_removes_edges() {
        let mut g = triangle_plus();
        let probes = ProbeSet::hide(&mut g, [Edge::undirected(1, 2)]).unwrap();
        assert_eq!(g.edges_count(), 2);
        assert_eq!(probes.as_slice(), [Edge::undirected(1, 2)]);

        assert!(ProbeSet::hide(&mut g, [Edge::undirected(0, 1), Edge::undirected(1, 3)]).is_err());
        assert_eq!(g.edges_count(), 2, "untouched on error");
    }

    #[test]
    fn test_check_catches_reinserted_probe() {
        let mut g = triangle_plus();
        let probes = ProbeSet::new(&g, [Edge::undirected(0, 3)]).unwrap();
        g.add_edge(0, 3).unwrap();
        assert!(probes.check(&g).is_err());
    }
}
