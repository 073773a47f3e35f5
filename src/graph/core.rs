// src/graph/core.rs
//! The mutable graph: adjacency, edge mutation, edit history and notification.

use super::adjacency::Adjacency;
use super::edge::Edge;
use super::history::{Change, History};
use super::node_set::NodeSet;
use super::observer::{GraphEvent, GraphObserver, ObserverId};
use crate::error::{Result, ShieldError};
use rand::Rng;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a graph instance. Clones get a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(u64);

impl GraphId {
    fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A graph over the nodes `0..n` with optional edit history.
pub struct Graph {
    id: GraphId,
    name: String,
    n: usize,
    m: usize,
    adjacency: Adjacency,
    history: Option<History>,
    /// Bumped whenever a fresh history replaces the old one.
    history_epoch: u64,
    generation: u64,
    observers: Vec<(ObserverId, Box<dyn GraphObserver>)>,
    next_observer: u64,
}

impl Graph {
    #[must_use]
    pub fn new(name: impl Into<String>, n: usize, directed: bool) -> Self {
        Self {
            id: GraphId::next(),
            name: name.into(),
            n,
            m: 0,
            adjacency: Adjacency::new(n, directed),
            history: None,
            history_epoch: 0,
            generation: 0,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Builds a graph from an edge list, skipping duplicates and self-loops.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if any endpoint is `>= n`.
    pub fn from_edges<I>(name: impl Into<String>, n: usize, directed: bool, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(name, n, directed);
        for (i, j) in pairs {
            graph.add_edge(i, j)?;
        }
        Ok(graph)
    }

    #[must_use]
    pub fn id(&self) -> GraphId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn edges_count(&self) -> usize {
        self.m
    }

    /// Number of absent pairs (ordered pairs when directed).
    #[must_use]
    pub fn non_edges_count(&self) -> usize {
        self.possible_edges_count() - self.m
    }

    #[must_use]
    pub fn possible_edges_count(&self) -> usize {
        let ordered = self.n * self.n.saturating_sub(1);
        if self.is_directed() {
            ordered
        } else {
            ordered / 2
        }
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.adjacency.is_directed()
    }

    /// Counter bumped by every structural edit and every reset.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// An edge value with this graph's directedness.
    #[must_use]
    pub fn edge(&self, i: usize, j: usize) -> Edge {
        Edge::new(i, j, self.is_directed())
    }

    /// # Errors
    /// Returns `NodeOutOfRange` if `node >= size()`.
    pub fn check_node(&self, node: usize) -> Result<()> {
        if node < self.n {
            Ok(())
        } else {
            Err(ShieldError::NodeOutOfRange { node, size: self.n })
        }
    }

    /// # Errors
    /// Returns `DirectednessMismatch` or `NodeOutOfRange` for foreign edges.
    pub fn check_edge(&self, edge: &Edge) -> Result<()> {
        if edge.is_directed() != self.is_directed() {
            return Err(ShieldError::DirectednessMismatch);
        }
        self.check_node(edge.i())?;
        self.check_node(edge.j())
    }

    // --- Mutation ---

    /// Adds the edge `i -> j` (or `{i, j}`).
    ///
    /// Returns `Ok(false)` for self-loops and edges already present.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range; the graph is untouched.
    pub fn add_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        self.check_node(i)?;
        self.check_node(j)?;
        if i == j || self.adjacency.has_arc(i, j) {
            return Ok(false);
        }
        self.perform_add(i, j);
        if let Some(history) = self.history.as_mut() {
            history.push(Change::Addition { i, j });
        }
        let edge = self.edge(i, j);
        self.notify(&GraphEvent::Added { edge });
        Ok(true)
    }

    /// Removes the edge `i -> j` (or `{i, j}`).
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range; the graph is untouched.
    pub fn remove_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        self.check_node(i)?;
        self.check_node(j)?;
        if i == j || !self.adjacency.has_arc(i, j) {
            return Ok(false);
        }
        self.perform_remove(i, j);
        if let Some(history) = self.history.as_mut() {
            history.push(Change::Removal { i, j });
        }
        let edge = self.edge(i, j);
        self.notify(&GraphEvent::Removed { edge });
        Ok(true)
    }

    /// Toggles the presence of the edge.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range.
    pub fn swap_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        if self.contains_edge(i, j)? {
            self.remove_edge(i, j)
        } else {
            self.add_edge(i, j)
        }
    }

    /// # Errors
    /// Fails on foreign edges, see [`Graph::check_edge`].
    pub fn add(&mut self, edge: &Edge) -> Result<bool> {
        self.check_edge(edge)?;
        self.add_edge(edge.i(), edge.j())
    }

    /// # Errors
    /// Fails on foreign edges, see [`Graph::check_edge`].
    pub fn remove(&mut self, edge: &Edge) -> Result<bool> {
        self.check_edge(edge)?;
        self.remove_edge(edge.i(), edge.j())
    }

    /// # Errors
    /// Fails on foreign edges, see [`Graph::check_edge`].
    pub fn swap(&mut self, edge: &Edge) -> Result<bool> {
        self.check_edge(edge)?;
        self.swap_edge(edge.i(), edge.j())
    }

    /// Removes every edge touching `v`. Returns how many were removed.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if `v` is out of range.
    pub fn disconnect_node(&mut self, v: usize) -> Result<usize> {
        self.check_node(v)?;
        let mut removed = 0;
        for w in self.successors(v).sorted() {
            removed += usize::from(self.remove_edge(v, w)?);
        }
        if self.is_directed() {
            for w in self.predecessors(v).sorted() {
                removed += usize::from(self.remove_edge(w, v)?);
            }
        }
        Ok(removed)
    }

    fn perform_add(&mut self, i: usize, j: usize) {
        self.adjacency.link(i, j);
        self.m += 1;
        self.generation += 1;
    }

    fn perform_remove(&mut self, i: usize, j: usize) {
        self.adjacency.unlink(i, j);
        self.m -= 1;
        self.generation += 1;
    }

    // --- Queries ---

    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range.
    pub fn contains_edge(&self, i: usize, j: usize) -> Result<bool> {
        self.check_node(i)?;
        self.check_node(j)?;
        Ok(self.adjacency.has_arc(i, j))
    }

    /// # Errors
    /// Fails on foreign edges, see [`Graph::check_edge`].
    pub fn contains(&self, edge: &Edge) -> Result<bool> {
        self.check_edge(edge)?;
        Ok(self.adjacency.has_arc(edge.i(), edge.j()))
    }

    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range.
    pub fn contains_any_direction(&self, i: usize, j: usize) -> Result<bool> {
        Ok(self.contains_edge(i, j)? || self.contains_edge(j, i)?)
    }

    /// Unchecked arc test for callers that already validated both endpoints.
    pub(crate) fn has_arc(&self, i: usize, j: usize) -> bool {
        self.adjacency.has_arc(i, j)
    }

    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn successors(&self, i: usize) -> &NodeSet {
        self.adjacency.succs(i)
    }

    /// Same as `successors` for undirected graphs.
    ///
    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn predecessors(&self, i: usize) -> &NodeSet {
        self.adjacency.preds(i)
    }

    /// Successors and predecessors together.
    ///
    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn neighbors(&self, i: usize) -> Cow<'_, NodeSet> {
        match &self.adjacency {
            Adjacency::Symmetric { .. } => Cow::Borrowed(self.adjacency.succs(i)),
            Adjacency::Split { .. } => Cow::Owned(NodeSet::union(
                self.adjacency.succs(i),
                self.adjacency.preds(i),
            )),
        }
    }

    /// Nodes adjacent to both endpoints. Directed graphs take common
    /// successors plus common predecessors, so a node on a path `i -> k -> j`
    /// is not included.
    ///
    /// # Panics
    /// Panics if an endpoint is out of range.
    #[must_use]
    pub fn common_neighbors(&self, i: usize, j: usize) -> NodeSet {
        let mut common = NodeSet::intersection(self.adjacency.succs(i), self.adjacency.succs(j));
        if self.is_directed() {
            common.extend_from(&NodeSet::intersection(
                self.adjacency.preds(i),
                self.adjacency.preds(j),
            ));
        }
        common
    }

    /// Size of the intersection of both full neighbourhoods.
    ///
    /// # Panics
    /// Panics if an endpoint is out of range.
    #[must_use]
    pub fn common_neighbor_count(&self, i: usize, j: usize) -> usize {
        self.neighbors(i).intersection_len(&self.neighbors(j))
    }

    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn out_degree(&self, i: usize) -> usize {
        self.successors(i).len()
    }

    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn in_degree(&self, i: usize) -> usize {
        self.predecessors(i).len()
    }

    /// Out-degree, plus in-degree for directed graphs.
    ///
    /// # Panics
    /// Panics if `i >= size()`.
    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        if self.is_directed() {
            self.out_degree(i) + self.in_degree(i)
        } else {
            self.out_degree(i)
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_degree(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let total: usize = self.nodes().map(|i| self.degree(i)).sum();
        total as f64 / self.n as f64
    }

    pub fn nodes(&self) -> std::ops::Range<usize> {
        0..self.n
    }

    /// Present edges, each undirected edge once with `i < j`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let directed = self.is_directed();
        self.nodes().flat_map(move |i| {
            self.successors(i)
                .sorted()
                .into_iter()
                .filter(move |&j| directed || i < j)
                .map(move |j| Edge::new(i, j, directed))
        })
    }

    /// Every pair that could hold an edge, present or not.
    pub fn possible_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let directed = self.is_directed();
        let n = self.n;
        self.nodes().flat_map(move |i| {
            let start = if directed { 0 } else { i + 1 };
            (start..n)
                .filter(move |&j| j != i)
                .map(move |j| Edge::new(i, j, directed))
        })
    }

    /// Absent pairs in ascending order.
    pub fn non_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.possible_edges()
            .filter(move |e| !self.adjacency.has_arc(e.i(), e.j()))
    }

    /// Uniformly random present edge.
    pub fn random_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        let arcs: usize = self.nodes().map(|i| self.out_degree(i)).sum();
        if arcs == 0 {
            return None;
        }
        let mut r = rng.gen_range(0..arcs);
        for i in self.nodes() {
            let out = self.out_degree(i);
            if r < out {
                let j = self.successors(i).random(rng)?;
                return Some(self.edge(i, j));
            }
            r -= out;
        }
        None
    }

    /// Uniformly random absent pair, walking every node. Exact but `O(n^2)`.
    pub fn random_non_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        let slots: usize = self
            .nodes()
            .map(|i| self.n - 1 - self.out_degree(i))
            .sum();
        if self.n < 2 || slots == 0 {
            return None;
        }
        let mut r = rng.gen_range(0..slots);
        for i in self.nodes() {
            let free = self.n - 1 - self.out_degree(i);
            if r < free {
                let j = self
                    .nodes()
                    .filter(|&j| j != i && !self.has_arc(i, j))
                    .nth(r)?;
                return Some(self.edge(i, j));
            }
            r -= free;
        }
        None
    }

    /// Random absent pair by rejection sampling. Cheap on sparse graphs.
    pub fn random_non_edge_sparse<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        if self.non_edges_count() == 0 {
            return None;
        }
        loop {
            let i = rng.gen_range(0..self.n);
            let j = rng.gen_range(0..self.n);
            if i != j && !self.has_arc(i, j) {
                return Some(self.edge(i, j));
            }
        }
    }

    /// Edges touching `v`, both directions for directed graphs.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if `v` is out of range.
    pub fn incident_edges(&self, v: usize) -> Result<Vec<Edge>> {
        self.check_node(v)?;
        let mut edges = Vec::new();
        for w in self.neighbors(v).sorted() {
            if self.has_arc(v, w) {
                edges.push(self.edge(v, w));
            }
            if self.is_directed() && self.has_arc(w, v) {
                edges.push(self.edge(w, v));
            }
        }
        Ok(edges)
    }

    /// Edges with both endpoints in `nodes`.
    #[must_use]
    pub fn induced_edges(&self, nodes: &NodeSet) -> Vec<Edge> {
        let members: Vec<usize> = nodes.sorted().into_iter().filter(|&v| v < self.n).collect();
        let mut edges = Vec::new();
        for (pos, &a) in members.iter().enumerate() {
            for &b in members.iter().skip(pos + 1) {
                if self.has_arc(a, b) {
                    edges.push(self.edge(a, b));
                }
                if self.is_directed() && self.has_arc(b, a) {
                    edges.push(self.edge(b, a));
                }
            }
        }
        edges
    }

    /// Copy with directions dropped.
    #[must_use]
    pub fn undirected(&self) -> Graph {
        let mut res = Graph::new(self.name.clone(), self.n, false);
        for e in self.edges() {
            res.link_unchecked(e.i(), e.j());
        }
        res
    }

    /// Copy with `k` extra isolated nodes appended.
    #[must_use]
    pub fn with_extra_nodes(&self, k: usize) -> Graph {
        let mut res = Graph::new(self.name.clone(), self.n + k, self.is_directed());
        for e in self.edges() {
            res.link_unchecked(e.i(), e.j());
        }
        res
    }

    fn link_unchecked(&mut self, i: usize, j: usize) {
        if i != j && !self.adjacency.has_arc(i, j) {
            self.perform_add(i, j);
        }
    }

    /// Checks the adjacency mirror invariant and the edge count.
    ///
    /// # Errors
    /// Returns `StateCorrupted` describing the first violation found.
    pub fn verify_consistency(&self) -> Result<()> {
        if !self.adjacency.is_consistent() {
            return Err(ShieldError::StateCorrupted(format!(
                "{}: adjacency lists disagree",
                self.name
            )));
        }
        let arcs = self.adjacency.arc_count();
        if arcs != self.m {
            return Err(ShieldError::StateCorrupted(format!(
                "{}: edge count {} but {arcs} arcs stored",
                self.name, self.m
            )));
        }
        Ok(())
    }

    /// Same node count, directedness and edge set.
    #[must_use]
    pub fn same_structure(&self, other: &Graph) -> bool {
        self.n == other.n && self.m == other.m && self.adjacency == other.adjacency
    }

    // --- History ---

    /// Starts recording with a fresh, empty history.
    pub fn start_recording_history(&mut self) {
        self.history = Some(History::new());
        self.history_epoch += 1;
    }

    /// Stops recording and forgets the history.
    pub fn stop_recording_history(&mut self) {
        self.history = None;
    }

    #[must_use]
    pub fn is_recording_history(&self) -> bool {
        self.history.is_some()
    }

    /// Identifies the current recording; changes on every
    /// `start_recording_history`.
    #[must_use]
    pub fn history_epoch(&self) -> u64 {
        self.history_epoch
    }

    #[must_use]
    pub fn history_size(&self) -> usize {
        self.history.as_ref().map_or(0, History::len)
    }

    /// Edge touched by the most recent recorded change.
    #[must_use]
    pub fn last_change(&self) -> Option<Edge> {
        let directed = self.is_directed();
        self.history
            .as_ref()
            .and_then(History::last)
            .map(|c| c.edge(directed))
    }

    /// Edges touched by recorded changes, oldest first.
    #[must_use]
    pub fn changes(&self) -> Vec<Edge> {
        let directed = self.is_directed();
        self.history
            .as_ref()
            .map(|h| h.iter().map(|c| c.edge(directed)).collect())
            .unwrap_or_default()
    }

    /// Reverts every recorded change, newest first, then fires one reset
    /// notification. Recording stays active with an empty history.
    ///
    /// # Errors
    /// Returns `NoHistory` if not recording, or `StateCorrupted` if a record no
    /// longer matches the adjacency.
    pub fn reset_graph(&mut self) -> Result<usize> {
        let mut history = self.history.take().ok_or(ShieldError::NoHistory)?;
        let mut reverted = 0;
        let outcome = loop {
            let Some(change) = history.pop() else {
                break Ok(());
            };
            if let Err(e) = self.revert(change) {
                break Err(e);
            }
            reverted += 1;
        };
        self.history = Some(history);
        self.generation += 1;
        outcome?;
        debug!(graph = %self.name, reverted, "graph reset");
        self.notify(&GraphEvent::Reset);
        Ok(reverted)
    }

    /// Reverts the `k` most recent changes (fewer if the history is shorter),
    /// notifying observers of each one individually.
    ///
    /// # Errors
    /// Returns `NoHistory` if not recording, or `StateCorrupted` if a record no
    /// longer matches the adjacency.
    pub fn revert_changes(&mut self, k: usize) -> Result<usize> {
        let mut reverted = 0;
        while reverted < k {
            let history = self.history.as_mut().ok_or(ShieldError::NoHistory)?;
            let Some(change) = history.pop() else {
                break;
            };
            let event = self.revert(change)?;
            self.notify(&event);
            reverted += 1;
        }
        if self.history.is_none() {
            return Err(ShieldError::NoHistory);
        }
        trace!(graph = %self.name, reverted, "changes reverted");
        Ok(reverted)
    }

    fn revert(&mut self, change: Change) -> Result<GraphEvent> {
        match change {
            Change::Addition { i, j } => {
                if !self.adjacency.has_arc(i, j) {
                    return Err(self.corrupted(change));
                }
                self.perform_remove(i, j);
                Ok(GraphEvent::Removed { edge: self.edge(i, j) })
            }
            Change::Removal { i, j } => {
                if i == j || self.adjacency.has_arc(i, j) {
                    return Err(self.corrupted(change));
                }
                self.perform_add(i, j);
                Ok(GraphEvent::Added { edge: self.edge(i, j) })
            }
        }
    }

    fn corrupted(&self, change: Change) -> ShieldError {
        ShieldError::StateCorrupted(format!("{}: cannot revert {change:?}", self.name))
    }

    // --- Observers ---

    pub fn subscribe(&mut self, observer: Box<dyn GraphObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Detaches and returns the observer.
    pub fn unsubscribe(&mut self, id: ObserverId) -> Option<Box<dyn GraphObserver>> {
        let pos = self.observers.iter().position(|(oid, _)| *oid == id)?;
        Some(self.observers.remove(pos).1)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, event: &GraphEvent) {
        if self.observers.is_empty() {
            return;
        }
        // Observers only get a shared view, so none can subscribe while we iterate.
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in &mut observers {
            match event {
                GraphEvent::Added { edge } => observer.on_add(self, edge),
                GraphEvent::Removed { edge } => observer.on_remove(self, edge),
                GraphEvent::Reset => observer.on_reset(self),
            }
        }
        self.observers = observers;
    }
}

/// Copies structure only: no history, no observers, fresh identity.
impl Clone for Graph {
    fn clone(&self) -> Self {
        Self {
            id: GraphId::next(),
            name: self.name.clone(),
            n: self.n,
            m: self.m,
            adjacency: self.adjacency.clone(),
            history: None,
            history_epoch: 0,
            generation: 0,
            observers: Vec::new(),
            next_observer: 0,
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("n", &self.n)
            .field("m", &self.m)
            .field("directed", &self.is_directed())
            .field("history", &self.history_size())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directed = if self.is_directed() { ",directed" } else { "" };
        write!(f, "({},n={},m={}{directed})", self.name, self.n, self.m)
    }
}
