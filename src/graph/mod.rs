//! Graph model: insertion-ordered nodes and directed weighted edges.
//!
//! Node ids are assigned sequentially starting at 1 and are never reused or
//! reassigned within a session; a [`Graph::reset`] discards the whole model
//! and restarts the sequence. Parallel edges over the same `(from, to)` pair
//! are permitted and kept in insertion order; weight updates touch only the
//! first match.
//!
//! An adjacency index keyed by `from` backs [`Graph::outgoing`], so solver
//! runs cost O(V + E) instead of rescanning the edge list per step.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// Node identifier: sequential from 1 in creation order.
pub type NodeId = u32;

/// Edge identifier: sequential from 1 in creation order.
pub type EdgeId = u32;

/// A placed node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Sequential id, starting at 1.
    pub id: NodeId,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Display label; defaults to the letters `a`..`z` cycled by id.
    pub label: String,
}

impl Node {
    /// Euclidean distance to another node's position.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A directed weighted edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Sequential id, starting at 1.
    pub id: EdgeId,
    /// Source node id.
    pub from: NodeId,
    /// Target node id.
    pub to: NodeId,
    /// Non-negative finite weight.
    pub weight: f64,
}

/// Default display label for a node id: `a` for 1, `b` for 2, cycling after
/// `z`.
#[must_use]
pub fn default_label(id: NodeId) -> String {
    let offset = (id.saturating_sub(1) % 26) as u8;
    char::from(b'a' + offset).to_string()
}

/// Parse user-entered weight text into a valid edge weight.
///
/// Accepts anything `f64` parses, then applies the same validity rules as
/// [`Graph::set_edge_weight`]: the value must be finite and non-negative.
///
/// # Errors
///
/// Returns [`RouteError::InvalidWeight`] for unparseable text, negative
/// values, and non-finite values.
pub fn parse_weight(raw: &str) -> RouteResult<f64> {
    let weight: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RouteError::weight_parse(raw.trim()))?;
    check_weight(weight)?;
    Ok(weight)
}

/// Reject weights the model never stores: negative or non-finite.
fn check_weight(weight: f64) -> RouteResult<()> {
    if !weight.is_finite() {
        return Err(RouteError::non_finite_weight(weight));
    }
    if weight < 0.0 {
        return Err(RouteError::negative_weight(weight));
    }
    Ok(())
}

/// Insertion-ordered directed weighted graph.
///
/// The only shared mutable state in a session; solvers take it by shared
/// reference and never mutate it. There is no per-node or per-edge deletion,
/// only [`Graph::reset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in creation order; `nodes[i].id == i + 1`.
    nodes: Vec<Node>,
    /// Edges in creation order; `edges[i].id == i + 1`.
    edges: Vec<Edge>,
    /// Adjacency index: edge positions grouped by `from`, insertion order
    /// preserved per key. Derived state, rebuilt via
    /// [`Graph::rebuild_index`] after deserialization.
    #[serde(skip)]
    outgoing: IndexMap<NodeId, Vec<usize>>,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node at `(x, y)` with the next sequential id and an
    /// auto-generated label. O(1).
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        let id = self.next_node_id();
        self.add_labeled_node(x, y, default_label(id))
    }

    /// Append a node with an explicit display label. O(1).
    pub fn add_labeled_node(&mut self, x: f64, y: f64, label: impl Into<String>) -> NodeId {
        let id = self.next_node_id();
        self.nodes.push(Node {
            id,
            x,
            y,
            label: label.into(),
        });
        id
    }

    /// Append a directed edge with the Euclidean distance between the
    /// endpoint positions as its weight. O(1).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownNode`] if either endpoint id does not
    /// exist, or [`RouteError::InvalidWeight`] when the computed distance
    /// is not finite (extreme or non-finite positions); the graph is
    /// unchanged.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> RouteResult<EdgeId> {
        let weight = {
            let a = self.node(from).ok_or(RouteError::UnknownNode { node_id: from })?;
            let b = self.node(to).ok_or(RouteError::UnknownNode { node_id: to })?;
            a.distance_to(b)
        };
        check_weight(weight)?;
        Ok(self.push_edge(from, to, weight))
    }

    /// Append a directed edge with an explicit weight (bulk instance
    /// loading). O(1).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownNode`] for a missing endpoint or
    /// [`RouteError::InvalidWeight`] for a negative or non-finite weight;
    /// the graph is unchanged on failure.
    pub fn add_weighted_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> RouteResult<EdgeId> {
        check_weight(weight)?;
        if !self.contains_node(from) {
            return Err(RouteError::UnknownNode { node_id: from });
        }
        if !self.contains_node(to) {
            return Err(RouteError::UnknownNode { node_id: to });
        }
        Ok(self.push_edge(from, to, weight))
    }

    /// Overwrite the weight of the **first** edge in insertion order
    /// matching `(from, to)`. Parallel duplicates beyond the first are
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidWeight`] for a negative or non-finite weight,
    /// [`RouteError::UnknownNode`] for a missing endpoint id,
    /// [`RouteError::UnknownEdge`] when both nodes exist but no edge joins
    /// them. The graph is unchanged on any failure.
    pub fn set_edge_weight(&mut self, from: NodeId, to: NodeId, weight: f64) -> RouteResult<()> {
        check_weight(weight)?;
        if !self.contains_node(from) {
            return Err(RouteError::UnknownNode { node_id: from });
        }
        if !self.contains_node(to) {
            return Err(RouteError::UnknownNode { node_id: to });
        }

        let pos = self
            .outgoing
            .get(&from)
            .and_then(|positions| {
                positions
                    .iter()
                    .copied()
                    .find(|&pos| self.edges.get(pos).is_some_and(|e| e.to == to))
            })
            .ok_or(RouteError::UnknownEdge { from, to })?;

        match self.edges.get_mut(pos) {
            Some(edge) => {
                edge.weight = weight;
                Ok(())
            }
            None => Err(RouteError::internal(format!(
                "adjacency index references missing edge slot {pos}"
            ))),
        }
    }

    /// All edges leaving `node`, in insertion order. Unknown ids yield an
    /// empty iterator.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|&pos| self.edges.get(pos))
    }

    /// Clear nodes, edges, and the adjacency index atomically. The id
    /// sequences restart from 1.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
    }

    /// Look up a node by id. O(1): ids are dense, so the id maps straight
    /// to its slot.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.checked_sub(1)? as usize)
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in creation order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rebuild the adjacency index from the edge list. Call after
    /// deserializing a graph; the index is skipped during serialization.
    pub fn rebuild_index(&mut self) {
        self.outgoing.clear();
        for (pos, edge) in self.edges.iter().enumerate() {
            self.outgoing.entry(edge.from).or_default().push(pos);
        }
    }

    /// Verify the model invariants: sequential ids, edge endpoints exist,
    /// weights valid, adjacency index consistent with the edge list.
    ///
    /// Solvers run this before traversal so an inconsistent model fails
    /// fast instead of producing a wrong route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Internal`] naming the first violated
    /// invariant.
    pub fn check_invariants(&self) -> RouteResult<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            let expected = i as NodeId + 1;
            if node.id != expected {
                return Err(RouteError::internal(format!(
                    "node id sequence broken: slot {i} holds id {}, expected {expected}",
                    node.id
                )));
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            let expected = i as EdgeId + 1;
            if edge.id != expected {
                return Err(RouteError::internal(format!(
                    "edge id sequence broken: slot {i} holds id {}, expected {expected}",
                    edge.id
                )));
            }
            if !self.contains_node(edge.from) {
                return Err(RouteError::internal(format!(
                    "edge {} references missing source node {}",
                    edge.id, edge.from
                )));
            }
            if !self.contains_node(edge.to) {
                return Err(RouteError::internal(format!(
                    "edge {} references missing target node {}",
                    edge.id, edge.to
                )));
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(RouteError::internal(format!(
                    "edge {} carries invalid weight {}",
                    edge.id, edge.weight
                )));
            }
        }

        let mut indexed = 0usize;
        for (&from, positions) in &self.outgoing {
            for &pos in positions {
                let Some(edge) = self.edges.get(pos) else {
                    return Err(RouteError::internal(format!(
                        "adjacency index for node {from} references missing edge slot {pos}"
                    )));
                };
                if edge.from != from {
                    return Err(RouteError::internal(format!(
                        "adjacency index for node {from} holds edge {} from node {}",
                        edge.id, edge.from
                    )));
                }
                indexed += 1;
            }
        }
        if indexed != self.edges.len() {
            return Err(RouteError::internal(format!(
                "adjacency index covers {indexed} edges, edge list holds {}",
                self.edges.len()
            )));
        }

        Ok(())
    }

    fn next_node_id(&self) -> NodeId {
        self.nodes.len() as NodeId + 1
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> EdgeId {
        let id = self.edges.len() as EdgeId + 1;
        let pos = self.edges.len();
        self.edges.push(Edge {
            id,
            from,
            to,
            weight,
        });
        self.outgoing.entry(from).or_default().push(pos);
        id
    }
}

// =============================================================================
// Tests
// =============================================================================
