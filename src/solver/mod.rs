//! Nearest-neighbor route construction and the multi-start sweep.
//!
//! Both entry points are pure functions of the graph snapshot: no state
//! survives between calls and the graph is never mutated. Results are
//! best-effort heuristics; a returned route may be open (no edge led back
//! to the start) or partial (a dead end stopped the walk early), and
//! neither case is an error.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{RouteError, RouteResult};
use crate::graph::{Edge, Graph, NodeId};

/// A traversal result: node ids in visit order plus the total weight.
///
/// The start node appears again as the final element when the walk closed
/// back into a cycle. An empty route is the documented no-op for graphs
/// with fewer than two nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Node ids in visit order; first element is the start.
    pub path: Vec<NodeId>,
    /// Sum of traversed edge weights.
    pub length: f64,
}

impl Route {
    /// The no-op route: empty path, zero length.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the no-op route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether the walk returned to its start node.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.path.len() >= 2 && self.path.first() == self.path.last()
    }

    /// Number of distinct nodes on the route.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        if self.is_closed() {
            self.path.len() - 1
        } else {
            self.path.len()
        }
    }

    /// Whether the route reached every node of an `node_count`-node graph.
    #[must_use]
    pub fn visits_all(&self, node_count: usize) -> bool {
        self.visited_count() == node_count
    }
}

/// Outcome of a timed solver run: the route plus its wall-clock duration.
///
/// The duration is an out-of-band measurement for display; it is not part
/// of the algorithm's semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// The computed route.
    pub route: Route,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl SolveReport {
    /// Elapsed wall-clock time in seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Greedy nearest-neighbor walk from `start`.
///
/// Repeatedly follows the cheapest outgoing edge to an unvisited node; ties
/// are broken by the first such edge in insertion order. When no candidate
/// remains the walk stops (open path). Afterwards, the first edge leading
/// from the final node back to `start`, if any, closes the cycle.
///
/// Graphs with fewer than two nodes yield the empty route as a no-op, and
/// the start id is not validated in that case.
///
/// # Errors
///
/// [`RouteError::UnknownNode`] when the graph has two or more nodes but
/// `start` is not one of them; [`RouteError::Internal`] when the model
/// fails its invariant check (the run aborts rather than producing a wrong
/// route).
pub fn solve(graph: &Graph, start: NodeId) -> RouteResult<Route> {
    graph.check_invariants()?;
    if graph.node_count() < 2 {
        return Ok(Route::empty());
    }
    if !graph.contains_node(start) {
        return Err(RouteError::UnknownNode { node_id: start });
    }
    Ok(nearest_neighbor_from(graph, start))
}

/// Run [`solve`] once per node in insertion order and keep the shortest
/// result; ties go to the earliest-evaluated start.
///
/// This is V independent greedy runs over a read-only graph, so the cost is
/// O(V·(V + E)). It improves on a single run but carries no optimality
/// guarantee. Graphs with fewer than two nodes yield the empty route.
///
/// # Errors
///
/// [`RouteError::Internal`] when the model fails its invariant check.
pub fn solve_multi_start(graph: &Graph) -> RouteResult<Route> {
    graph.check_invariants()?;
    if graph.node_count() < 2 {
        return Ok(Route::empty());
    }

    let mut best: Option<Route> = None;
    for node in graph.nodes() {
        let candidate = nearest_neighbor_from(graph, node.id);
        let improved = match &best {
            Some(current) => candidate.length < current.length,
            None => true,
        };
        if improved {
            best = Some(candidate);
        }
    }

    best.ok_or_else(|| {
        RouteError::internal("multi-start sweep over a populated graph produced no candidate")
    })
}

/// [`solve`] with wall-clock timing for display.
///
/// # Errors
///
/// Same as [`solve`].
pub fn timed_solve(graph: &Graph, start: NodeId) -> RouteResult<SolveReport> {
    let started = Instant::now();
    let route = solve(graph, start)?;
    Ok(SolveReport {
        route,
        elapsed: started.elapsed(),
    })
}

/// [`solve_multi_start`] with wall-clock timing for display.
///
/// # Errors
///
/// Same as [`solve_multi_start`].
pub fn timed_solve_multi_start(graph: &Graph) -> RouteResult<SolveReport> {
    let started = Instant::now();
    let route = solve_multi_start(graph)?;
    Ok(SolveReport {
        route,
        elapsed: started.elapsed(),
    })
}

/// The greedy walk itself. Callers have already validated the graph and
/// the start id.
fn nearest_neighbor_from(graph: &Graph, start: NodeId) -> Route {
    let node_count = graph.node_count();
    let mut visited = vec![false; node_count + 1];
    let mut path = Vec::with_capacity(node_count + 1);
    let mut total = 0.0;
    let mut current = start;

    visited[start as usize] = true;
    path.push(start);

    for _ in 1..node_count {
        // First-minimum selection: strict `<` keeps the earliest of equal
        // candidates in outgoing (insertion) order.
        let mut best: Option<&Edge> = None;
        for edge in graph.outgoing(current) {
            if visited[edge.to as usize] {
                continue;
            }
            let better = match best {
                Some(chosen) => edge.weight < chosen.weight,
                None => true,
            };
            if better {
                best = Some(edge);
            }
        }

        let Some(edge) = best else {
            break;
        };
        visited[edge.to as usize] = true;
        path.push(edge.to);
        total += edge.weight;
        current = edge.to;
    }

    // Close the cycle with the first returning edge, if any. This also
    // applies when the loop made no move and a self-loop sits on the start.
    if let Some(back) = graph.outgoing(current).find(|e| e.to == start) {
        path.push(start);
        total += back.weight;
    }

    Route {
        path,
        length: total,
    }
}

// =============================================================================
// Tests
// =============================================================================



#[cfg(test)]
mod mutation_tests {
    use super::*;

    // Mutation test: tie-breaking actually selects the FIRST minimal edge in
    // outgoing order, not the last or an arbitrary one.
    #[test]
    fn test_equal_weights_take_earlier_insertion() {
        let mut g = Graph::new();
        g.add_node(0.0, 0.0);
        g.add_node(1.0, 0.0);
        g.add_node(2.0, 0.0);
        g.add_weighted_edge(1, 2, 5.0).expect("edge");
        g.add_weighted_edge(1, 3, 5.0).expect("edge");

        let route = solve(&g, 1).expect("solve");
        assert_eq!(route.path.get(1), Some(&2), "first of the equal candidates");
    }

    // Mutation test: cycle closing actually uses the FIRST returning edge's
    // weight, not the cheapest one.
    #[test]
    fn test_closing_uses_first_returning_edge_not_cheapest() {
        let mut g = Graph::new();
        g.add_node(0.0, 0.0);
        g.add_node(1.0, 0.0);
        g.add_weighted_edge(1, 2, 1.0).expect("edge");
        g.add_weighted_edge(2, 1, 7.0).expect("edge");
        g.add_weighted_edge(2, 1, 2.0).expect("cheaper duplicate");

        let route = solve(&g, 1).expect("solve");
        assert_eq!(route.path, vec![1, 2, 1]);
        assert!((route.length - 8.0).abs() < 1e-9, "1 + first returning 7");
    }

    // Mutation test: duplicate outgoing edges actually compete on weight, so
    // a cheaper duplicate added later wins the move.
    #[test]
    fn test_cheaper_duplicate_wins_selection() {
        let mut g = Graph::new();
        g.add_node(0.0, 0.0);
        g.add_node(1.0, 0.0);
        g.add_weighted_edge(1, 2, 5.0).expect("edge");
        g.add_weighted_edge(1, 2, 3.0).expect("cheaper duplicate");

        let route = solve(&g, 1).expect("solve");
        assert_eq!(route.path, vec![1, 2]);
        assert!((route.length - 3.0).abs() < 1e-9);
    }

    // Mutation test: the sweep actually keeps the earliest best rather than
    // overwriting on equal lengths.
    #[test]
    fn test_sweep_keeps_earliest_on_equal_lengths() {
        let mut g = Graph::new();
        g.add_node(0.0, 0.0);
        g.add_node(1.0, 0.0);
        g.add_weighted_edge(1, 2, 4.0).expect("edge");
        g.add_weighted_edge(2, 1, 4.0).expect("edge");

        let best = solve_multi_start(&g).expect("sweep");
        assert_eq!(best.path, vec![1, 2, 1], "starts 1 and 2 tie at 8; start 1 evaluated first");
    }
}
