//! Command-driven session over one graph.
//!
//! Presentation shells never touch the model directly: they submit a
//! [`Command`] and receive a [`CommandOutput`] or a typed failure. Accepted
//! and rejected submissions land in an append-only journal entry carrying
//! blake3 digests of the graph before and after, so "a rejected command
//! changed nothing" is checkable, not assumed.
//!
//! The journal is observability, not persistence: it exports to JSON for
//! inspection and is discarded with the session.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{RouteError, RouteResult};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::solver::{timed_solve, timed_solve_multi_start, SolveReport};

// =============================================================================
// Commands & Outputs
// =============================================================================

/// One mutation or solver request against the session graph.
///
/// Serialized variant tags match the [`std::fmt::Display`] names, so journal
/// JSON reads `"command": { "solve": { "start": 3 } }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Place a node at a position; the model assigns the next id.
    AddNode { x: f64, y: f64 },
    /// Connect two existing nodes; weight defaults to their distance.
    AddEdge { from: NodeId, to: NodeId },
    /// Overwrite the first matching edge's weight.
    SetWeight { from: NodeId, to: NodeId, weight: f64 },
    /// Nearest-neighbor walk from one start node.
    Solve { start: NodeId },
    /// Nearest-neighbor walk from every node, keeping the best.
    SolveMultiStart,
    /// Discard the whole graph.
    Reset,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddNode { .. } => write!(f, "add-node"),
            Self::AddEdge { .. } => write!(f, "add-edge"),
            Self::SetWeight { .. } => write!(f, "set-weight"),
            Self::Solve { .. } => write!(f, "solve"),
            Self::SolveMultiStart => write!(f, "solve-multi-start"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// Successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutput {
    /// Node created with this id.
    NodeAdded { node_id: NodeId },
    /// Edge created with this id.
    EdgeAdded { edge_id: EdgeId },
    /// Weight overwritten on the first matching edge.
    WeightUpdated,
    /// Solver finished; the report carries the route and wall-clock timing.
    Solved { report: SolveReport },
    /// Graph discarded; id sequences restart.
    Cleared,
}

// =============================================================================
// Journal
// =============================================================================

/// How a journaled command ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// The command succeeded with this output.
    Accepted(CommandOutput),
    /// The command was refused; the graph is untouched.
    Rejected { reason: String },
}

/// One journaled command with state digests and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Monotonic counter, starting at 1.
    pub step_id: u64,
    /// The submitted command, echoed for replayability.
    pub command: Command,
    /// Acceptance or rejection, with the output or reason.
    pub outcome: CommandOutcome,
    /// Headline numbers for this entry (route length, stop count).
    pub metrics: IndexMap<String, f64>,
    /// Wall-clock cost of the dispatch in microseconds.
    pub compute_duration_us: u64,
    /// Blake3 digest of the graph before dispatch.
    pub graph_digest_before: [u8; 32],
    /// Blake3 digest of the graph after dispatch.
    pub graph_digest_after: [u8; 32],
}

impl CommandEntry {
    /// Create an entry; metrics start empty.
    #[must_use]
    pub fn new(
        step_id: u64,
        command: Command,
        outcome: CommandOutcome,
        graph_digest_before: [u8; 32],
        graph_digest_after: [u8; 32],
    ) -> Self {
        Self {
            step_id,
            command,
            outcome,
            metrics: IndexMap::new(),
            compute_duration_us: 0,
            graph_digest_before,
            graph_digest_after,
        }
    }

    /// Add a headline metric.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Set the dispatch duration.
    #[must_use]
    pub const fn with_duration(mut self, duration_us: u64) -> Self {
        self.compute_duration_us = duration_us;
        self
    }

    /// Whether the graph digest is identical before and after.
    #[must_use]
    pub fn state_unchanged(&self) -> bool {
        self.graph_digest_before == self.graph_digest_after
    }

    /// Whether this entry records a rejection.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self.outcome, CommandOutcome::Rejected { .. })
    }
}

/// Blake3 digest of the graph's serialized content.
///
/// Nodes and edges feed the digest; the derived adjacency index does not,
/// so rebuilding it never changes the fingerprint.
///
/// # Errors
///
/// Returns [`RouteError::Serialization`] if the graph cannot be encoded.
pub fn fingerprint(graph: &Graph) -> RouteResult<[u8; 32]> {
    let bytes = bincode::serialize(graph)
        .map_err(|e| RouteError::serialization(format!("Graph fingerprint: {e}")))?;
    Ok(*blake3::hash(&bytes).as_bytes())
}

// =============================================================================
// Session
// =============================================================================

/// One graph plus the journal of every command applied to it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    graph: Graph,
    journal: Vec<CommandEntry>,
    next_step_id: u64,
}

impl Session {
    /// Start with an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            journal: Vec::new(),
            next_step_id: 1,
        }
    }

    /// Start from a prepared graph (instance bulk load).
    #[must_use]
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph,
            journal: Vec::new(),
            next_step_id: 1,
        }
    }

    /// Swap in a prepared graph, keeping the journal.
    ///
    /// Bulk loads sit outside the command vocabulary, so they do not
    /// produce a journal entry of their own.
    pub fn replace_graph(&mut self, graph: Graph) {
        self.graph = graph;
    }

    /// Validate, dispatch, and journal one command.
    ///
    /// Boundary rejections (unknown ids, invalid weights) are journaled
    /// with the refusal reason and matching before/after digests, and the
    /// session stays usable. Internal failures propagate without a journal
    /// entry.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] the underlying operation produces, plus
    /// [`RouteError::Serialization`] if the graph digest cannot be taken.
    pub fn apply(&mut self, command: Command) -> RouteResult<CommandOutput> {
        let digest_before = fingerprint(&self.graph)?;
        let started = Instant::now();
        let result = self.dispatch(command);
        let duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let digest_after = fingerprint(&self.graph)?;

        let outcome = match &result {
            Ok(output) => CommandOutcome::Accepted(output.clone()),
            Err(error) if error.is_rejection() => CommandOutcome::Rejected {
                reason: error.to_string(),
            },
            // Not a rejection: the model state can no longer be trusted.
            Err(_) => return result,
        };

        let mut entry = CommandEntry::new(
            self.next_step_id,
            command,
            outcome,
            digest_before,
            digest_after,
        )
        .with_duration(duration_us);
        if let Ok(CommandOutput::Solved { report }) = &result {
            entry = entry
                .with_metric("route_length", report.route.length)
                .with_metric("route_stops", report.route.path.len() as f64);
        }

        self.next_step_id += 1;
        self.journal.push(entry);
        result
    }

    fn dispatch(&mut self, command: Command) -> RouteResult<CommandOutput> {
        match command {
            Command::AddNode { x, y } => Ok(CommandOutput::NodeAdded {
                node_id: self.graph.add_node(x, y),
            }),
            Command::AddEdge { from, to } => Ok(CommandOutput::EdgeAdded {
                edge_id: self.graph.add_edge(from, to)?,
            }),
            Command::SetWeight { from, to, weight } => {
                self.graph.set_edge_weight(from, to, weight)?;
                Ok(CommandOutput::WeightUpdated)
            }
            Command::Solve { start } => Ok(CommandOutput::Solved {
                report: timed_solve(&self.graph, start)?,
            }),
            Command::SolveMultiStart => Ok(CommandOutput::Solved {
                report: timed_solve_multi_start(&self.graph)?,
            }),
            Command::Reset => {
                self.graph.reset();
                Ok(CommandOutput::Cleared)
            }
        }
    }

    /// Read-only view of the graph for rendering.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// All journaled entries in submission order.
    #[must_use]
    pub fn journal(&self) -> &[CommandEntry] {
        &self.journal
    }

    /// Drop the journal; the graph is untouched.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Export the journal as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Serialization`] if encoding fails.
    pub fn export_journal_json(&self) -> RouteResult<String> {
        serde_json::to_string_pretty(&self.journal)
            .map_err(|e| RouteError::serialization(format!("Journal JSON export: {e}")))
    }

    /// Export the journal as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Serialization`] if encoding fails.
    pub fn export_journal_json_compact(&self) -> RouteResult<String> {
        serde_json::to_string(&self.journal)
            .map_err(|e| RouteError::serialization(format!("Journal JSON export: {e}")))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_triangle() -> Session {
        let mut session = Session::new();
        for _ in 0..3 {
            session
                .apply(Command::AddNode { x: 0.0, y: 0.0 })
                .expect("add node");
        }
        session
            .apply(Command::AddEdge { from: 1, to: 2 })
            .expect("edge");
        session
            .apply(Command::AddEdge { from: 2, to: 3 })
            .expect("edge");
        session
            .apply(Command::AddEdge { from: 3, to: 1 })
            .expect("edge");
        session
    }

    // =========================================================================
    // Command dispatch
    // =========================================================================

    #[test]
    fn test_add_node_returns_sequential_ids() {
        let mut session = Session::new();
        let first = session
            .apply(Command::AddNode { x: 1.0, y: 2.0 })
            .expect("add");
        let second = session
            .apply(Command::AddNode { x: 3.0, y: 4.0 })
            .expect("add");
        assert_eq!(first, CommandOutput::NodeAdded { node_id: 1 });
        assert_eq!(second, CommandOutput::NodeAdded { node_id: 2 });
        assert_eq!(session.graph().node_count(), 2);
    }

    #[test]
    fn test_add_edge_unknown_node_rejected() {
        let mut session = Session::new();
        session
            .apply(Command::AddNode { x: 0.0, y: 0.0 })
            .expect("add");
        let result = session.apply(Command::AddEdge { from: 1, to: 9 });
        assert!(matches!(result, Err(RouteError::UnknownNode { node_id: 9 })));
        assert_eq!(session.graph().edge_count(), 0);
    }

    #[test]
    fn test_add_edge_overflowing_distance_rejected() {
        // Nodes this far apart would give the connecting edge an infinite
        // default weight; the command is refused instead of stored.
        let mut session = Session::new();
        session
            .apply(Command::AddNode { x: 1e200, y: 0.0 })
            .expect("add");
        session
            .apply(Command::AddNode { x: -1e200, y: 0.0 })
            .expect("add");

        let result = session.apply(Command::AddEdge { from: 1, to: 2 });
        assert!(matches!(result, Err(RouteError::InvalidWeight { .. })));
        assert_eq!(session.graph().edge_count(), 0);

        let entry = session.journal().last().expect("entry");
        assert!(entry.is_rejection());
        assert!(entry.state_unchanged());

        // The model stays solvable after the refusal.
        let output = session.apply(Command::Solve { start: 1 }).expect("solve");
        match output {
            CommandOutput::Solved { report } => assert_eq!(report.route.path, vec![1]),
            other => panic!("expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_set_weight_roundtrip() {
        let mut session = session_with_triangle();
        session
            .apply(Command::SetWeight {
                from: 1,
                to: 2,
                weight: 12.5,
            })
            .expect("set weight");
        let weight = session
            .graph()
            .outgoing(1)
            .next()
            .map(|e| e.weight)
            .expect("edge present");
        assert!((weight - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_solve_reports_route_and_timing() {
        let mut session = session_with_triangle();
        let output = session.apply(Command::Solve { start: 1 }).expect("solve");
        match output {
            CommandOutput::Solved { report } => {
                assert_eq!(report.route.path, vec![1, 2, 3, 1]);
                assert!(report.elapsed_seconds() >= 0.0);
            }
            other => panic!("expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_start_on_tiny_graph_is_noop() {
        let mut session = Session::new();
        session
            .apply(Command::AddNode { x: 0.0, y: 0.0 })
            .expect("add");
        let output = session.apply(Command::SolveMultiStart).expect("sweep");
        match output {
            CommandOutput::Solved { report } => assert!(report.route.is_empty()),
            other => panic!("expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_restarts_node_ids() {
        let mut session = session_with_triangle();
        session.apply(Command::Reset).expect("reset");
        assert!(session.graph().is_empty());
        let output = session
            .apply(Command::AddNode { x: 5.0, y: 5.0 })
            .expect("add");
        assert_eq!(output, CommandOutput::NodeAdded { node_id: 1 });
    }

    // =========================================================================
    // Journal
    // =========================================================================

    #[test]
    fn test_journal_records_every_submission() {
        let mut session = session_with_triangle();
        let before = session.journal().len();
        let _ = session.apply(Command::SetWeight {
            from: 1,
            to: 2,
            weight: -1.0,
        });
        session.apply(Command::Solve { start: 1 }).expect("solve");
        assert_eq!(session.journal().len(), before + 2);
    }

    #[test]
    fn test_step_ids_are_monotonic_from_one() {
        let session = session_with_triangle();
        let ids: Vec<u64> = session.journal().iter().map(|e| e.step_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_rejected_weight_leaves_digest_unchanged() {
        let mut session = session_with_triangle();
        let result = session.apply(Command::SetWeight {
            from: 1,
            to: 2,
            weight: -3.0,
        });
        assert!(matches!(result, Err(RouteError::InvalidWeight { .. })));

        let entry = session.journal().last().expect("entry");
        assert!(entry.is_rejection());
        assert!(entry.state_unchanged());
    }

    #[test]
    fn test_accepted_mutation_changes_digest() {
        let mut session = Session::new();
        session
            .apply(Command::AddNode { x: 1.0, y: 1.0 })
            .expect("add");
        let entry = session.journal().last().expect("entry");
        assert!(!entry.is_rejection());
        assert!(!entry.state_unchanged());
    }

    #[test]
    fn test_internal_failure_bypasses_journal() {
        // A graph deserialized without rebuilding its adjacency index fails
        // the invariant check inside solve. That failure is not a command
        // rejection and must not read like one in the journal.
        let broken: Graph = serde_json::from_str(
            r#"{"nodes":[{"id":1,"x":0.0,"y":0.0,"label":"a"},
                         {"id":2,"x":1.0,"y":0.0,"label":"b"}],
                "edges":[{"id":1,"from":1,"to":2,"weight":1.0}]}"#,
        )
        .expect("graph json");
        let mut session = Session::new();
        session.replace_graph(broken);

        let result = session.apply(Command::Solve { start: 1 });
        assert!(matches!(result, Err(RouteError::Internal { .. })));
        assert!(session.journal().is_empty());
    }

    #[test]
    fn test_solve_entry_carries_metrics() {
        let mut session = session_with_triangle();
        session.apply(Command::Solve { start: 1 }).expect("solve");
        let entry = session.journal().last().expect("entry");
        assert!(entry.metrics.contains_key("route_length"));
        assert!(entry.metrics.contains_key("route_stops"));
        assert!(entry.state_unchanged(), "solving never mutates the graph");
    }

    #[test]
    fn test_journal_export_roundtrip() {
        let mut session = session_with_triangle();
        session.apply(Command::Solve { start: 2 }).expect("solve");

        let json = session.export_journal_json().expect("export");
        assert!(json.contains("\"step_id\""));
        assert!(json.contains("solve"));

        let parsed: Vec<CommandEntry> = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.len(), session.journal().len());
        assert_eq!(parsed.last(), session.journal().last());
    }

    #[test]
    fn test_compact_export_is_single_line() {
        let mut session = Session::new();
        session
            .apply(Command::AddNode { x: 0.0, y: 0.0 })
            .expect("add");
        let compact = session.export_journal_json_compact().expect("export");
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_clear_journal_keeps_graph() {
        let mut session = session_with_triangle();
        session.clear_journal();
        assert!(session.journal().is_empty());
        assert_eq!(session.graph().node_count(), 3);
    }

    #[test]
    fn test_replace_graph_skips_journal() {
        let mut session = Session::new();
        let mut graph = Graph::new();
        graph.add_node(1.0, 1.0);
        graph.add_node(2.0, 2.0);
        session.replace_graph(graph);
        assert_eq!(session.graph().node_count(), 2);
        assert!(session.journal().is_empty());
    }

    // =========================================================================
    // Fingerprints
    // =========================================================================

    #[test]
    fn test_fingerprint_is_deterministic() {
        let mut a = Graph::new();
        a.add_node(1.0, 2.0);
        let mut b = Graph::new();
        b.add_node(1.0, 2.0);
        assert_eq!(fingerprint(&a).expect("digest"), fingerprint(&b).expect("digest"));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut g = Graph::new();
        g.add_node(1.0, 2.0);
        let before = fingerprint(&g).expect("digest");
        g.add_node(3.0, 4.0);
        assert_ne!(before, fingerprint(&g).expect("digest"));
    }

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn test_command_display_names() {
        assert_eq!(Command::AddNode { x: 0.0, y: 0.0 }.to_string(), "add-node");
        assert_eq!(Command::AddEdge { from: 1, to: 2 }.to_string(), "add-edge");
        assert_eq!(
            Command::SetWeight {
                from: 1,
                to: 2,
                weight: 1.0
            }
            .to_string(),
            "set-weight"
        );
        assert_eq!(Command::Solve { start: 1 }.to_string(), "solve");
        assert_eq!(Command::SolveMultiStart.to_string(), "solve-multi-start");
        assert_eq!(Command::Reset.to_string(), "reset");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_journal_length_tracks_submissions(xs in proptest::collection::vec((0.0f64..100.0, 0.0f64..100.0), 1..16)) {
            let mut session = Session::new();
            for (x, y) in &xs {
                session.apply(Command::AddNode { x: *x, y: *y }).expect("add");
            }
            prop_assert_eq!(session.journal().len(), xs.len());
        }

        #[test]
        fn prop_rejections_never_change_digest(weight in -100.0f64..100.0) {
            let mut session = Session::new();
            session.apply(Command::AddNode { x: 0.0, y: 0.0 }).expect("add");
            session.apply(Command::AddNode { x: 3.0, y: 4.0 }).expect("add");
            session.apply(Command::AddEdge { from: 1, to: 2 }).expect("edge");

            let result = session.apply(Command::SetWeight { from: 1, to: 2, weight });
            let entry = session.journal().last().expect("entry");
            if result.is_err() {
                prop_assert!(entry.state_unchanged());
            } else {
                prop_assert!(weight >= 0.0);
            }
        }

        #[test]
        fn prop_solve_never_mutates(start in 1u32..=4) {
            let mut session = Session::new();
            for i in 0..4u32 {
                session.apply(Command::AddNode { x: f64::from(i), y: 0.0 }).expect("add");
            }
            session.apply(Command::AddEdge { from: 1, to: 2 }).expect("edge");
            session.apply(Command::AddEdge { from: 2, to: 3 }).expect("edge");

            session.apply(Command::Solve { start }).expect("solve");
            let entry = session.journal().last().expect("entry");
            prop_assert!(entry.state_unchanged());
        }
    }
}
