//! Route TUI application state and key handling.
//!
//! All interaction funnels through the command session: keys build
//! [`Command`]s, rejections land in the status line, and the journal keeps
//! its digest trail. Terminal I/O is handled by the binary.
//!
//! # YAML-First Architecture
//!
//! The TUI can start from an instance file:
//!
//! ```bash
//! cargo run --features tui --bin route-tui -- demos/classroom_graph.yaml
//! ```
//!
//! The 'd' key loads the bundled classroom instance without touching the
//! filesystem; 'j' (journal export) is handled by the binary.

use crossterm::event::KeyCode;
use std::path::Path;

use crate::error::RouteResult;
use crate::graph::{parse_weight, Graph, NodeId};
use crate::instance::{classroom_example, GraphInstance, InstanceMeta};
use crate::session::{Command, CommandOutput, Session};
use crate::solver::SolveReport;

/// World width of the placement canvas.
pub const CANVAS_WIDTH: f64 = 400.0;
/// World height of the placement canvas.
pub const CANVAS_HEIGHT: f64 = 300.0;
/// Cursor movement per arrow key press.
pub const CURSOR_STEP: f64 = 10.0;

/// Application state for the route TUI.
pub struct RouteApp {
    /// The command session owning the graph and journal.
    pub session: Session,
    /// Placement cursor in world coordinates.
    pub cursor: (f64, f64),
    /// Node marked as the source for the next edge or weight edit.
    pub marked: Option<NodeId>,
    /// Weight-edit text buffer; input mode is active while this is `Some`.
    pub input: Option<String>,
    /// The `(from, to)` pair the weight edit targets.
    pub weight_target: Option<(NodeId, NodeId)>,
    /// Latest solver report, if any.
    pub last_report: Option<SolveReport>,
    /// Metadata of the loaded instance, if any.
    pub meta: Option<InstanceMeta>,
    /// One-line status message.
    pub status: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl Default for RouteApp {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteApp {
    /// Create an application with an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            cursor: (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            marked: None,
            input: None,
            weight_target: None,
            last_report: None,
            meta: None,
            status: "ready".to_string(),
            should_quit: false,
        }
    }

    /// Create an application preloaded with an instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance fails validation or replay.
    pub fn with_instance(instance: GraphInstance) -> RouteResult<Self> {
        let graph = instance.build_graph()?;
        let mut app = Self::new();
        app.session.replace_graph(graph);
        app.status = format!("loaded instance {}", instance.meta.id);
        app.meta = Some(instance.meta);
        Ok(app)
    }

    /// Create an application from an instance YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the instance is
    /// invalid.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> RouteResult<Self> {
        let instance = GraphInstance::from_yaml_file(path)?;
        Self::with_instance(instance)
    }

    /// Read-only view of the graph for rendering.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        self.session.graph()
    }

    /// Whether the app should quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the weight-edit input mode is active.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    /// Instance name for the title panel, if an instance is loaded.
    #[must_use]
    pub fn instance_name(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| {
            if m.name.is_empty() {
                m.id.as_str()
            } else {
                m.name.as_str()
            }
        })
    }

    /// Percentage gap of the last route versus the instance's best known
    /// length.
    #[must_use]
    pub fn gap_vs_best_known(&self) -> Option<f64> {
        let best = self.meta.as_ref()?.best_known?;
        let report = self.last_report.as_ref()?;
        if best <= 0.0 || report.route.is_empty() {
            return None;
        }
        Some((report.route.length - best) / best * 100.0)
    }

    /// Id of the node closest to the cursor; earliest id wins exact ties.
    #[must_use]
    pub fn nearest_node(&self) -> Option<NodeId> {
        let (cx, cy) = self.cursor;
        let mut best: Option<(NodeId, f64)> = None;
        for node in self.session.graph().nodes() {
            let dx = node.x - cx;
            let dy = node.y - cy;
            let d2 = dx.mul_add(dx, dy * dy);
            let better = match best {
                Some((_, chosen)) => d2 < chosen,
                None => true,
            };
            if better {
                best = Some((node.id, d2));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Export the session journal as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export_journal(&self) -> RouteResult<String> {
        self.session.export_journal_json()
    }

    /// Set the status line (binary-level actions report through this).
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.input.is_some() {
            self.handle_input_key(key);
            return;
        }
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.move_cursor(-CURSOR_STEP, 0.0),
            KeyCode::Right => self.move_cursor(CURSOR_STEP, 0.0),
            KeyCode::Up => self.move_cursor(0.0, CURSOR_STEP),
            KeyCode::Down => self.move_cursor(0.0, -CURSOR_STEP),
            KeyCode::Char('n') => self.place_node(),
            KeyCode::Char('m') => self.mark_nearest(),
            KeyCode::Char('e') => self.connect_marked(),
            KeyCode::Char('w') => self.begin_weight_edit(),
            KeyCode::Char('s') => self.solve_from_nearest(),
            KeyCode::Char('a') => self.solve_all_starts(),
            KeyCode::Char('d') => self.load_classroom(),
            KeyCode::Char('r') => self.reset(),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.input = None;
                self.weight_target = None;
                self.status = "weight edit cancelled".to_string();
            }
            KeyCode::Enter => self.commit_weight(),
            KeyCode::Backspace => {
                if let Some(buffer) = &mut self.input {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = &mut self.input {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, dx: f64, dy: f64) {
        self.cursor.0 = (self.cursor.0 + dx).clamp(0.0, CANVAS_WIDTH);
        self.cursor.1 = (self.cursor.1 + dy).clamp(0.0, CANVAS_HEIGHT);
    }

    fn place_node(&mut self) {
        let (x, y) = self.cursor;
        match self.session.apply(Command::AddNode { x, y }) {
            Ok(CommandOutput::NodeAdded { node_id }) => {
                self.status = format!("node {node_id} placed at ({x:.0}, {y:.0})");
            }
            Ok(_) => {}
            Err(error) => self.status = error.to_string(),
        }
    }

    fn mark_nearest(&mut self) {
        match self.nearest_node() {
            Some(node_id) => {
                self.marked = Some(node_id);
                self.status = format!("node {node_id} marked as edge source");
            }
            None => self.status = "no nodes to mark".to_string(),
        }
    }

    fn connect_marked(&mut self) {
        let Some(from) = self.marked else {
            self.status = "mark a source node first (m)".to_string();
            return;
        };
        let Some(to) = self.nearest_node() else {
            self.status = "no target node under the cursor".to_string();
            return;
        };
        match self.session.apply(Command::AddEdge { from, to }) {
            Ok(CommandOutput::EdgeAdded { edge_id }) => {
                let weight = self
                    .session
                    .graph()
                    .edges()
                    .last()
                    .map_or(0.0, |e| e.weight);
                self.status = format!("edge {edge_id}: {from} -> {to}, weight {weight:.2}");
            }
            Ok(_) => {}
            Err(error) => self.status = error.to_string(),
        }
    }

    fn begin_weight_edit(&mut self) {
        let Some(from) = self.marked else {
            self.status = "mark a source node first (m)".to_string();
            return;
        };
        let Some(to) = self.nearest_node() else {
            self.status = "no target node under the cursor".to_string();
            return;
        };
        self.weight_target = Some((from, to));
        self.input = Some(String::new());
        self.status = format!("enter weight for {from} -> {to}");
    }

    fn commit_weight(&mut self) {
        let Some(raw) = self.input.take() else {
            return;
        };
        let Some((from, to)) = self.weight_target.take() else {
            return;
        };
        match parse_weight(&raw) {
            Ok(weight) => match self.session.apply(Command::SetWeight { from, to, weight }) {
                Ok(_) => self.status = format!("weight {from} -> {to} set to {weight}"),
                Err(error) => self.status = error.to_string(),
            },
            Err(error) => self.status = error.to_string(),
        }
    }

    fn solve_from_nearest(&mut self) {
        let Some(start) = self.nearest_node() else {
            self.status = "no nodes to solve from".to_string();
            return;
        };
        let result = self.session.apply(Command::Solve { start });
        self.record_solve(result);
    }

    fn solve_all_starts(&mut self) {
        let result = self.session.apply(Command::SolveMultiStart);
        self.record_solve(result);
    }

    fn record_solve(&mut self, result: RouteResult<CommandOutput>) {
        match result {
            Ok(CommandOutput::Solved { report }) => {
                if report.route.is_empty() {
                    self.status = "solver needs at least two nodes".to_string();
                } else {
                    let shape = if report.route.is_closed() {
                        "closed"
                    } else {
                        "open"
                    };
                    self.status = format!(
                        "{shape} route, length {:.3}, {:.6} s",
                        report.route.length,
                        report.elapsed_seconds()
                    );
                    self.last_report = Some(report);
                }
            }
            Ok(_) => {}
            Err(error) => self.status = error.to_string(),
        }
    }

    fn load_classroom(&mut self) {
        let instance = classroom_example();
        match instance.build_graph() {
            Ok(graph) => {
                self.session.replace_graph(graph);
                self.status = format!("loaded instance {}", instance.meta.id);
                self.meta = Some(instance.meta);
                self.marked = None;
                self.last_report = None;
            }
            Err(error) => self.status = error.to_string(),
        }
    }

    fn reset(&mut self) {
        match self.session.apply(Command::Reset) {
            Ok(_) => {
                self.marked = None;
                self.last_report = None;
                self.meta = None;
                self.status = "graph reset".to_string();
            }
            Err(error) => self.status = error.to_string(),
        }
    }
}
