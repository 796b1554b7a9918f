//! # recorrer
//!
//! Interactive route construction over directed weighted graphs.
//!
//! Build a graph by placing nodes and drawing edges, then approximate a
//! Traveling-Salesman-style tour with a greedy nearest-neighbor walk, or
//! sweep every start node and keep the best result. Every mutation and
//! solver run can go through a journaled command session, and prepared
//! graphs load from YAML instance files.
//!
//! ## Example
//!
//! ```rust
//! use recorrer::prelude::*;
//!
//! let mut graph = Graph::new();
//! let a = graph.add_node(0.0, 0.0);
//! let b = graph.add_node(3.0, 4.0);
//! graph.add_edge(a, b)?;
//! graph.add_edge(b, a)?;
//!
//! let route = solve(&graph, a)?;
//! assert_eq!(route.path, vec![a, b, a]);
//! assert!((route.length - 10.0).abs() < 1e-9);
//! # Ok::<(), RouteError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod error;
pub mod graph;
pub mod instance;
pub mod session;
pub mod solver;
pub mod tui;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{RouteError, RouteResult};
    pub use crate::graph::{parse_weight, Edge, EdgeId, Graph, Node, NodeId};
    pub use crate::instance::{classroom_example, GraphInstance};
    pub use crate::session::{Command, CommandEntry, CommandOutput, Session};
    pub use crate::solver::{
        solve, solve_multi_start, timed_solve, timed_solve_multi_start, Route, SolveReport,
    };
}

/// Re-export for public API
pub use error::{RouteError, RouteResult};
