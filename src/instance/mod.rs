//! YAML instance input.
//!
//! An instance file describes a prepared graph: metadata, nodes with
//! positions and optional labels, edges with optional explicit weights.
//! Loading replays the file through the model's own mutation operations,
//! so instance input obeys exactly the rules interactive input does and
//! duplicate edges survive as listed.
//!
//! Instances are input only. A session graph is never written back.
//!
//! # Example YAML
//!
//! ```yaml
//! meta:
//!   id: "ROUTE-TRIANGLE-003"
//!   name: "Right triangle"
//!   best_known: 12
//!
//! nodes:
//!   - { id: 1, x: 0, y: 0 }
//!   - { id: 2, x: 300, y: 0, label: "far" }
//!   - { id: 3, x: 0, y: 400 }
//!
//! edges:
//!   - { from: 1, to: 2 }            # weight defaults to the distance
//!   - { from: 2, to: 3, weight: 5 }
//!   - { from: 3, to: 1, weight: 4 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{RouteError, RouteResult};
use crate::graph::{Graph, NodeId};

/// Instance metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InstanceMeta {
    /// Unique instance identifier.
    #[validate(length(min = 1))]
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Version string (semver).
    #[serde(default = "default_version")]
    #[validate(length(min = 1))]
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Known best route length, for display only.
    #[serde(default)]
    pub best_known: Option<f64>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for InstanceMeta {
    fn default() -> Self {
        Self {
            id: "GRAPH-UNNAMED".to_string(),
            name: String::new(),
            version: default_version(),
            description: String::new(),
            best_known: None,
        }
    }
}

/// One declared node.
///
/// The declared `id` must match the id the model will assign, which makes
/// files self-checking against reordered or deleted entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InstanceNode {
    /// Declared id; must run 1, 2, 3, ... in file order.
    #[validate(range(min = 1))]
    pub id: NodeId,
    /// Position.
    pub x: f64,
    /// Position.
    pub y: f64,
    /// Display label; omitted means the cycled default.
    #[serde(default)]
    pub label: Option<String>,
}

/// One declared edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InstanceEdge {
    /// Source node id.
    #[validate(range(min = 1))]
    pub from: NodeId,
    /// Target node id.
    #[validate(range(min = 1))]
    pub to: NodeId,
    /// Explicit weight; omitted means the Euclidean default.
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

/// Complete graph instance (YAML-first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GraphInstance {
    /// Instance metadata.
    #[validate(nested)]
    #[serde(default)]
    pub meta: InstanceMeta,
    /// Declared nodes, in creation order.
    #[validate(nested)]
    pub nodes: Vec<InstanceNode>,
    /// Declared edges, in creation order. Duplicates are kept.
    #[validate(nested)]
    #[serde(default)]
    pub edges: Vec<InstanceEdge>,
}

impl GraphInstance {
    /// Parse an instance from a YAML string, with schema and semantic
    /// validation.
    ///
    /// # Errors
    ///
    /// [`RouteError::YamlParse`] for malformed YAML or unknown keys at any
    /// level, [`RouteError::Validation`] for schema violations, and
    /// [`RouteError::Instance`] for semantic ones (id order, non-finite
    /// positions, dangling endpoints, bad weights).
    pub fn from_yaml(yaml: &str) -> RouteResult<Self> {
        let instance: Self = serde_yaml::from_str(yaml)?;
        instance.validate()?;
        instance.validate_semantic()?;
        Ok(instance)
    }

    /// Load an instance from a YAML file.
    ///
    /// # Errors
    ///
    /// [`RouteError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_yaml`].
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> RouteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> RouteResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of declared nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of declared edges, duplicates included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Semantic validation beyond the schema.
    ///
    /// # Errors
    ///
    /// [`RouteError::Instance`] naming the first offending entry.
    pub fn validate_semantic(&self) -> RouteResult<()> {
        let n = self.nodes.len();

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id as usize != index + 1 {
                return Err(RouteError::instance(format!(
                    "node ids must run 1..={n} in file order; position {} declares id {}",
                    index + 1,
                    node.id
                )));
            }
            if !node.x.is_finite() || !node.y.is_finite() {
                return Err(RouteError::instance(format!(
                    "node {}: position ({}, {}) must be finite",
                    node.id, node.x, node.y
                )));
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            for endpoint in [edge.from, edge.to] {
                if endpoint as usize > n || endpoint == 0 {
                    return Err(RouteError::instance(format!(
                        "edge {}: endpoint {endpoint} is not a declared node",
                        index + 1
                    )));
                }
            }
            if let Some(weight) = edge.weight {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(RouteError::instance(format!(
                        "edge {}: weight {weight} must be finite and non-negative",
                        index + 1
                    )));
                }
            }
        }

        Ok(())
    }

    /// Replay the instance into a fresh [`Graph`].
    ///
    /// # Errors
    ///
    /// [`RouteError::Instance`] on semantic violations, plus whatever the
    /// model's own operations reject.
    pub fn build_graph(&self) -> RouteResult<Graph> {
        self.validate_semantic()?;

        let mut graph = Graph::new();
        for node in &self.nodes {
            match &node.label {
                Some(label) => graph.add_labeled_node(node.x, node.y, label.clone()),
                None => graph.add_node(node.x, node.y),
            };
        }
        for edge in &self.edges {
            match edge.weight {
                Some(weight) => graph.add_weighted_edge(edge.from, edge.to, weight)?,
                None => graph.add_edge(edge.from, edge.to)?,
            };
        }
        Ok(graph)
    }
}

/// The bundled six-node teaching instance.
///
/// Weights are asymmetric and deliberately differ from the positional
/// distances; the 6→5 edge appears twice. Also shipped as
/// `demos/classroom_graph.yaml`.
#[must_use]
pub fn classroom_example() -> GraphInstance {
    let node = |id: NodeId, x: f64, y: f64, label: &str| InstanceNode {
        id,
        x,
        y,
        label: Some(label.to_string()),
    };
    let edge = |from: NodeId, to: NodeId, weight: f64| InstanceEdge {
        from,
        to,
        weight: Some(weight),
    };

    GraphInstance {
        meta: InstanceMeta {
            id: "ROUTE-CLASSROOM-006".to_string(),
            name: "Classroom graph".to_string(),
            version: "1.0.0".to_string(),
            description: "Six-node teaching graph with asymmetric weights and a duplicated edge"
                .to_string(),
            best_known: Some(14.0),
        },
        nodes: vec![
            node(1, 200.0, 80.0, "a"),
            node(2, 100.0, 100.0, "b"),
            node(3, 100.0, 150.0, "c"),
            node(4, 200.0, 200.0, "d"),
            node(5, 250.0, 150.0, "f"),
            node(6, 200.0, 150.0, "g"),
        ],
        edges: vec![
            edge(1, 2, 3.0),
            edge(2, 1, 3.0),
            edge(2, 3, 8.0),
            edge(3, 2, 3.0),
            edge(3, 4, 1.0),
            edge(4, 3, 8.0),
            edge(4, 5, 1.0),
            edge(5, 4, 3.0),
            edge(5, 1, 3.0),
            edge(1, 5, 1.0),
            edge(6, 2, 3.0),
            edge(6, 1, 3.0),
            edge(6, 3, 3.0),
            edge(6, 4, 5.0),
            edge(6, 5, 4.0),
            edge(6, 5, 4.0),
            edge(2, 6, 3.0),
            edge(3, 6, 1.0),
        ],
    }
}

// =============================================================================
// Tests
// =============================================================================
