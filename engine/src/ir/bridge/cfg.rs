use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{EngineError, EngineResult};
use crate::ir::bridge::statement::Stmt;

/// A node in the statement-level control-flow graph
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, Hash)]
pub enum Node {
    /// synthetic entry point
    Entry,
    /// the statement at the given index
    Stmt(usize),
    /// synthetic exit point
    Exit,
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Stmt(index) => write!(f, "#{}", index),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// A representation of CFG edges
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Edge {
    Entry,
    FallThrough,
    Goto,
    Branch(bool),
    /// case labels leading to the same target, `None` for default
    Switch(BTreeSet<Option<i32>>),
    Return,
}

/// A control-flow graph over the statements of a procedure
#[derive(Debug)]
pub struct ControlFlowGraph {
    graph: DiGraph<Node, Edge>,
    /// node to index in the graph
    node_to_index: BTreeMap<Node, NodeIndex>,
}

fn insert_edge(
    edges: &mut BTreeMap<(Node, Node), Edge>,
    src: Node,
    dst: Node,
    edge: Edge,
) -> EngineResult<()> {
    if edges.insert((src, dst), edge).is_some() {
        return Err(EngineError::InvariantViolation(format!(
            "duplicated edge in CFG: {} -> {}",
            src, dst
        )));
    }
    Ok(())
}

fn insert_switch_edge(
    edges: &mut BTreeMap<(Node, Node), Edge>,
    src: Node,
    dst: Node,
    label: Option<i32>,
) -> EngineResult<()> {
    let edge_switch = edges
        .entry((src, dst))
        .or_insert_with(|| Edge::Switch(BTreeSet::new()));
    match edge_switch {
        Edge::Switch(set) => {
            if !set.insert(label) {
                return Err(EngineError::InvariantViolation(
                    "duplicated edge in CFG".into(),
                ));
            }
        }
        Edge::Entry | Edge::FallThrough | Edge::Goto | Edge::Branch(..) | Edge::Return => {
            return Err(EngineError::InvariantViolation(
                "unexpected edge type for switch statement".into(),
            ));
        }
    }
    Ok(())
}

impl ControlFlowGraph {
    pub fn build(stmts: &[Stmt]) -> EngineResult<Self> {
        let size = stmts.len();
        let locate = |target: usize| -> EngineResult<Node> {
            if target >= size {
                return Err(EngineError::InvariantViolation(format!(
                    "jump target {} out of range",
                    target
                )));
            }
            Ok(Node::Stmt(target))
        };
        let next = |index: usize| -> Node {
            if index + 1 < size {
                Node::Stmt(index + 1)
            } else {
                Node::Exit
            }
        };

        // collect the edges
        let mut edges: BTreeMap<(Node, Node), Edge> = BTreeMap::new();
        let first = if size == 0 {
            Node::Exit
        } else {
            Node::Stmt(0)
        };
        insert_edge(&mut edges, Node::Entry, first, Edge::Entry)?;

        for (index, stmt) in stmts.iter().enumerate() {
            let src = Node::Stmt(index);
            match stmt {
                Stmt::Goto { target } => {
                    insert_edge(&mut edges, src, locate(*target)?, Edge::Goto)?;
                }
                Stmt::If { condition: _, target } => {
                    let then_case = locate(*target)?;
                    let else_case = next(index);
                    if then_case == else_case {
                        debug!("branch at {} collapses into a fall-through", src);
                        insert_edge(&mut edges, src, else_case, Edge::FallThrough)?;
                    } else {
                        insert_edge(&mut edges, src, then_case, Edge::Branch(true))?;
                        insert_edge(&mut edges, src, else_case, Edge::Branch(false))?;
                    }
                }
                Stmt::Switch {
                    var: _,
                    cases,
                    default,
                } => {
                    let mut labels = BTreeSet::new();
                    for (label, target) in cases {
                        if !labels.insert(*label) {
                            return Err(EngineError::InvalidAssumption(format!(
                                "duplicated case {} in switch at {}",
                                label, src
                            )));
                        }
                        insert_switch_edge(&mut edges, src, locate(*target)?, Some(*label))?;
                    }
                    insert_switch_edge(&mut edges, src, locate(*default)?, None)?;
                }
                Stmt::Return { .. } | Stmt::Throw { .. } => {
                    insert_edge(&mut edges, src, Node::Exit, Edge::Return)?;
                }
                Stmt::Definition { .. } | Stmt::Invoke(..) | Stmt::Nop => {
                    insert_edge(&mut edges, src, next(index), Edge::FallThrough)?;
                }
            }
        }

        // add the nodes
        let mut graph = DiGraph::new();
        let mut node_to_index = BTreeMap::new();
        let nodes = std::iter::once(Node::Entry)
            .chain((0..size).map(Node::Stmt))
            .chain(std::iter::once(Node::Exit));
        for node in nodes {
            node_to_index.insert(node, graph.add_node(node));
        }

        // add the edges
        let num_edges = edges.len();
        for ((src, dst), edge) in edges {
            graph.add_edge(node_to_index[&src], node_to_index[&dst], edge);
        }
        debug!(
            "CFG built with {} nodes and {} edges",
            node_to_index.len(),
            num_edges
        );

        // done with the construction
        Ok(Self {
            graph,
            node_to_index,
        })
    }

    pub fn entry(&self) -> Node {
        Node::Entry
    }

    pub fn exit(&self) -> Node {
        Node::Exit
    }

    /// All nodes, in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.node_to_index.keys().copied()
    }

    pub fn contains(&self, node: Node) -> bool {
        self.node_to_index.contains_key(&node)
    }

    fn neighbors(&self, node: Node, direction: Direction) -> Vec<Node> {
        let mut result: Vec<_> = match self.node_to_index.get(&node) {
            None => vec![],
            Some(idx) => self
                .graph
                .neighbors_directed(*idx, direction)
                .map(|n| self.graph[n])
                .collect(),
        };
        result.sort();
        result
    }

    pub fn predecessors(&self, node: Node) -> Vec<Node> {
        self.neighbors(node, Direction::Incoming)
    }

    pub fn successors(&self, node: Node) -> Vec<Node> {
        self.neighbors(node, Direction::Outgoing)
    }

    pub fn edge(&self, src: Node, dst: Node) -> Option<&Edge> {
        let src_index = self.node_to_index.get(&src)?;
        let dst_index = self.node_to_index.get(&dst)?;
        self.graph
            .find_edge(*src_index, *dst_index)
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }
}
