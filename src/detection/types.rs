// Detection System Types
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Label of a process or resource in a resource-allocation graph.
pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Banker,
    Rag,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "banker" => Ok(Mode::Banker),
            "rag" => Ok(Mode::Rag),
            "" => Err(Error::ConfigError("mode selector is empty".to_string())),
            other => Err(Error::ConfigError(format!(
                "Unknown mode '{}'. Use 'banker' or 'rag'",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Banker => write!(f, "banker"),
            Mode::Rag => write!(f, "rag"),
        }
    }
}

/// Directed graph of holder -> waiter (or process -> resource) edges.
///
/// Only nodes with outgoing edges are keys of the adjacency map. Sinks show
/// up as successors only. Duplicate edges are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGraph {
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    // Keys of `adjacency` in first-insertion order
    sources: Vec<NodeId>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<NodeId>,
        B: Into<NodeId>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) {
        let from = from.into();
        let to = to.into();
        match self.adjacency.get_mut(&from) {
            Some(successors) => successors.push(to),
            None => {
                self.sources.push(from.clone());
                self.adjacency.insert(from, vec![to]);
            }
        }
    }

    /// Successors of `node`. A node absent from the map has none.
    pub fn successors(&self, node: &str) -> &[NodeId] {
        self.adjacency
            .get(node)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes with at least one outgoing edge, in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = &NodeId> {
        self.sources.iter()
    }

    /// Number of distinct nodes, sinks included.
    pub fn node_count(&self) -> usize {
        let mut nodes: HashSet<&str> = HashSet::new();
        for (from, successors) in &self.adjacency {
            nodes.insert(from);
            nodes.extend(successors.iter().map(|s| s.as_str()));
        }
        nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Strategy for walking the process list during the safety check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    /// Keep walking the list after an admission; every satisfiable process
    /// met during a pass is admitted in that pass.
    #[default]
    Continue,
    /// Go back to index 0 after every admission.
    Restart,
}

impl FromStr for ScanOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(ScanOrder::Continue),
            "restart" => Ok(ScanOrder::Restart),
            _ => Err(Error::ConfigError(format!("Invalid scan order: {}", s))),
        }
    }
}

impl fmt::Display for ScanOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOrder::Continue => write!(f, "continue"),
            ScanOrder::Restart => write!(f, "restart"),
        }
    }
}

/// Snapshot of `n` processes over `m` resource kinds.
///
/// Construction validates dimensions and that `allocation <= maximum`
/// everywhere, so `need` is always well defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    allocation: Vec<Vec<u64>>,
    maximum: Vec<Vec<u64>>,
    available: Vec<u64>,
    need: Vec<Vec<u64>>,
}

impl ResourceState {
    pub fn new(
        allocation: Vec<Vec<u64>>,
        maximum: Vec<Vec<u64>>,
        available: Vec<u64>,
    ) -> Result<Self> {
        let n = allocation.len();
        let m = available.len();

        if maximum.len() != n {
            return Err(Error::InvalidInput(format!(
                "allocation has {} rows but maximum has {}",
                n,
                maximum.len()
            )));
        }

        let mut need = Vec::with_capacity(n);
        for (i, (alloc_row, max_row)) in allocation.iter().zip(&maximum).enumerate() {
            if alloc_row.len() != m {
                return Err(Error::InvalidInput(format!(
                    "allocation row P{} has {} columns, expected {}",
                    i,
                    alloc_row.len(),
                    m
                )));
            }
            if max_row.len() != m {
                return Err(Error::InvalidInput(format!(
                    "maximum row P{} has {} columns, expected {}",
                    i,
                    max_row.len(),
                    m
                )));
            }

            let row = alloc_row
                .iter()
                .zip(max_row)
                .enumerate()
                .map(|(j, (&alloc, &max))| {
                    max.checked_sub(alloc).ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "negative need for P{} resource {}: allocation {} exceeds maximum {}",
                            i, j, alloc, max
                        ))
                    })
                })
                .collect::<Result<Vec<u64>>>()?;
            need.push(row);
        }

        let state = ResourceState {
            allocation,
            maximum,
            available,
            need,
        };
        // Releasing every allocation must stay representable
        state.total_supply()?;
        Ok(state)
    }

    /// Number of processes, `n`.
    pub fn processes(&self) -> usize {
        self.allocation.len()
    }

    /// Number of resource kinds, `m`.
    pub fn resources(&self) -> usize {
        self.available.len()
    }

    pub fn allocation(&self) -> &[Vec<u64>] {
        &self.allocation
    }

    pub fn maximum(&self) -> &[Vec<u64>] {
        &self.maximum
    }

    pub fn available(&self) -> &[u64] {
        &self.available
    }

    pub fn need(&self) -> &[Vec<u64>] {
        &self.need
    }

    /// `available[j] + sum_i allocation[i][j]` for every resource `j`.
    pub fn total_supply(&self) -> Result<Vec<u64>> {
        let mut total = self.available.clone();
        for row in &self.allocation {
            for (t, &a) in total.iter_mut().zip(row) {
                *t = t.checked_add(a).ok_or_else(|| {
                    Error::InvalidInput("total resource supply overflows u64".to_string())
                })?;
            }
        }
        Ok(total)
    }
}

/// Process indices in the order they can be run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeSequence(pub Vec<usize>);

impl SafeSequence {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|i| format!("P{}", i)).collect()
    }
}

impl fmt::Display for SafeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyOutcome {
    Safe(SafeSequence),
    Deadlock,
}

impl SafetyOutcome {
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyOutcome::Safe(_))
    }

    pub fn sequence(&self) -> Option<&SafeSequence> {
        match self {
            SafetyOutcome::Safe(seq) => Some(seq),
            SafetyOutcome::Deadlock => None,
        }
    }
}
