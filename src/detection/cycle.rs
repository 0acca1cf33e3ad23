// Cycle Detection over a Resource-Allocation Graph
use super::types::*;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Depth-first cycle search whose state lives for exactly one query.
///
/// The recursion path is kept as an explicit frame stack plus an `on_stack`
/// set, so deep graphs never touch the native call stack.
pub struct CycleDetector<'g> {
    graph: &'g ResourceGraph,
    // Nodes whose exploration has started; finished ones are no longer on_stack
    visited: HashSet<&'g str>,
    on_stack: HashSet<&'g str>,
    frames: Vec<Frame<'g>>,
}

struct Frame<'g> {
    node: &'g str,
    next_successor: usize,
}

impl<'g> CycleDetector<'g> {
    pub fn new(graph: &'g ResourceGraph) -> Self {
        CycleDetector {
            graph,
            visited: HashSet::new(),
            on_stack: HashSet::new(),
            frames: Vec::new(),
        }
    }

    /// Runs the search from every source node in insertion order and stops
    /// at the first cycle. Returns the nodes along that cycle.
    pub fn run(mut self) -> Option<Vec<NodeId>> {
        let graph = self.graph;
        for start in graph.sources() {
            if self.visited.contains(start.as_str()) {
                continue;
            }
            debug!(start = %start, "starting depth-first search");
            if let Some(cycle) = self.explore(start) {
                return Some(cycle);
            }
        }
        None
    }

    fn explore(&mut self, start: &'g str) -> Option<Vec<NodeId>> {
        let graph = self.graph;
        self.enter(start);

        while let Some(frame) = self.frames.last_mut() {
            let node = frame.node;
            let successors = graph.successors(node);

            if frame.next_successor < successors.len() {
                let next = successors[frame.next_successor].as_str();
                frame.next_successor += 1;

                if self.on_stack.contains(next) {
                    return Some(self.cycle_through(next));
                }
                if !self.visited.contains(next) {
                    self.enter(next);
                }
            } else {
                // Backtrack
                self.on_stack.remove(node);
                self.frames.pop();
                trace!(node = %node, "fully explored");
            }
        }

        None
    }

    fn enter(&mut self, node: &'g str) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.frames.push(Frame {
            node,
            next_successor: 0,
        });
    }

    fn cycle_through(&self, node: &str) -> Vec<NodeId> {
        let start = self
            .frames
            .iter()
            .position(|f| f.node == node)
            .unwrap_or(0);
        self.frames[start..]
            .iter()
            .map(|f| f.node.to_string())
            .collect()
    }
}

/// Returns one directed cycle of `graph`, if any exists.
///
/// The closing edge runs from the last node back to the first.
pub fn find_cycle(graph: &ResourceGraph) -> Option<Vec<NodeId>> {
    CycleDetector::new(graph).run()
}

/// True iff `graph` contains a directed cycle, self-loops included.
pub fn has_cycle(graph: &ResourceGraph) -> bool {
    find_cycle(graph).is_some()
}
