// Detection System Module
// RAG cycle detection, Banker's safety check, input parsing, reporting

pub mod banker;
pub mod cycle;
pub mod input;
pub mod report;
pub mod types;

pub use banker::{evaluate, is_sound_sequence, SafetyEvaluator};
pub use cycle::{find_cycle, has_cycle, CycleDetector};
pub use types::*;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Result of one analysis run, with the input it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Rag {
        graph: ResourceGraph,
        cycle: Option<Vec<NodeId>>,
    },
    Banker {
        state: ResourceState,
        outcome: SafetyOutcome,
    },
}

impl Analysis {
    pub fn mode(&self) -> Mode {
        match self {
            Analysis::Rag { .. } => Mode::Rag,
            Analysis::Banker { .. } => Mode::Banker,
        }
    }

    /// True for a cycle in the graph or an unsafe resource state.
    pub fn is_deadlocked(&self) -> bool {
        match self {
            Analysis::Rag { cycle, .. } => cycle.is_some(),
            Analysis::Banker { outcome, .. } => !outcome.is_safe(),
        }
    }
}

/// Reads the configured inputs and dispatches to one of the two analyses.
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Analyzer { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Reads the mode selector file.
    pub fn mode(&self) -> Result<Mode> {
        input::read_mode_file(self.config.mode_path())
    }

    /// Reads the mode selector and runs the analysis it names.
    pub fn run(&self) -> Result<Analysis> {
        let mode = self.mode()?;
        info!(%mode, "mode selected");
        self.run_mode(mode)
    }

    pub fn run_mode(&self, mode: Mode) -> Result<Analysis> {
        match mode {
            Mode::Rag => self.analyze_graph_file(self.config.graph_path()),
            Mode::Banker => self.analyze_resource_file(self.config.banker_path()),
        }
    }

    pub fn analyze_graph_file(&self, path: impl AsRef<Path>) -> Result<Analysis> {
        let graph = input::read_graph_file(path)?;
        Ok(self.analyze_graph(graph))
    }

    pub fn analyze_resource_file(&self, path: impl AsRef<Path>) -> Result<Analysis> {
        let state = input::read_resource_file(path)?;
        Ok(self.analyze_state(state))
    }

    pub fn analyze_graph(&self, graph: ResourceGraph) -> Analysis {
        let cycle = find_cycle(&graph);
        info!(deadlock = cycle.is_some(), "graph analysis complete");
        Analysis::Rag { graph, cycle }
    }

    pub fn analyze_state(&self, state: ResourceState) -> Analysis {
        let evaluator = SafetyEvaluator::new(self.config.analysis.scan_order);
        let outcome = evaluator.evaluate(&state);
        info!(
            scan_order = %evaluator.scan_order(),
            safe = outcome.is_safe(),
            "safety check complete"
        );
        Analysis::Banker { state, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_flags() {
        let analyzer = Analyzer::new(AnalyzerConfig::default());

        let cyclic = analyzer.analyze_graph(ResourceGraph::from_edges([("A", "B"), ("B", "A")]));
        assert_eq!(cyclic.mode(), Mode::Rag);
        assert!(cyclic.is_deadlocked());

        let acyclic = analyzer.analyze_graph(ResourceGraph::from_edges([("A", "B")]));
        assert!(!acyclic.is_deadlocked());

        let state = ResourceState::new(vec![vec![1]], vec![vec![3]], vec![1]).unwrap();
        let blocked = analyzer.analyze_state(state);
        assert_eq!(blocked.mode(), Mode::Banker);
        assert!(blocked.is_deadlocked());
    }

    #[test]
    fn test_missing_mode_file_is_io_error() {
        let config = crate::config::ConfigBuilder::new()
            .with_base_dir("/nonexistent/deadlock-detector")
            .build()
            .unwrap();
        let err = Analyzer::new(config).run().unwrap_err();
        assert!(matches!(err, crate::error::Error::IoError { .. }));
    }
}
