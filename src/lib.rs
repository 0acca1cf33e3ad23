//! Deadlock Detector Core
//!
//! Answers "is this set of processes deadlocked?" two ways: cycle detection
//! over a resource-allocation graph, and the Banker's algorithm safety check
//! over an allocation/maximum/available snapshot.

pub mod config;
pub mod detection;
pub mod error;
pub mod observability;

pub use config::{AnalyzerConfig, ConfigBuilder};
pub use detection::{
    evaluate, find_cycle, has_cycle, Analysis, Analyzer, CycleDetector, Mode, ResourceGraph,
    ResourceState, SafeSequence, SafetyEvaluator, SafetyOutcome, ScanOrder,
};
pub use error::{Error, Result};
