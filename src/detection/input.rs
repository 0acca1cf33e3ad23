// Input Parsing for the mode selector, graph and resource-state sources
use super::types::*;
use crate::error::{Error, Result};
use std::path::Path;
use std::str::SplitWhitespace;
use tracing::{debug, warn};

/// Whitespace-separated token reader that names the source in its errors.
struct Tokens<'a> {
    source_name: &'a str,
    inner: SplitWhitespace<'a>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    fn new(source_name: &'a str, text: &'a str) -> Self {
        Tokens {
            source_name,
            inner: text.split_whitespace(),
            consumed: 0,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        let token = self.inner.next().ok_or_else(|| {
            Error::parse(
                self.source_name,
                format!("unexpected end of input while reading {}", what),
            )
        })?;
        self.consumed += 1;
        Ok(token)
    }

    fn next_u64(&mut self, what: &str) -> Result<u64> {
        let token = self.next(what)?;
        token.parse().map_err(|_| {
            Error::parse(
                self.source_name,
                format!(
                    "token {} ('{}') for {} is not a non-negative integer",
                    self.consumed, token, what
                ),
            )
        })
    }

    fn next_count(&mut self, what: &str) -> Result<usize> {
        let value = self.next_u64(what)?;
        usize::try_from(value).map_err(|_| {
            Error::parse(self.source_name, format!("{} {} is too large", what, value))
        })
    }

    fn remaining(&mut self) -> usize {
        self.inner.by_ref().count()
    }
}

/// Reads the mode token from the first line of `text`.
pub fn parse_mode(text: &str) -> Result<Mode> {
    let line = text.lines().next().unwrap_or("");
    line.parse()
}

/// Parses an edge count followed by that many `from to` pairs.
pub fn parse_graph(source_name: &str, text: &str) -> Result<ResourceGraph> {
    let mut tokens = Tokens::new(source_name, text);
    let edge_count = tokens.next_count("edge count")?;

    let mut graph = ResourceGraph::new();
    for k in 0..edge_count {
        let from = tokens.next(&format!("source of edge {}", k + 1))?;
        let to = tokens.next(&format!("target of edge {}", k + 1))?;
        graph.add_edge(from, to);
    }

    let extra = tokens.remaining();
    if extra > 0 {
        warn!(source = source_name, extra, "ignoring tokens after the last edge");
    }
    debug!(
        source = source_name,
        edges = graph.edge_count(),
        nodes = graph.node_count(),
        "parsed resource-allocation graph"
    );
    Ok(graph)
}

/// Parses `n m`, the `n x m` allocation matrix, the `n x m` maximum matrix
/// and the `m` available units, in that order.
pub fn parse_resource_state(source_name: &str, text: &str) -> Result<ResourceState> {
    let mut tokens = Tokens::new(source_name, text);
    let n = tokens.next_count("process count")?;
    let m = tokens.next_count("resource kind count")?;
    // With no resource kinds the matrices carry no tokens, so nothing in the
    // input bounds n.
    if m == 0 && n > 0 {
        return Err(Error::InvalidInput(format!(
            "{}: {} processes declared over 0 resource kinds",
            source_name, n
        )));
    }

    let mut read_matrix = |name: &str| -> Result<Vec<Vec<u64>>> {
        (0..n)
            .map(|i| {
                (0..m)
                    .map(|j| tokens.next_u64(&format!("{}[{}][{}]", name, i, j)))
                    .collect::<Result<Vec<u64>>>()
            })
            .collect()
    };
    let allocation = read_matrix("allocation")?;
    let maximum = read_matrix("maximum")?;

    let available = (0..m)
        .map(|j| tokens.next_u64(&format!("available[{}]", j)))
        .collect::<Result<Vec<u64>>>()?;

    let extra = tokens.remaining();
    if extra > 0 {
        warn!(source = source_name, extra, "ignoring tokens after the available vector");
    }
    debug!(source = source_name, processes = n, resources = m, "parsed resource state");
    ResourceState::new(allocation, maximum, available)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

pub fn read_mode_file(path: impl AsRef<Path>) -> Result<Mode> {
    let path = path.as_ref();
    let text = read_source(path)?;
    parse_mode(&text).map_err(|e| match e {
        Error::ConfigError(msg) => {
            Error::ConfigError(format!("{} (in {})", msg, path.display()))
        }
        other => other,
    })
}

pub fn read_graph_file(path: impl AsRef<Path>) -> Result<ResourceGraph> {
    let path = path.as_ref();
    let text = read_source(path)?;
    parse_graph(&path.display().to_string(), &text)
}

pub fn read_resource_file(path: impl AsRef<Path>) -> Result<ResourceState> {
    let path = path.as_ref();
    let text = read_source(path)?;
    parse_resource_state(&path.display().to_string(), &text)
}
