//! Deterministic Dinic max-flow (spec §4.5), grounded on the retrieved
//! pack's own flow-network representation
//! (`other_examples/5a126f33_kpernyer-converge.zone__converge-optimization-src-graph-flow.rs.rs`):
//! a flat edge arena plus per-node adjacency lists of edge indices, edges
//! inserted in forward/reverse pairs. That file runs Push-Relabel; this
//! one runs Dinic (BFS level graph, then blocking flow by DFS with a
//! per-node current-arc pointer) because the spec names Dinic explicitly
//! and requires a fully deterministic iteration order.

use std::collections::VecDeque;

use crate::common::prelude::*;

#[derive(Debug, Clone, Copy)]
struct FlowEdge {
    to: usize,
    cap: f64,
    flow: f64,
}

/// A residual flow network over `n` vertices. Every `add_edge` call
/// inserts a forward/reverse pair at adjacent indices, so a twin is always
/// `idx ^ 1`, no separate `rev` field to keep in sync.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    adj: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new(num_nodes: usize) -> Self {
        Self { adj: vec![Vec::new(); num_nodes], edges: Vec::new() }
    }

    pub fn num_nodes(&self) -> usize {
        self.adj.len()
    }

    /// Inserts a forward arc `from -> to` with capacity `cap` and its
    /// zero-capacity residual twin `to -> from`. Returns the forward arc's
    /// index, used later to read back its flow.
    pub fn add_edge(&mut self, from: usize, to: usize, cap: f64) -> usize {
        let fwd = self.edges.len();
        self.edges.push(FlowEdge { to, cap, flow: 0.0 });
        self.adj[from].push(fwd);

        let rev = self.edges.len();
        self.edges.push(FlowEdge { to: from, cap: 0.0, flow: 0.0 });
        self.adj[to].push(rev);

        fwd
    }

    fn twin(idx: usize) -> usize {
        idx ^ 1
    }

    pub fn residual(&self, idx: usize) -> f64 {
        self.edges[idx].cap - self.edges[idx].flow
    }

    /// Net flow carried by the forward arc returned by [`Self::add_edge`].
    pub fn flow_on(&self, idx: usize) -> f64 {
        self.edges[idx].flow
    }

    fn push(&mut self, idx: usize, amount: f64) {
        self.edges[idx].flow += amount;
        let t = Self::twin(idx);
        self.edges[t].flow -= amount;
    }

    /// Runs Dinic's algorithm from `source` to `sink` and returns the
    /// total flow value pushed. Deterministic given deterministic
    /// insertion order: BFS visits each node's arcs in adjacency
    /// (insertion) order, and the blocking-flow DFS advances a current-arc
    /// pointer per node instead of rescanning from the front.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> f64 {
        let mut total = 0.0;

        while let Some(level) = self.bfs_levels(source, sink) {
            let mut current = vec![0usize; self.adj.len()];
            loop {
                let pushed = self.dfs_blocking(source, sink, f64::INFINITY, &level, &mut current);
                if pushed <= EPSILON {
                    break;
                }
                total += pushed;
            }
        }

        total
    }

    fn bfs_levels(&self, source: usize, sink: usize) -> Option<Vec<i64>> {
        let mut level = vec![-1i64; self.adj.len()];
        level[source] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &idx in &self.adj[u] {
                let edge = self.edges[idx];
                if self.residual(idx) > EPSILON && level[edge.to] < 0 {
                    level[edge.to] = level[u] + 1;
                    queue.push_back(edge.to);
                }
            }
        }

        if level[sink] >= 0 {
            Some(level)
        } else {
            None
        }
    }

    fn dfs_blocking(
        &mut self,
        u: usize,
        sink: usize,
        pushed_in: f64,
        level: &[i64],
        current: &mut [usize],
    ) -> f64 {
        if u == sink || pushed_in <= EPSILON {
            return pushed_in;
        }

        while current[u] < self.adj[u].len() {
            let idx = self.adj[u][current[u]];
            let edge = self.edges[idx];
            let residual = self.residual(idx);

            if residual > EPSILON && level[edge.to] == level[u] + 1 {
                let bottleneck =
                    self.dfs_blocking(edge.to, sink, pushed_in.min(residual), level, current);
                if bottleneck > EPSILON {
                    self.push(idx, bottleneck);
                    return bottleneck;
                }
            }

            current[u] += 1;
        }

        0.0
    }

    /// Vertices reachable from `source` over strictly positive residual
    /// capacity, in the *current* (post-`max_flow`) residual graph, the
    /// cut-reachable set of spec §4.6.
    pub fn residual_reachable(&self, source: usize) -> Vec<bool> {
        let mut reachable = vec![false; self.adj.len()];
        reachable[source] = true;
        let mut queue = VecDeque::new();
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &idx in &self.adj[u] {
                let edge = self.edges[idx];
                if self.residual(idx) > EPSILON && !reachable[edge.to] {
                    reachable[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }

        reachable
    }
}
