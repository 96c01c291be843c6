//! Builds the transformed flow network of spec §4.4: node-splitting for
//! capped vertices, lower-bound elimination, supply/demand folded into
//! per-node imbalance, the sink-to-supply circulation-closing arcs, and
//! finally the super-source/super-sink construction. The result is handed
//! straight to [`crate::belts::maxflow::FlowGraph::max_flow`].

use crate::belts::maxflow::FlowGraph;
use crate::belts::normalizer::NormalizedBelts;
use crate::common::prelude::*;

/// Practically-infinite capacity for the arcs that close the circulation
/// from sink back to each supply node (spec §4.4 step 4).
const UNBOUNDED: f64 = 1e18;

pub struct Reduction {
    pub graph: FlowGraph,
    pub source_star: usize,
    pub sink_star: usize,
    /// Per original edge, in input order: the forward-arc index carrying
    /// its post-lower-bound flow.
    pub edge_arcs: Vec<usize>,
    /// Per node: the `v_in -> v_out` internal split arc, present only for
    /// capped nodes.
    pub split_arcs: Vec<Option<usize>>,
    /// `Σ_{d[n]>0} d[n]`, the flow value that exactly saturates `s*` when
    /// a feasible flow exists (spec §4.6).
    pub required: f64,
    in_vertex: Vec<usize>,
    out_vertex: Vec<usize>,
}

impl Reduction {
    pub fn in_vertex(&self, node: usize) -> usize {
        self.in_vertex[node]
    }

    pub fn out_vertex(&self, node: usize) -> usize {
        self.out_vertex[node]
    }
}

pub fn build(model: &NormalizedBelts) -> Reduction {
    let n = model.num_nodes();

    // Two vertex slots per node; uncapped nodes alias both slots to the
    // same physical vertex so no no-op split arc is ever created.
    let mut in_vertex = vec![0usize; n];
    let mut out_vertex = vec![0usize; n];
    let mut next = 0usize;
    for i in 0..n {
        if model.is_capped(i) {
            in_vertex[i] = next;
            out_vertex[i] = next + 1;
            next += 2;
        } else {
            in_vertex[i] = next;
            out_vertex[i] = next;
            next += 1;
        }
    }
    let source_star = next;
    let sink_star = next + 1;
    let num_vertices = next + 2;

    let mut graph = FlowGraph::new(num_vertices);

    let mut split_arcs = vec![None; n];
    for i in 0..n {
        if let Some(cap) = model.cap[i] {
            split_arcs[i] = Some(graph.add_edge(in_vertex[i], out_vertex[i], cap));
        }
    }

    let mut d = vec![0.0f64; n];

    let mut edge_arcs = Vec::with_capacity(model.edges.len());
    for edge in &model.edges {
        d[edge.v] += edge.lo;
        d[edge.u] -= edge.lo;
        let arc = graph.add_edge(out_vertex[edge.u], in_vertex[edge.v], edge.capacity());
        edge_arcs.push(arc);
    }

    for &(node, supply) in &model.supplies {
        d[node] += supply;
    }
    d[model.sink] -= model.sink_demand;

    for &(node, _) in &model.supplies {
        graph.add_edge(out_vertex[model.sink], in_vertex[node], UNBOUNDED);
    }

    let mut required = 0.0;
    for i in 0..n {
        if d[i] > EPSILON {
            graph.add_edge(source_star, in_vertex[i], d[i]);
            required += d[i];
        } else if d[i] < -EPSILON {
            graph.add_edge(out_vertex[i], sink_star, -d[i]);
        }
    }

    Reduction { graph, source_star, sink_star, edge_arcs, split_arcs, required, in_vertex, out_vertex }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belts::io::*;
    use std::collections::BTreeMap;

    fn doc_chain() -> BeltsDoc {
        let mut nodes = BTreeMap::new();
        nodes.insert("s".to_string(), NodeDoc { cap: None });
        nodes.insert("a".to_string(), NodeDoc { cap: None });
        nodes.insert("t".to_string(), NodeDoc { cap: None });

        let edges = vec![
            EdgeDoc { u: "s".to_string(), v: "a".to_string(), lo: 0.0, hi: 10.0 },
            EdgeDoc { u: "a".to_string(), v: "t".to_string(), lo: 0.0, hi: 10.0 },
        ];

        let mut supplies = BTreeMap::new();
        supplies.insert("s".to_string(), 5.0);

        BeltsDoc { nodes, edges, supplies, sink: SinkDoc { id: "t".to_string(), demand: 5.0 } }
    }

    #[test]
    fn trivial_chain_saturates_required_flow() {
        let model = crate::belts::normalizer::normalize(doc_chain()).unwrap();
        let mut reduction = build(&model);

        assert!(approx_eq(reduction.required, 5.0));
        let flow = reduction.graph.max_flow(reduction.source_star, reduction.sink_star);
        assert!(approx_eq(flow, 5.0));

        let f_sa = reduction.graph.flow_on(reduction.edge_arcs[0]);
        let f_at = reduction.graph.flow_on(reduction.edge_arcs[1]);
        assert!(approx_eq(f_sa, 5.0));
        assert!(approx_eq(f_at, 5.0));
    }
}
