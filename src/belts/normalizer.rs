use crate::belts::io::BeltsDoc;
use crate::belts::model::Edge;
use crate::common::prelude::*;

/// Fatal ingest errors: malformed input per spec §7 kind 1.
#[derive(Debug)]
pub enum IngestError {
    UnknownNode { name: String },
    NegativeLowerBound { u: String, v: String },
    HiLessThanLo { u: String, v: String },
    NegativeCap { node: String },
    NonPositiveSupply { node: String },
    SupplyDemandMismatch { supplies: f64, demand: f64 },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::UnknownNode { name } =>
                write!(f, "reference to unknown node \"{name}\""),
            IngestError::NegativeLowerBound { u, v } =>
                write!(f, "edge \"{u}\"->\"{v}\" has a negative lower bound"),
            IngestError::HiLessThanLo { u, v } =>
                write!(f, "edge \"{u}\"->\"{v}\" has hi < lo"),
            IngestError::NegativeCap { node } =>
                write!(f, "node \"{node}\" has a negative throughput cap"),
            IngestError::NonPositiveSupply { node } =>
                write!(f, "supply node \"{node}\" has a non-positive supply"),
            IngestError::SupplyDemandMismatch { supplies, demand } =>
                write!(f, "total supply {supplies} does not equal sink demand {demand}"),
        }
    }
}

impl std::error::Error for IngestError {}

/// Canonicalized, immutable belt network, the only thing the reducer and
/// solver ever read.
#[derive(Debug)]
pub struct NormalizedBelts {
    pub nodes: CanonicalIndex,
    /// `Some(cap)` for throughput-capped nodes, indexed like `nodes`.
    pub cap: Vec<Option<f64>>,
    /// In input order, since the output's `flow` list must echo it.
    pub edges: Vec<Edge>,
    pub supplies: Vec<(usize, f64)>,
    pub sink: usize,
    pub sink_demand: f64,
}

impl NormalizedBelts {
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_capped(&self, node: usize) -> bool {
        self.cap[node].is_some()
    }
}

pub fn normalize(doc: BeltsDoc) -> Result<NormalizedBelts, IngestError> {
    for (name, node) in &doc.nodes {
        if let Some(cap) = node.cap {
            if cap < 0.0 {
                return Err(IngestError::NegativeCap { node: name.clone() });
            }
        }
    }

    for e in &doc.edges {
        if e.lo < 0.0 {
            return Err(IngestError::NegativeLowerBound { u: e.u.clone(), v: e.v.clone() });
        }
        if e.hi < e.lo {
            return Err(IngestError::HiLessThanLo { u: e.u.clone(), v: e.v.clone() });
        }
        if !doc.nodes.contains_key(&e.u) {
            return Err(IngestError::UnknownNode { name: e.u.clone() });
        }
        if !doc.nodes.contains_key(&e.v) {
            return Err(IngestError::UnknownNode { name: e.v.clone() });
        }
    }

    for (name, &supply) in &doc.supplies {
        if !doc.nodes.contains_key(name) {
            return Err(IngestError::UnknownNode { name: name.clone() });
        }
        if supply <= 0.0 {
            return Err(IngestError::NonPositiveSupply { node: name.clone() });
        }
    }

    if !doc.nodes.contains_key(&doc.sink.id) {
        return Err(IngestError::UnknownNode { name: doc.sink.id.clone() });
    }

    let total_supply: f64 = doc.supplies.values().sum();
    if !approx_eq(total_supply, doc.sink.demand) {
        return Err(IngestError::SupplyDemandMismatch {
            supplies: total_supply,
            demand: doc.sink.demand,
        });
    }

    let nodes = CanonicalIndex::build(doc.nodes.keys().cloned());

    let cap: Vec<Option<f64>> = (0..nodes.len())
        .map(|i| doc.nodes[nodes.name_at(i)].cap)
        .collect();

    let edges: Vec<Edge> = doc
        .edges
        .iter()
        .map(|e| Edge {
            u: nodes.index_of(&e.u).unwrap(),
            v: nodes.index_of(&e.v).unwrap(),
            lo: e.lo,
            hi: e.hi,
        })
        .collect();

    let supplies: Vec<(usize, f64)> = doc
        .supplies
        .iter()
        .map(|(name, &s)| (nodes.index_of(name).unwrap(), s))
        .collect();

    let sink = nodes.index_of(&doc.sink.id).unwrap();

    Ok(NormalizedBelts { nodes, cap, edges, supplies, sink, sink_demand: doc.sink.demand })
}
