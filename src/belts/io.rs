//! Wire schema for the Belts tool (spec §6). `nodes` and `supplies` are
//! `BTreeMap`; `edges` is a plain `Vec` since the output's `flow` list must
//! echo input edge order verbatim rather than a canonicalized one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct NodeDoc {
    #[serde(default)]
    pub cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeDoc {
    pub u: String,
    pub v: String,
    pub lo: f64,
    pub hi: f64,
}

#[derive(Debug, Deserialize)]
pub struct SinkDoc {
    pub id: String,
    pub demand: f64,
}

#[derive(Debug, Deserialize)]
pub struct BeltsDoc {
    pub nodes: BTreeMap<String, NodeDoc>,
    pub edges: Vec<EdgeDoc>,
    #[serde(default)]
    pub supplies: BTreeMap<String, f64>,
    pub sink: SinkDoc,
}

#[derive(Debug, Serialize, Clone)]
pub struct FlowEdgeOut {
    pub u: String,
    pub v: String,
    pub f: f64,
}

#[derive(Debug, Serialize)]
pub struct BeltsFeasible {
    pub feasible: bool,
    pub flow: Vec<FlowEdgeOut>,
}

#[derive(Debug, Serialize, Clone)]
pub struct TightEdge {
    pub u: String,
    pub v: String,
}

#[derive(Debug, Serialize)]
pub struct Deficit {
    pub demand_balance: f64,
    pub tight_nodes: Vec<String>,
    pub tight_edges: Vec<TightEdge>,
}

#[derive(Debug, Serialize)]
pub struct BeltsInfeasible {
    pub feasible: bool,
    pub cut_reachable: Vec<String>,
    pub deficit: Deficit,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BeltsOutput {
    Feasible(BeltsFeasible),
    Infeasible(BeltsInfeasible),
}
