//! Wire schema for the Factory tool (spec §6). All maps are `BTreeMap`, not
//! `HashMap`: the wire form is "keys unordered", but serializing a
//! `BTreeMap` always walks keys in sorted order, so every output document
//! is byte-identical regardless of the input's own key order: determinism
//! by construction rather than a separate sorting pass at the I/O boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TargetDoc {
    pub item: String,
    pub rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct ModulesDoc {
    pub speed: f64,
    pub productivity: f64,
}

#[derive(Debug, Deserialize)]
pub struct MachineDoc {
    pub base_speed: f64,
    pub max: u64,
    pub modules: ModulesDoc,
}

#[derive(Debug, Deserialize)]
pub struct RecipeDoc {
    pub machine: String,
    pub time: f64,
    #[serde(rename = "in")]
    pub inputs: BTreeMap<String, f64>,
    #[serde(rename = "out")]
    pub outputs: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawDoc {
    pub cap: f64,
}

#[derive(Debug, Deserialize)]
pub struct FactoryDoc {
    pub target: TargetDoc,
    pub machines: BTreeMap<String, MachineDoc>,
    pub recipes: BTreeMap<String, RecipeDoc>,
    #[serde(default)]
    pub raws: BTreeMap<String, RawDoc>,
}

#[derive(Debug, Serialize)]
pub struct FactoryFeasible {
    pub feasible: bool,
    pub rates: BTreeMap<String, f64>,
    pub machines: BTreeMap<String, f64>,
    pub raw_usage: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct FactoryInfeasible {
    pub feasible: bool,
    pub max_target_rate: f64,
    pub rates: BTreeMap<String, f64>,
    pub bottlenecks: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FactoryOutput {
    Feasible(FactoryFeasible),
    Infeasible(FactoryInfeasible),
}
