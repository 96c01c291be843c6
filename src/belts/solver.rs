//! Orchestrates the belts reduction, the deterministic Dinic solve and the
//! certifier into the single entry point the module root calls.

use crate::belts::certifier::{self, BeltsOutcome};
use crate::belts::normalizer::NormalizedBelts;
use crate::belts::reducer;

pub fn solve(model: &NormalizedBelts) -> BeltsOutcome {
    let mut reduction = reducer::build(model);
    let total_flow = reduction.graph.max_flow(reduction.source_star, reduction.sink_star);
    certifier::certify(model, &reduction, total_flow)
}
