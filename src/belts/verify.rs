//! Shared.Verifier for the Belts tool (spec §7, closing paragraph; §8's
//! universal invariants): re-evaluates every claimed constraint directly
//! against the normalized network, independent of the max-flow engine's
//! own bookkeeping.

use crate::belts::certifier::BeltsOutcome;
use crate::belts::normalizer::NormalizedBelts;
use crate::common::prelude::*;

pub fn verify(model: &NormalizedBelts, outcome: &BeltsOutcome) -> Result<(), anyhow::Error> {
    match outcome {
        BeltsOutcome::Feasible { flow } => verify_feasible(model, flow),
        BeltsOutcome::Infeasible { demand_balance, .. } => {
            if !(*demand_balance > EPSILON) {
                anyhow::bail!("infeasibility certificate has non-positive demand balance");
            }
            Ok(())
        }
    }
}

fn verify_feasible(model: &NormalizedBelts, flow: &[f64]) -> Result<(), anyhow::Error> {
    for (edge, &f) in model.edges.iter().zip(flow) {
        if !(le_eps(edge.lo, f) && le_eps(f, edge.hi)) {
            anyhow::bail!("flow {} on an edge violates its bounds [{}, {}]", f, edge.lo, edge.hi);
        }
    }

    let mut net_in = vec![0.0f64; model.num_nodes()];
    let mut net_out = vec![0.0f64; model.num_nodes()];
    for (edge, &f) in model.edges.iter().zip(flow) {
        net_out[edge.u] += f;
        net_in[edge.v] += f;
    }

    let supply_of: std::collections::HashMap<usize, f64> = model.supplies.iter().copied().collect();

    for n in 0..model.num_nodes() {
        let supply = supply_of.get(&n).copied().unwrap_or(0.0);
        let demand = if n == model.sink { model.sink_demand } else { 0.0 };

        if !approx_eq(net_in[n] + supply, net_out[n] + demand) {
            anyhow::bail!(
                "node {} does not balance: in {} + supply {} != out {} + demand {}",
                n,
                net_in[n],
                supply,
                net_out[n],
                demand
            );
        }

        if let Some(cap) = model.cap[n] {
            if !le_eps(net_in[n], cap) {
                anyhow::bail!("node {} throughput {} exceeds cap {}", n, net_in[n], cap);
            }
        }
    }

    Ok(())
}
