//! Belts.Certifier (spec §4.6): reads the solved [`Reduction`] back into
//! either a recovered original-edge flow, or a residual-reachable cut
//! certificate, in terms of the caller's own node/edge indices rather than
//! any transformed-graph internals.

use std::collections::HashSet;

use crate::belts::normalizer::NormalizedBelts;
use crate::belts::reducer::Reduction;
use crate::common::prelude::*;

pub enum BeltsOutcome {
    Feasible {
        /// Per original edge, in input order.
        flow: Vec<f64>,
    },
    Infeasible {
        cut_reachable: Vec<usize>,
        demand_balance: f64,
        tight_nodes: Vec<usize>,
        tight_edges: Vec<(usize, usize)>,
    },
}

pub fn certify(model: &NormalizedBelts, reduction: &Reduction, total_flow: f64) -> BeltsOutcome {
    if total_flow >= reduction.required - EPSILON {
        recover_flow(model, reduction)
    } else {
        certify_infeasible(model, reduction, total_flow)
    }
}

fn recover_flow(model: &NormalizedBelts, reduction: &Reduction) -> BeltsOutcome {
    let flow = model
        .edges
        .iter()
        .zip(&reduction.edge_arcs)
        .map(|(edge, &arc)| edge.lo + reduction.graph.flow_on(arc))
        .collect();

    BeltsOutcome::Feasible { flow }
}

fn certify_infeasible(model: &NormalizedBelts, reduction: &Reduction, total_flow: f64) -> BeltsOutcome {
    let vertex_reachable = reduction.graph.residual_reachable(reduction.source_star);

    let node_reachable: Vec<bool> = (0..model.num_nodes())
        .map(|n| vertex_reachable[reduction.in_vertex(n)] || vertex_reachable[reduction.out_vertex(n)])
        .collect();

    let cut_reachable: Vec<usize> = (0..model.num_nodes()).filter(|&n| node_reachable[n]).collect();

    let tight_nodes: Vec<usize> = (0..model.num_nodes())
        .filter(|&n| match model.cap[n] {
            Some(cap) => {
                let arc = reduction.split_arcs[n].expect("capped node has a split arc");
                tight(cap - reduction.graph.flow_on(arc), cap)
            }
            None => false,
        })
        .collect();

    let reachable_set: HashSet<usize> = cut_reachable.iter().copied().collect();
    let tight_edges: Vec<(usize, usize)> = model
        .edges
        .iter()
        .zip(&reduction.edge_arcs)
        .filter(|(edge, &arc)| {
            reachable_set.contains(&edge.u)
                && !reachable_set.contains(&edge.v)
                && le_eps(reduction.graph.residual(arc), 0.0)
        })
        .map(|(edge, _)| (edge.u, edge.v))
        .collect();

    BeltsOutcome::Infeasible {
        cut_reachable,
        demand_balance: reduction.required - total_flow,
        tight_nodes,
        tight_edges,
    }
}
