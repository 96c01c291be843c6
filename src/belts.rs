//! Bounded-Flow Belt Solver (spec §4.4-4.6): Ingest → Normalize → Reduce →
//! MaxFlow → Certify → Verify → Emit.

pub mod certifier;
pub mod io;
pub mod maxflow;
pub mod model;
pub mod normalizer;
pub mod reducer;
pub mod solver;
pub mod verify;

use certifier::BeltsOutcome;
use io::{BeltsFeasible, BeltsInfeasible, BeltsOutput, Deficit, FlowEdgeOut, TightEdge};
use normalizer::NormalizedBelts;

use crate::common::CoreError;

pub fn run(input: &str) -> Result<BeltsOutput, CoreError> {
    let doc: io::BeltsDoc =
        serde_json::from_str(input).map_err(|e| CoreError::Malformed(anyhow::anyhow!(e)))?;

    let model = normalizer::normalize(doc).map_err(|e| CoreError::Malformed(anyhow::anyhow!(e)))?;

    let outcome = solver::solve(&model);

    verify::verify(&model, &outcome).map_err(CoreError::NumericFailure)?;

    Ok(assemble(&model, outcome))
}

fn assemble(model: &NormalizedBelts, outcome: BeltsOutcome) -> BeltsOutput {
    match outcome {
        BeltsOutcome::Feasible { flow } => BeltsOutput::Feasible(BeltsFeasible {
            feasible: true,
            flow: model
                .edges
                .iter()
                .zip(flow)
                .map(|(edge, f)| FlowEdgeOut {
                    u: model.nodes.name_at(edge.u).to_string(),
                    v: model.nodes.name_at(edge.v).to_string(),
                    f,
                })
                .collect(),
        }),
        BeltsOutcome::Infeasible { cut_reachable, demand_balance, tight_nodes, tight_edges } => {
            let mut tight_edges: Vec<TightEdge> = tight_edges
                .into_iter()
                .map(|(u, v)| TightEdge {
                    u: model.nodes.name_at(u).to_string(),
                    v: model.nodes.name_at(v).to_string(),
                })
                .collect();
            tight_edges.sort_by(|a, b| (&a.u, &a.v).cmp(&(&b.u, &b.v)));

            BeltsOutput::Infeasible(BeltsInfeasible {
                feasible: false,
                cut_reachable: cut_reachable
                    .into_iter()
                    .map(|n| model.nodes.name_at(n).to_string())
                    .collect(),
                deficit: Deficit {
                    demand_balance,
                    tight_nodes: tight_nodes
                        .into_iter()
                        .map(|n| model.nodes.name_at(n).to_string())
                        .collect(),
                    tight_edges,
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_trivial_chain() {
        let input = r#"{
            "nodes": {"s": {}, "a": {}, "t": {}},
            "edges": [
                {"u": "s", "v": "a", "lo": 0.0, "hi": 10.0},
                {"u": "a", "v": "t", "lo": 0.0, "hi": 10.0}
            ],
            "supplies": {"s": 5.0},
            "sink": {"id": "t", "demand": 5.0}
        }"#;

        match run(input).unwrap() {
            BeltsOutput::Feasible(f) => {
                assert!(f.feasible);
                assert_eq!(f.flow.len(), 2);
                assert_eq!(f.flow[0].f, 5.0);
                assert_eq!(f.flow[1].f, 5.0);
            }
            BeltsOutput::Infeasible(_) => panic!("expected feasible"),
        }
    }

    #[test]
    fn end_to_end_lower_bound_infeasibility() {
        let input = r#"{
            "nodes": {"s": {}, "a": {}, "t": {}},
            "edges": [
                {"u": "s", "v": "a", "lo": 0.0, "hi": 10.0},
                {"u": "a", "v": "t", "lo": 3.0, "hi": 10.0}
            ],
            "supplies": {"s": 2.0},
            "sink": {"id": "t", "demand": 2.0}
        }"#;

        match run(input).unwrap() {
            BeltsOutput::Infeasible(inf) => {
                assert!(!inf.feasible);
                assert!(inf.deficit.demand_balance >= 1.0 - 1e-9);
            }
            BeltsOutput::Feasible(_) => panic!("expected infeasible"),
        }
    }

    #[test]
    fn end_to_end_node_cap_infeasibility() {
        let input = r#"{
            "nodes": {"s": {}, "a": {"cap": 1.0}, "t": {}},
            "edges": [
                {"u": "s", "v": "a", "lo": 0.0, "hi": 10.0},
                {"u": "a", "v": "t", "lo": 0.0, "hi": 10.0}
            ],
            "supplies": {"s": 5.0},
            "sink": {"id": "t", "demand": 5.0}
        }"#;

        match run(input).unwrap() {
            BeltsOutput::Infeasible(inf) => {
                assert_eq!(inf.deficit.tight_nodes, vec!["a".to_string()]);
            }
            BeltsOutput::Feasible(_) => panic!("expected infeasible"),
        }
    }

    #[test]
    fn malformed_json_is_a_core_error() {
        assert!(matches!(run("{not json"), Err(CoreError::Malformed(_))));
    }
}
