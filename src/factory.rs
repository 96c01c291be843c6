//! Factory Steady-State Solver (spec §4): Ingest → Normalize → Reduce →
//! Solve → Verify → Emit, one document in, one document out.

pub mod io;
pub mod model;
pub mod normalizer;
pub mod reducer;
pub mod solver;
pub mod verify;

use std::collections::BTreeMap;

use crate::common::CoreError;
use io::{FactoryFeasible, FactoryInfeasible, FactoryOutput};
use solver::SolveOutcome;

pub fn run(input: &str) -> Result<FactoryOutput, CoreError> {
    let doc: io::FactoryDoc =
        serde_json::from_str(input).map_err(|e| CoreError::Malformed(anyhow::anyhow!(e)))?;

    let model = normalizer::normalize(doc).map_err(|e| CoreError::Malformed(anyhow::anyhow!(e)))?;

    let outcome = solver::solve(&model).map_err(CoreError::NumericFailure)?;

    verify::verify(&model, &outcome).map_err(CoreError::NumericFailure)?;

    Ok(assemble(&model, outcome))
}

fn assemble(model: &normalizer::NormalizedFactory, outcome: SolveOutcome) -> FactoryOutput {
    match outcome {
        SolveOutcome::Feasible { rates, machines_used, raw_usage } => {
            FactoryOutput::Feasible(FactoryFeasible {
                feasible: true,
                rates: named_rates(model, &rates),
                machines: named_machines(model, &machines_used),
                raw_usage: named_raw_usage(model, &raw_usage),
            })
        }
        SolveOutcome::Infeasible { max_target_rate, rates, bottlenecks } => {
            FactoryOutput::Infeasible(FactoryInfeasible {
                feasible: false,
                max_target_rate,
                rates: named_rates(model, &rates),
                bottlenecks,
            })
        }
    }
}

fn named_rates(model: &normalizer::NormalizedFactory, rates: &[f64]) -> BTreeMap<String, f64> {
    (0..model.num_recipes())
        .map(|col| (model.recipes.name_at(col).to_string(), rates[col]))
        .collect()
}

fn named_machines(model: &normalizer::NormalizedFactory, machines_used: &[f64]) -> BTreeMap<String, f64> {
    (0..model.num_machines())
        .map(|m| (model.machines.name_at(m).to_string(), machines_used[m]))
        .collect()
}

fn named_raw_usage(
    model: &normalizer::NormalizedFactory,
    raw_usage: &BTreeMap<usize, f64>,
) -> BTreeMap<String, f64> {
    raw_usage
        .iter()
        .map(|(&item, &used)| (model.items.name_at(item).to_string(), used))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_feasible_document() {
        let input = r#"{
            "target": {"item": "A", "rate": 1.0},
            "machines": {
                "M": {"base_speed": 1.0, "max": 10, "modules": {"speed": 0.0, "productivity": 0.0}}
            },
            "recipes": {
                "A_rec": {"machine": "M", "time": 60.0, "in": {"ore": 1.0}, "out": {"A": 1.0}}
            }
        }"#;

        match run(input).unwrap() {
            FactoryOutput::Feasible(f) => {
                assert!(f.feasible);
                assert_eq!(f.rates.get("A_rec"), Some(&1.0));
            }
            FactoryOutput::Infeasible(_) => panic!("expected feasible"),
        }
    }

    #[test]
    fn malformed_json_is_a_core_error() {
        assert!(matches!(run("{not json"), Err(CoreError::Malformed(_))));
    }

    #[test]
    fn permuted_key_order_is_deterministic() {
        let a = r#"{
            "target": {"item": "A", "rate": 1.0},
            "machines": {"M": {"base_speed": 1.0, "max": 10, "modules": {"speed": 0.0, "productivity": 0.0}}},
            "recipes": {"A_rec": {"machine": "M", "time": 60.0, "in": {"ore": 1.0}, "out": {"A": 1.0}}}
        }"#;
        let b = r#"{
            "recipes": {"A_rec": {"out": {"A": 1.0}, "in": {"ore": 1.0}, "time": 60.0, "machine": "M"}},
            "target": {"rate": 1.0, "item": "A"},
            "machines": {"M": {"modules": {"productivity": 0.0, "speed": 0.0}, "max": 10, "base_speed": 1.0}}
        }"#;

        let out_a = serde_json::to_string(&run(a).unwrap()).unwrap();
        let out_b = serde_json::to_string(&run(b).unwrap()).unwrap();
        assert_eq!(out_a, out_b);
    }
}
