//! Shared.Verifier for the Factory tool (spec §7, closing paragraph): before
//! any output document leaves the pipeline, every constraint it claims to
//! satisfy is re-evaluated independently from the solver's own bookkeeping.
//! A verification failure is a [`crate::common::CoreError::NumericFailure`],
//! never a silently-emitted wrong answer.

use crate::common::prelude::*;
use crate::factory::model::{ItemRole, Recipe};
use crate::factory::normalizer::NormalizedFactory;
use crate::factory::solver::SolveOutcome;

pub fn verify(model: &NormalizedFactory, outcome: &SolveOutcome) -> Result<(), anyhow::Error> {
    match outcome {
        SolveOutcome::Feasible { rates, machines_used, raw_usage } => {
            verify_rates_nonnegative(rates)?;
            verify_conservation(model, rates)?;
            verify_machine_caps(model, machines_used)?;
            verify_raw_caps(model, raw_usage)?;
            verify_target_rate(model, rates, model.target_rate)?;
        }
        SolveOutcome::Infeasible { max_target_rate, rates, .. } => {
            verify_rates_nonnegative(rates)?;
            if model.target_raw_cap.is_none() && model.item_is_produced(model.target_item) {
                verify_conservation(model, rates)?;
                verify_target_rate(model, rates, *max_target_rate)?;
            }
        }
    }

    Ok(())
}

fn verify_rates_nonnegative(rates: &[f64]) -> Result<(), anyhow::Error> {
    if rates.iter().any(|&r| !ge_neg_eps(r)) {
        anyhow::bail!("recovered a negative recipe rate");
    }
    Ok(())
}

fn verify_target_rate(model: &NormalizedFactory, rates: &[f64], expected: f64) -> Result<(), anyhow::Error> {
    let produced = net_consumption(model, rates, model.target_item);
    // net_consumption is in minus out; the target is pure demand, so its
    // net consumption should equal minus the produced/delivered rate.
    if !approx_eq(-produced, expected) {
        anyhow::bail!(
            "target rate mismatch: recomputed {} but expected {}",
            -produced,
            expected
        );
    }
    Ok(())
}

fn verify_conservation(model: &NormalizedFactory, rates: &[f64]) -> Result<(), anyhow::Error> {
    for item in 0..model.num_items() {
        if let ItemRole::Intermediate = model.item_role[item] {
            let net = net_consumption(model, rates, item);
            if !approx_eq(net, 0.0) {
                anyhow::bail!(
                    "item \"{}\" does not balance: net consumption {}",
                    model.items.name_at(item),
                    net
                );
            }
        }
    }
    Ok(())
}

fn verify_machine_caps(model: &NormalizedFactory, machines_used: &[f64]) -> Result<(), anyhow::Error> {
    for machine in 0..model.num_machines() {
        let max = model.machine_max[machine] as f64;
        if !le_eps(machines_used[machine], max) {
            anyhow::bail!(
                "machine \"{}\" usage {} exceeds cap {}",
                model.machines.name_at(machine),
                machines_used[machine],
                max
            );
        }
    }
    Ok(())
}

fn verify_raw_caps(
    model: &NormalizedFactory,
    raw_usage: &std::collections::BTreeMap<usize, f64>,
) -> Result<(), anyhow::Error> {
    for (&item, &used) in raw_usage {
        if let ItemRole::Raw { cap } = model.item_role[item] {
            if !le_eps(used, cap) {
                anyhow::bail!(
                    "raw item \"{}\" usage {} exceeds cap {}",
                    model.items.name_at(item),
                    used,
                    cap
                );
            }
        }
    }
    Ok(())
}

fn net_consumption(model: &NormalizedFactory, rates: &[f64], item: usize) -> f64 {
    model
        .recipe_list
        .iter()
        .enumerate()
        .map(|(col, recipe)| {
            let in_qty = Recipe::quantity_of(&recipe.inputs, item);
            let out_qty = Recipe::quantity_of(&recipe.outputs, item);
            let prod = model.machine_prod_mod[recipe.machine];
            (in_qty - out_qty * (1.0 + prod)) * rates[col]
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::io::*;
    use std::collections::BTreeMap as Map;

    fn model_single_recipe() -> NormalizedFactory {
        let mut inputs = Map::new();
        inputs.insert("ore".to_string(), 1.0);
        let mut outputs = Map::new();
        outputs.insert("A".to_string(), 1.0);

        let mut recipes = Map::new();
        recipes.insert(
            "A_rec".to_string(),
            RecipeDoc { machine: "M".to_string(), time: 60.0, inputs, outputs },
        );

        let mut machines = Map::new();
        machines.insert(
            "M".to_string(),
            MachineDoc { base_speed: 1.0, max: 10, modules: ModulesDoc { speed: 0.0, productivity: 0.0 } },
        );

        let doc = FactoryDoc {
            target: TargetDoc { item: "A".to_string(), rate: 1.0 },
            machines,
            recipes,
            raws: Map::new(),
        };

        crate::factory::normalizer::normalize(doc).unwrap()
    }

    #[test]
    fn accepts_a_correct_feasible_solution() {
        let model = model_single_recipe();
        let outcome = crate::factory::solver::solve(&model).unwrap();
        assert!(verify(&model, &outcome).is_ok());
    }

    #[test]
    fn rejects_a_tampered_rate_vector() {
        let model = model_single_recipe();
        let tampered = SolveOutcome::Feasible {
            rates: vec![0.5],
            machines_used: vec![0.5],
            raw_usage: Map::new(),
        };
        assert!(verify(&model, &tampered).is_err());
    }
}
