//! Factory.TwoPhaseSolver (spec §4.3). Phase 1 checks feasibility at the
//! requested target rate; phase 2, run only on phase-1 infeasibility,
//! maximizes an auxiliary slack variable standing in for the target rate
//! and reads off which constraints are binding at that optimum.

use std::collections::BTreeMap;

use crate::common::prelude::*;
use crate::factory::model::{ItemRole, Recipe};
use crate::factory::normalizer::NormalizedFactory;
use crate::factory::reducer::{self, LpOutcome, Phase};

pub enum SolveOutcome {
    Feasible {
        rates: Vec<f64>,
        machines_used: Vec<f64>,
        raw_usage: BTreeMap<usize, f64>,
    },
    Infeasible {
        max_target_rate: f64,
        rates: Vec<f64>,
        bottlenecks: Vec<String>,
    },
}

pub fn solve(model: &NormalizedFactory) -> Result<SolveOutcome, anyhow::Error> {
    // Edge case (spec §4.3): target is itself a raw item. There is no
    // recipe-based equality row for it at all; feasibility is a direct
    // comparison against the external supply cap.
    if let Some(cap) = model.target_raw_cap {
        return Ok(solve_target_is_raw(model, cap));
    }

    match reducer::build_and_solve(model, Phase::Feasibility(model.target_rate)) {
        LpOutcome::Optimal { rates, .. } => {
            let usage = Usage::compute(model, &rates);
            Ok(SolveOutcome::Feasible {
                rates,
                machines_used: usage.machines_used,
                raw_usage: usage.raw_usage,
            })
        }
        LpOutcome::Infeasible => solve_maximum_rate(model),
        LpOutcome::NumericFailure(err) => Err(err),
    }
}

fn solve_target_is_raw(model: &NormalizedFactory, cap: f64) -> SolveOutcome {
    let rates = vec![0.0; model.num_recipes()];

    if le_eps(model.target_rate, cap) {
        let mut raw_usage = BTreeMap::new();
        raw_usage.insert(model.target_item, model.target_rate);
        SolveOutcome::Feasible { rates, machines_used: vec![0.0; model.num_machines()], raw_usage }
    } else {
        SolveOutcome::Infeasible {
            max_target_rate: cap,
            rates,
            bottlenecks: vec![format!("{}_supply", model.items.name_at(model.target_item))],
        }
    }
}

fn solve_maximum_rate(model: &NormalizedFactory) -> Result<SolveOutcome, anyhow::Error> {
    // Edge case (spec §4.3): no recipe produces the target at all. The LP
    // would converge to `t* = 0` on its own, but the bottleneck naming
    // needs the synthesized "<target>_unreachable" label rather than
    // whatever (non-)binding ordinary row happens to show zero slack.
    if !model.item_is_produced(model.target_item) {
        return Ok(SolveOutcome::Infeasible {
            max_target_rate: 0.0,
            rates: vec![0.0; model.num_recipes()],
            bottlenecks: vec![format!("{}_unreachable", model.items.name_at(model.target_item))],
        });
    }

    match reducer::build_and_solve(model, Phase::Maximize) {
        LpOutcome::Optimal { rates, t } => {
            let max_target_rate = t.unwrap_or(0.0);
            let usage = Usage::compute(model, &rates);
            let bottlenecks = name_bottlenecks(model, &usage);

            Ok(SolveOutcome::Infeasible { max_target_rate, rates, bottlenecks })
        }
        LpOutcome::Infeasible => {
            anyhow::bail!("phase 2 (maximize target rate) reported infeasible; the LP has no zero point")
        }
        LpOutcome::NumericFailure(err) => Err(err),
    }
}

/// Net item balances, machine usage and raw usage recomputed directly from
/// a recovered rate vector against the *original* constraints, not read
/// back out of the LP engine's internal slack/dual state. This both
/// verifies the solution (spec §4.3's "numeric discipline" paragraph) and
/// supplies the numbers the bottleneck naming and output emission need.
struct Usage {
    machines_used: Vec<f64>,
    raw_usage: BTreeMap<usize, f64>,
}

impl Usage {
    fn compute(model: &NormalizedFactory, rates: &[f64]) -> Self {
        let mut machines_used = vec![0.0; model.num_machines()];
        for (col, recipe) in model.recipe_list.iter().enumerate() {
            if recipe.is_runnable() {
                machines_used[recipe.machine] += rates[col] / recipe.eff_cpm;
            }
        }

        let mut raw_usage = BTreeMap::new();
        for item in 0..model.num_items() {
            if let ItemRole::Raw { .. } = model.item_role[item] {
                raw_usage.insert(item, net_consumption(model, rates, item));
            }
        }

        Self { machines_used, raw_usage }
    }
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

/// Deterministic order: machines lexicographic before raws lexicographic
/// (spec §4.3).
fn name_bottlenecks(model: &NormalizedFactory, usage: &Usage) -> Vec<String> {
    let mut names = Vec::new();

    for machine in 0..model.num_machines() {
        let max = model.machine_max[machine] as f64;
        let slack = max - usage.machines_used[machine];
        if tight(slack, max) {
            names.push(format!("{}_cap", model.machines.name_at(machine)));
        }
    }

    for (&item, &used) in &usage.raw_usage {
        if let ItemRole::Raw { cap } = model.item_role[item] {
            let slack = cap - used;
            if tight(slack, cap) {
                names.push(format!("{}_supply", model.items.name_at(item)));
            }
        }
    }

    names
}
