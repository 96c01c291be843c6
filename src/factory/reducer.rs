//! Builds the linear program described in spec §4.2 directly in terms of
//! `good_lp`'s expression builder, grounded on the retrieved pack's own
//! Factorio-production solver
//! (`other_examples/067b31a2_sadlerap-factorio-optimizer__src-solver.rs.rs`),
//! which wires the same `variables!`/`constraint!`/`Solution` surface to
//! the same domain: one variable per recipe, one balance row per item.

use anyhow::anyhow;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel};
use good_lp::solvers::highs::highs;

use crate::common::prelude::*;
use crate::factory::model::{ItemRole, Recipe};
use crate::factory::normalizer::NormalizedFactory;

/// Which LP this reduction builds: the phase-1 feasibility check at a
/// fixed target rate, or the phase-2 maximization of an auxiliary slack
/// variable `t` standing in for the achievable target rate.
#[derive(Clone, Copy)]
pub enum Phase {
    Feasibility(f64),
    Maximize,
}

/// Outcome of building and solving one phase's LP, already translated from
/// `good_lp`'s solver-specific result into the three-way status the spec
/// names in §9 ("exceptions for control flow" becomes an explicit tag).
pub enum LpOutcome {
    Optimal { rates: Vec<f64>, t: Option<f64> },
    Infeasible,
    NumericFailure(anyhow::Error),
}

pub fn build_and_solve(model: &NormalizedFactory, phase: Phase) -> LpOutcome {
    let mut vars = variables!();

    let recipe_vars: Vec<_> = model
        .recipe_list
        .iter()
        .map(|recipe| {
            let def = variable().min(0.0).name(format!("x_{}", recipe.name));
            let def = if recipe.is_runnable() { def } else { def.max(0.0) };
            vars.add(def)
        })
        .collect();

    let aux_t = match phase {
        Phase::Maximize => Some(vars.add(variable().min(0.0).name("t"))),
        Phase::Feasibility(_) => None,
    };

    let conservation: Vec<Expression> = (0..model.num_items())
        .map(|item| conservation_expr(model, &recipe_vars, item))
        .collect();

    let objective = match phase {
        Phase::Feasibility(_) => total_machines_expr(model, &recipe_vars),
        Phase::Maximize => Expression::from(aux_t.unwrap()),
    };

    let mut problem = match phase {
        Phase::Feasibility(_) => vars.minimise(objective).using(highs),
        Phase::Maximize => vars.maximise(objective).using(highs),
    };

    for item in 0..model.num_items() {
        let expr = conservation[item].clone();

        match model.item_role[item] {
            ItemRole::Target => match aux_t {
                Some(t) => {
                    let t_expr = Expression::from(t);
                    problem.add_constraint(constraint!(expr == t_expr));
                }
                None => {
                    let Phase::Feasibility(rate) = phase else { unreachable!() };
                    problem.add_constraint(constraint!(expr == rate));
                }
            },
            ItemRole::Intermediate => problem.add_constraint(constraint!(expr == 0.0)),
            ItemRole::Raw { cap } => {
                // net consumption = in - out*(1+prod) = -conservation_expr,
                // so net_consumption <= cap  <=>  conservation_expr >= -cap
                problem.add_constraint(constraint!(expr >= -cap));
            }
        }
    }

    for machine in 0..model.num_machines() {
        let mut usage = Expression::from(0.0);
        for (col, recipe) in model.recipe_list.iter().enumerate() {
            if recipe.machine == machine && recipe.is_runnable() {
                usage += (1.0 / recipe.eff_cpm) * recipe_vars[col];
            }
        }
        problem.add_constraint(constraint!(usage <= model.machine_max[machine] as f64));
    }

    match problem.solve() {
        Ok(solution) => LpOutcome::Optimal {
            rates: recipe_vars.iter().map(|v| solution.value(*v).max(0.0)).collect(),
            t: aux_t.map(|t| solution.value(t).max(0.0)),
        },
        Err(ResolutionError::Infeasible) => LpOutcome::Infeasible,
        Err(other) => LpOutcome::NumericFailure(anyhow!("LP engine returned {other}")),
    }
}

/// `Σ_r out_r[item]*(1+prod_mod(m(r)))*x_r − Σ_r in_r[item]*x_r`, the
/// left-hand side shared by every conservation/raw row (spec §4.2).
fn conservation_expr(
    model: &NormalizedFactory,
    recipe_vars: &[good_lp::Variable],
    item: usize,
) -> Expression {
    let mut expr = Expression::from(0.0);

    for (col, recipe) in model.recipe_list.iter().enumerate() {
        let out_qty = Recipe::quantity_of(&recipe.outputs, item);
        let in_qty = Recipe::quantity_of(&recipe.inputs, item);

        if out_qty != 0.0 {
            let prod = model.machine_prod_mod[recipe.machine];
            expr += out_qty * (1.0 + prod) * recipe_vars[col];
        }
        if in_qty != 0.0 {
            expr -= in_qty * recipe_vars[col];
        }
    }

    expr
}

fn total_machines_expr(model: &NormalizedFactory, recipe_vars: &[good_lp::Variable]) -> Expression {
    let mut expr = Expression::from(0.0);

    for (col, recipe) in model.recipe_list.iter().enumerate() {
        if recipe.is_runnable() {
            expr += (1.0 / recipe.eff_cpm) * recipe_vars[col];
        }
    }

    expr
}
