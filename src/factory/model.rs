//! Canonicalized factory entities. Everything here is built once by
//! [`crate::factory::normalizer`] and is immutable for the rest of the
//! solve; no entity is mutated once normalization returns.

use crate::common::prelude::*;

/// An item's role, decided once during normalization rather than
/// re-derived ad hoc at each use site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemRole {
    /// The single requested item. Its conservation row is an equality
    /// pinned to the requested rate (or to the auxiliary `t` in phase 2).
    Target,
    /// Bounded external supply; its conservation row is a `<=` inequality
    /// on net consumption.
    Raw { cap: f64 },
    /// Must balance to zero: production exactly meets consumption.
    Intermediate,
}

/// One machine type, with its module-adjusted multipliers precomputed.
#[derive(Debug, Clone)]
pub struct MachineType {
    pub name: String,
    pub base_speed: f64,
    pub max_machines: u64,
    pub speed_mod: f64,
    pub prod_mod: f64,
}

/// A sparse item → quantity contribution, indexed by canonical item row.
pub type ItemQuantities = Vec<(usize, f64)>;

/// One recipe, canonicalized: its machine, crafting rate and in/out
/// quantities reference items and machines by canonical index, not by
/// name, and `eff_cpm` is precomputed.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub machine: usize,
    pub recipe_time_s: f64,
    pub inputs: ItemQuantities,
    pub outputs: ItemQuantities,
    /// Effective crafts per minute for one machine of this recipe's type.
    /// Zero when `1 + speed_mod <= 0`, in which case the recipe is
    /// unrunnable and its rate variable is pinned to zero.
    pub eff_cpm: f64,
}

impl Recipe {
    /// `base_speed(m) * (1 + speed_mod(m)) * 60 / recipe_time_s`, or `0`
    /// when the machine's speed modules make it unrunnable.
    pub fn compute_eff_cpm(base_speed: f64, speed_mod: f64, recipe_time_s: f64) -> f64 {
        let speed_factor = 1.0 + speed_mod;

        if speed_factor <= 0.0 {
            0.0
        } else {
            base_speed * speed_factor * 60.0 / recipe_time_s
        }
    }

    pub fn is_runnable(&self) -> bool {
        self.eff_cpm > 0.0
    }

    pub fn quantity_of(terms: &ItemQuantities, item: usize) -> f64 {
        terms
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, qty)| *qty)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eff_cpm_basic() {
        // one machine, base speed 1, no modules, 60s recipe -> 1 craft/min
        assert!(approx_eq(Recipe::compute_eff_cpm(1.0, 0.0, 60.0), 1.0));
    }

    #[test]
    fn eff_cpm_with_speed_module() {
        // +50% speed, 60s recipe -> 1.5 crafts/min
        assert!(approx_eq(Recipe::compute_eff_cpm(1.0, 0.5, 60.0), 1.5));
    }

    #[test]
    fn negative_total_speed_is_unrunnable() {
        assert_eq!(Recipe::compute_eff_cpm(1.0, -1.5, 60.0), 0.0);
        assert_eq!(Recipe::compute_eff_cpm(1.0, -1.0, 60.0), 0.0);
    }
}
