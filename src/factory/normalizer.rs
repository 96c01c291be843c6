use crate::common::prelude::*;
use crate::factory::io::FactoryDoc;
use crate::factory::model::{ItemQuantities, ItemRole, MachineType, Recipe};

/// Cap used for an item that appears as a recipe input but is produced by
/// no recipe and is not declared in `raws`: an implicit unlimited raw
/// supply (spec §4.2, "unlimited raws use a very large cap, e.g., 10^18").
const UNLIMITED_RAW_CAP: f64 = 1e18;

/// Fatal ingest errors: malformed input per spec §7 kind 1. Always
/// surfaces as [`CoreError::Malformed`] and never reaches the solver.
#[derive(Debug)]
pub enum IngestError {
    UnknownMachine { recipe: String, machine: String },
    NegativeQuantity { recipe: String, item: String },
    NonPositiveTime { recipe: String },
    NonPositiveBaseSpeed { machine: String },
    NegativeTargetRate,
    NegativeRawCap { item: String },
    NegativeModuleProductivity { machine: String },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::UnknownMachine { recipe, machine } =>
                write!(f, "recipe \"{recipe}\" references unknown machine \"{machine}\""),
            IngestError::NegativeQuantity { recipe, item } =>
                write!(f, "recipe \"{recipe}\" has a negative quantity for item \"{item}\""),
            IngestError::NonPositiveTime { recipe } =>
                write!(f, "recipe \"{recipe}\" has non-positive time"),
            IngestError::NonPositiveBaseSpeed { machine } =>
                write!(f, "machine \"{machine}\" has non-positive base_speed"),
            IngestError::NegativeTargetRate =>
                write!(f, "target rate must be non-negative"),
            IngestError::NegativeRawCap { item } =>
                write!(f, "raw item \"{item}\" has a negative cap"),
            IngestError::NegativeModuleProductivity { machine } =>
                write!(f, "machine \"{machine}\" has negative productivity modules"),
        }
    }
}

impl std::error::Error for IngestError {}

/// Canonicalized, immutable factory model, the output of normalization
/// and the only thing the reducer and solver ever read.
#[derive(Debug)]
pub struct NormalizedFactory {
    pub items: CanonicalIndex,
    pub recipes: CanonicalIndex,
    pub machines: CanonicalIndex,

    pub target_item: usize,
    pub target_rate: f64,
    /// Set when the target item name also appears in `raws`: the documented
    /// edge case where the target is itself a raw item (spec §4.3).
    pub target_raw_cap: Option<f64>,

    pub item_role: Vec<ItemRole>,
    pub machine_max: Vec<u64>,
    /// `prod_mod` per machine type, indexed like `machine_max`. Productivity
    /// multiplies a recipe's outputs only, never its inputs (spec §9 open
    /// question, resolved in DESIGN.md).
    pub machine_prod_mod: Vec<f64>,

    pub recipe_list: Vec<Recipe>,
}

impl NormalizedFactory {
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_recipes(&self) -> usize {
        self.recipes.len()
    }

    pub fn num_machines(&self) -> usize {
        self.machines.len()
    }

    /// Whether any recipe produces the given item at all, the precondition
    /// for the "`<target>_unreachable`" edge case (spec §4.3).
    pub fn item_is_produced(&self, item: usize) -> bool {
        self.recipe_list
            .iter()
            .any(|r| Recipe::quantity_of(&r.outputs, item) > 0.0)
    }
}

pub fn normalize(doc: FactoryDoc) -> Result<NormalizedFactory, IngestError> {
    if doc.target.rate < 0.0 {
        return Err(IngestError::NegativeTargetRate);
    }

    for (item, raw) in &doc.raws {
        if raw.cap < 0.0 {
            return Err(IngestError::NegativeRawCap { item: item.clone() });
        }
    }

    for (name, machine) in &doc.machines {
        if machine.base_speed <= 0.0 {
            return Err(IngestError::NonPositiveBaseSpeed { machine: name.clone() });
        }
        if machine.modules.productivity < 0.0 {
            return Err(IngestError::NegativeModuleProductivity { machine: name.clone() });
        }
    }

    for (name, recipe) in &doc.recipes {
        if recipe.time <= 0.0 {
            return Err(IngestError::NonPositiveTime { recipe: name.clone() });
        }
        if !doc.machines.contains_key(&recipe.machine) {
            return Err(IngestError::UnknownMachine {
                recipe: name.clone(),
                machine: recipe.machine.clone(),
            });
        }
        for (item, qty) in recipe.inputs.iter().chain(recipe.outputs.iter()) {
            if *qty < 0.0 {
                return Err(IngestError::NegativeQuantity {
                    recipe: name.clone(),
                    item: item.clone(),
                });
            }
        }
    }

    let machines = CanonicalIndex::build(doc.machines.keys().cloned());
    let recipes = CanonicalIndex::build(doc.recipes.keys().cloned());

    let machine_types: Vec<MachineType> = (0..machines.len())
        .map(|i| {
            let name = machines.name_at(i).to_string();
            let m = &doc.machines[&name];
            MachineType {
                name,
                base_speed: m.base_speed,
                max_machines: m.max,
                speed_mod: m.modules.speed,
                prod_mod: m.modules.productivity,
            }
        })
        .collect();

    let machine_max: Vec<u64> = machine_types.iter().map(|m| m.max_machines).collect();
    let machine_prod_mod: Vec<f64> = machine_types.iter().map(|m| m.prod_mod).collect();

    // Every item referenced anywhere (target, raws, recipe in/out) is known.
    let mut item_names: Vec<String> = Vec::new();
    item_names.push(doc.target.item.clone());
    item_names.extend(doc.raws.keys().cloned());
    for recipe in doc.recipes.values() {
        item_names.extend(recipe.inputs.keys().cloned());
        item_names.extend(recipe.outputs.keys().cloned());
    }
    let items = CanonicalIndex::build(item_names);

    let target_item = items
        .index_of(&doc.target.item)
        .expect("target item was inserted into the index above");

    let target_raw_cap = doc.raws.get(&doc.target.item).map(|r| r.cap);

    let produced: std::collections::HashSet<&str> = doc
        .recipes
        .values()
        .flat_map(|r| r.outputs.keys())
        .map(|s| s.as_str())
        .collect();

    let item_role: Vec<ItemRole> = (0..items.len())
        .map(|i| {
            let name = items.name_at(i);

            if i == target_item {
                ItemRole::Target
            } else if let Some(raw) = doc.raws.get(name) {
                ItemRole::Raw { cap: raw.cap }
            } else if !produced.contains(name) {
                // Produced by no recipe and not declared in `raws`: an
                // implicit unlimited raw supply (spec §4.2).
                ItemRole::Raw { cap: UNLIMITED_RAW_CAP }
            } else {
                ItemRole::Intermediate
            }
        })
        .collect();

    let recipe_list: Vec<Recipe> = (0..recipes.len())
        .map(|col| {
            let name = recipes.name_at(col).to_string();
            let doc_recipe = &doc.recipes[&name];
            let machine_idx = machines.index_of(&doc_recipe.machine).unwrap();
            let machine = &machine_types[machine_idx];

            let eff_cpm = Recipe::compute_eff_cpm(
                machine.base_speed,
                machine.speed_mod,
                doc_recipe.time,
            );

            let to_sparse = |map: &std::collections::BTreeMap<String, f64>| -> ItemQuantities {
                map.iter()
                    .map(|(item, qty)| (items.index_of(item).unwrap(), *qty))
                    .collect()
            };

            Recipe {
                name,
                machine: machine_idx,
                recipe_time_s: doc_recipe.time,
                inputs: to_sparse(&doc_recipe.inputs),
                outputs: to_sparse(&doc_recipe.outputs),
                eff_cpm,
            }
        })
        .collect();

    Ok(NormalizedFactory {
        items,
        recipes,
        machines,
        target_item,
        target_rate: doc.target.rate,
        target_raw_cap,
        item_role,
        machine_max,
        machine_prod_mod,
        recipe_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::io::*;
    use std::collections::BTreeMap;

    fn doc_single_recipe() -> FactoryDoc {
        let mut inputs = BTreeMap::new();
        inputs.insert("ore".to_string(), 1.0);
        let mut outputs = BTreeMap::new();
        outputs.insert("A".to_string(), 1.0);

        let mut recipes = BTreeMap::new();
        recipes.insert(
            "A_rec".to_string(),
            RecipeDoc { machine: "M".to_string(), time: 60.0, inputs, outputs },
        );

        let mut machines = BTreeMap::new();
        machines.insert(
            "M".to_string(),
            MachineDoc { base_speed: 1.0, max: 10, modules: ModulesDoc { speed: 0.0, productivity: 0.0 } },
        );

        FactoryDoc {
            target: TargetDoc { item: "A".to_string(), rate: 1.0 },
            machines,
            recipes,
            raws: BTreeMap::new(),
        }
    }

    #[test]
    fn rejects_unknown_machine() {
        let mut doc = doc_single_recipe();
        doc.recipes.get_mut("A_rec").unwrap().machine = "Ghost".to_string();

        assert!(matches!(normalize(doc), Err(IngestError::UnknownMachine { .. })));
    }

    #[test]
    fn rejects_negative_quantity() {
        let mut doc = doc_single_recipe();
        doc.recipes.get_mut("A_rec").unwrap().inputs.insert("ore".to_string(), -1.0);

        assert!(matches!(normalize(doc), Err(IngestError::NegativeQuantity { .. })));
    }

    #[test]
    fn classifies_roles_and_sorts_indices() {
        let doc = doc_single_recipe();
        let model = normalize(doc).unwrap();

        assert_eq!(model.items.name_at(model.target_item), "A");
        assert!(matches!(model.item_role[model.target_item], ItemRole::Target));

        // "ore" is consumed but produced by no recipe and not declared in
        // `raws`: an implicit unlimited raw.
        let ore_idx = model.items.index_of("ore").unwrap();
        assert!(matches!(model.item_role[ore_idx], ItemRole::Raw { cap } if cap == super::UNLIMITED_RAW_CAP));
        assert_eq!(model.target_raw_cap, None);
    }

    #[test]
    fn target_that_is_also_raw_is_flagged() {
        let mut doc = doc_single_recipe();
        doc.raws.insert("A".to_string(), RawDoc { cap: 5.0 });

        let model = normalize(doc).unwrap();
        assert_eq!(model.target_raw_cap, Some(5.0));
        assert!(matches!(model.item_role[model.target_item], ItemRole::Target));
    }
}
