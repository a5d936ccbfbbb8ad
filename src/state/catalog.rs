use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::balancer::classifier::{classify_food_group, FoodGroupKind};
use crate::error::Result;
use crate::models::{FoodGroup, FoodId, FoodNutrition};

/// A catalog food together with the group chosen for it.
#[derive(Debug, Clone)]
pub struct ResolvedFood {
    pub nutrition: FoodNutrition,
    /// `None` when the food has no group links.
    pub group: Option<FoodGroup>,
}

impl ResolvedFood {
    pub fn new(nutrition: FoodNutrition) -> Self {
        let group = classify_food_group(&nutrition.groups).cloned();
        Self { nutrition, group }
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.name.as_str())
    }

    pub fn group_kind(&self) -> Option<FoodGroupKind> {
        self.group_name().map(FoodGroupKind::from_name)
    }
}

/// Food data fetched once per call and never mutated afterward.
#[derive(Debug, Clone, Default)]
pub struct FoodContext {
    foods: HashMap<FoodId, ResolvedFood>,
}

impl FoodContext {
    pub fn from_foods(foods: impl IntoIterator<Item = FoodNutrition>) -> Self {
        Self {
            foods: foods
                .into_iter()
                .map(|f| (f.id, ResolvedFood::new(f)))
                .collect(),
        }
    }

    pub fn get(&self, id: FoodId) -> Option<&ResolvedFood> {
        self.foods.get(&id)
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

/// Read-only lookup of nutrition facts and group links.
///
/// One call per balancing request (or per batch). Implementations must not
/// mutate anything; a failure aborts the whole request.
pub trait FoodSource {
    fn lookup(&self, ids: &BTreeSet<FoodId>) -> Result<FoodContext>;
}

/// In-memory food catalog keyed by id.
#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
    foods: HashMap<FoodId, FoodNutrition>,
}

impl FoodCatalog {
    /// Build a catalog; later duplicates of an id win.
    pub fn new(foods: Vec<FoodNutrition>) -> Self {
        let mut map = HashMap::new();
        for food in foods {
            map.insert(food.id, food);
        }
        Self { foods: map }
    }

    pub fn get_food(&self, id: FoodId) -> Option<&FoodNutrition> {
        self.foods.get(&id)
    }

    /// All foods, sorted by id.
    pub fn all_foods(&self) -> Vec<&FoodNutrition> {
        let mut foods: Vec<&FoodNutrition> = self.foods.values().collect();
        foods.sort_by_key(|f| f.id);
        foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl FoodSource for FoodCatalog {
    fn lookup(&self, ids: &BTreeSet<FoodId>) -> Result<FoodContext> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match self.foods.get(id) {
                Some(food) => {
                    trace!(food = %food.debug_string(), "found food");
                    found.push(food.clone());
                }
                None => warn!(food_id = id, "food not in catalog; its macros count as zero"),
            }
        }
        debug!(requested = ids.len(), found = found.len(), "resolved food context");
        Ok(FoodContext::from_foods(found))
    }
}
