use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::FoodGroup;

/// Closed set of food groups the balancer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodGroupKind {
    Vegetables,
    Fruits,
    Legumes,
    Nuts,
    Seeds,
    DairyEggs,
    Other,
}

/// Map from lowercase group name to kind.
static GROUP_NAMES: LazyLock<HashMap<&'static str, FoodGroupKind>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    for name in ["vegetables", "vegetable", "produce", "vegetables/produce"] {
        m.insert(name, FoodGroupKind::Vegetables);
    }
    for name in ["fruits", "fruit"] {
        m.insert(name, FoodGroupKind::Fruits);
    }
    for name in ["legumes", "legume", "pulses"] {
        m.insert(name, FoodGroupKind::Legumes);
    }
    for name in ["nuts", "nut"] {
        m.insert(name, FoodGroupKind::Nuts);
    }
    for name in ["seeds", "seed"] {
        m.insert(name, FoodGroupKind::Seeds);
    }
    for name in [
        "dairy",
        "eggs",
        "egg",
        "dairy & eggs",
        "dairy and eggs",
        "dairy/eggs",
    ] {
        m.insert(name, FoodGroupKind::DairyEggs);
    }
    m
});

impl FoodGroupKind {
    /// Resolve a group name (case-insensitive). Unknown names are `Other`.
    pub fn from_name(name: &str) -> Self {
        GROUP_NAMES
            .get(name.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(FoodGroupKind::Other)
    }

    /// Preservation priority: how strongly the optimizer avoids shrinking it.
    pub fn priority(self) -> u8 {
        match self {
            FoodGroupKind::Vegetables | FoodGroupKind::Fruits => 5,
            FoodGroupKind::Legumes => 4,
            FoodGroupKind::Nuts | FoodGroupKind::Seeds => 3,
            FoodGroupKind::DairyEggs | FoodGroupKind::Other => 0,
        }
    }

    /// Whether the group is in the preservation table.
    pub fn is_preserved(self) -> bool {
        self.priority() > 0
    }
}

/// Pick the group used for priority and role decisions.
///
/// Highest preservation priority wins; ties go to the smallest group id.
/// Returns `None` when the food has no groups.
pub fn classify_food_group(candidates: &[FoodGroup]) -> Option<&FoodGroup> {
    candidates.iter().min_by(|a, b| {
        let pa = FoodGroupKind::from_name(&a.name).priority();
        let pb = FoodGroupKind::from_name(&b.name).priority();
        pb.cmp(&pa).then(a.id.cmp(&b.id))
    })
}
