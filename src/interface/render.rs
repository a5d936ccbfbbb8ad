use crate::balancer::Tolerances;
use crate::models::{BalanceReport, Macros, RecipeOutcome};
use crate::state::ResolvedFood;

fn format_macros(m: &Macros) -> String {
    format!(
        "P:{:.1} C:{:.1} F:{:.1} ({:.0} kcal)",
        m.proteins,
        m.carbohydrates,
        m.fats,
        m.calories()
    )
}

fn display_recipe(recipe: &RecipeOutcome, targets: &Macros) {
    let label = match recipe.recipe_id {
        Some(id) => format!("Recipe #{}", id),
        None => "Recipe".to_string(),
    };
    let privacy = match recipe.is_private {
        Some(true) => " [private]",
        _ => "",
    };

    println!("=== {}{} ===", label, privacy);

    let outcome = &recipe.outcome;
    if outcome.ingredients.is_empty() {
        println!("  (no ingredients)");
        println!();
        return;
    }

    for (i, item) in outcome.ingredients.iter().enumerate() {
        let row = match item.ingredient_row_id {
            Some(row) => format!("  row {}", row),
            None => String::new(),
        };
        println!("{:>3}. food {:<8} {:>8.1}{}", i + 1, item.food_id, item.quantity, row);
    }

    let tolerances = Tolerances::for_targets(targets);
    let status = if outcome.converged {
        "within tolerance"
    } else {
        "best effort"
    };

    println!();
    println!("Totals:  {}", format_macros(&outcome.totals));
    println!(
        "Allowed: ±{:.1} P, ±{:.1} C, ±{:.1} F",
        tolerances.proteins, tolerances.carbohydrates, tolerances.fats
    );
    println!("Iterations: {} ({})", outcome.iterations, status);
    println!();
}

/// Display a balancing report: one block per recipe.
pub fn display_report(report: &BalanceReport) {
    println!();
    println!("Targets: {}", format_macros(&report.targets));
    println!();

    for recipe in &report.recipes {
        display_recipe(recipe, &report.targets);
    }

    let converged = report
        .recipes
        .iter()
        .filter(|r| r.outcome.converged)
        .count();
    println!("--- Summary ---");
    println!("Recipes: {}", report.recipes.len());
    println!("Within tolerance: {}", converged);
    println!();
}

/// Display each food with the group the balancer treats it as.
pub fn display_classification(foods: &[ResolvedFood]) {
    if foods.is_empty() {
        println!("No foods to classify.");
        return;
    }

    let max_name_len = foods
        .iter()
        .map(|f| f.nutrition.name.len())
        .max()
        .unwrap_or(10);

    println!();
    println!("=== Food groups ({} foods) ===", foods.len());
    println!();

    for food in foods {
        let kind = food.group_kind();
        let group = match (&food.group, kind) {
            (Some(g), Some(kind)) => format!(
                "{} (#{}), priority {}{}",
                g.name,
                g.id,
                kind.priority(),
                if kind.is_preserved() { ", preserved" } else { "" }
            ),
            _ => "ungrouped".to_string(),
        };
        let role = food.nutrition.role.map(|r| r.tag()).unwrap_or("-");
        println!(
            "  #{:<6} {:<width$}  {:<7} {}",
            food.nutrition.id,
            food.nutrition.name,
            role,
            group,
            width = max_name_len
        );
    }

    println!();
}
