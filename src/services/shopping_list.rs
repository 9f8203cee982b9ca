//! Plain-text shopping list rendering

use chrono::NaiveDate;

use crate::models::ShoppingListItem;

/// Render the downloadable shopping list
///
/// Ingredients arrive aggregated and ordered; names are capitalized.
pub fn render_shopping_list(
    items: &[ShoppingListItem],
    recipe_names: &[String],
    date: NaiveDate,
) -> String {
    let ingredients_section = if items.is_empty() {
        "No ingredients".to_string()
    } else {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                format!(
                    "{}. {} — {} {}",
                    index + 1,
                    capitalize(&item.name),
                    item.total_amount,
                    item.measurement_unit
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let recipes_section = if recipe_names.is_empty() {
        "No recipes".to_string()
    } else {
        recipe_names
            .iter()
            .enumerate()
            .map(|(index, name)| format!("{}. {name}", index + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };

    [
        format!("Shopping list compiled: {}", date.format("%d-%m-%Y")),
        "Products:".to_string(),
        ingredients_section,
        String::new(),
        "Recipes in this shopping list:".to_string(),
        recipes_section,
    ]
    .join("\n")
}

/// First character upper-cased, the rest lower-cased
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
