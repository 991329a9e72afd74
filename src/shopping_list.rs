//! Shopping-list aggregation: every ingredient of every recipe in the
//! user's cart, grouped by (name, unit) with amounts summed.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Pure read; ordered by ingredient name for a stable rendering.
pub async fn build_shopping_list(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ShoppingListLine>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        JOIN shopping_cart_entries sc ON sc.recipe_id = ri.recipe_id
        WHERE sc.user_id = ?
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Render the aggregated lines as the plain-text download artifact.
pub fn render_shopping_list(lines: &[ShoppingListLine]) -> String {
    let mut out = String::from("Shopping list\n\n");
    for line in lines {
        out.push_str(&format!(
            "- {} ({}): {}\n",
            line.name, line.measurement_unit, line.total_amount
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_ingredient() {
        let lines = vec![
            ShoppingListLine {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 500,
            },
            ShoppingListLine {
                name: "sugar".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 50,
            },
        ];
        let text = render_shopping_list(&lines);
        assert!(text.contains("- flour (g): 500"));
        assert!(text.contains("- sugar (g): 50"));
    }

    #[test]
    fn renders_header_only_for_empty_cart() {
        let text = render_shopping_list(&[]);
        assert_eq!(text, "Shopping list\n\n");
    }
}
