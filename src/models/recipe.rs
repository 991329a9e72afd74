use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: String,
    pub author_id: String,
    pub name: String,
    // Opaque reference; image storage is handled outside this service.
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Recipe {
    pub fn new(author_id: String, name: String, image: String, text: String, cooking_time: i64) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            author_id,
            name,
            image,
            text,
            cooking_time,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Junction row carrying the quantity of one ingredient in one recipe.
/// Rows live and die with their recipe; the set is replaced wholesale on
/// update, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeIngredient {
    pub recipe_id: String,
    pub ingredient_id: String,
    pub amount: i64,
}
