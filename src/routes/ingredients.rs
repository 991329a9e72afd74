use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::models::Ingredient;

#[derive(Deserialize)]
pub struct IngredientQuery {
    name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/{id}", get(get_ingredient))
}

async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let ingredients: Vec<Ingredient> = match query.name.as_deref().filter(|n| !n.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII, and the search here is
        // a case-sensitive starts-with, so compare the leading substring.
        Some(prefix) => {
            sqlx::query_as(
                "SELECT * FROM ingredients WHERE substr(name, 1, ?) = ? ORDER BY name ASC",
            )
            .bind(prefix.chars().count() as i64)
            .bind(prefix)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name ASC")
                .fetch_all(&state.db)
                .await?
        }
    };
    Ok(Json(ingredients))
}

async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    ingredient.map(Json).ok_or(ApiError::NotFound)
}
