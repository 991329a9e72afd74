use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::AppState;
use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::markers::{MarkerKind, add_marker, marker_exists, remove_marker};
use crate::models::{Recipe, RecipeIngredient, Tag, User};
use crate::routes::users::{UserView, viewer_is_subscribed};
use crate::shopping_list::{build_shopping_list, render_shopping_list};
use crate::validate::{
    ValidationError, validate_cooking_time, validate_ingredients, validate_tags,
};

#[derive(Deserialize)]
pub struct RecipeIngredientPayload {
    pub id: String,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct CreateRecipePayload {
    pub ingredients: Vec<RecipeIngredientPayload>,
    pub tags: Vec<String>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

/// Patch payload. Omitted scalar fields keep their stored value; omitted
/// `ingredients`/`tags` keep the stored set, while a supplied list replaces
/// it wholesale. An explicitly empty list is a validation error, so "clear"
/// is not expressible.
#[derive(Deserialize)]
pub struct UpdateRecipePayload {
    pub ingredients: Option<Vec<RecipeIngredientPayload>>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

#[derive(Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecipeIngredientView {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

/// Short view returned by the marker endpoints and embedded in
/// subscription listings.
#[derive(Debug, Serialize, FromRow)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}

async fn fetch_recipe(pool: &SqlitePool, id: &str) -> Result<Recipe, ApiError> {
    let recipe: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    recipe.ok_or(ApiError::NotFound)
}

async fn build_recipe_view(
    pool: &SqlitePool,
    recipe: &Recipe,
    viewer: Option<&User>,
) -> Result<RecipeView, ApiError> {
    let tags: Vec<Tag> = sqlx::query_as(
        r#"
        SELECT t.* FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.name ASC
        "#,
    )
    .bind(&recipe.id)
    .fetch_all(pool)
    .await?;

    let ingredients: Vec<RecipeIngredientView> = sqlx::query_as(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY i.name ASC
        "#,
    )
    .bind(&recipe.id)
    .fetch_all(pool)
    .await?;

    let author: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&recipe.author_id)
        .fetch_one(pool)
        .await?;

    let viewer_id = viewer.map(|v| v.id.as_str());
    let author_subscribed = viewer_is_subscribed(pool, viewer_id, &author.id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(v) => (
            marker_exists(pool, MarkerKind::Favorite, &v.id, &recipe.id).await?,
            marker_exists(pool, MarkerKind::ShoppingCart, &v.id, &recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id.clone(),
        tags,
        author: UserView::new(&author, author_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
    })
}

fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

async fn list_recipes(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeView>>, ApiError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT r.* FROM recipes r WHERE 1 = 1");

    if let Some(author) = query.author.as_ref().filter(|a| !a.is_empty()) {
        qb.push(" AND r.author_id = ");
        qb.push_bind(author.clone());
    }

    let slugs: Vec<String> = query
        .tags
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if !slugs.is_empty() {
        qb.push(
            " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN (",
        );
        {
            let mut separated = qb.separated(", ");
            for slug in slugs {
                separated.push_bind(slug);
            }
        }
        qb.push("))");
    }

    // Marker filters only apply to authenticated viewers; anonymous callers
    // get the unfiltered set.
    if let Some(viewer) = &viewer {
        if flag(query.is_favorited.as_deref()) {
            qb.push(" AND r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ");
            qb.push_bind(viewer.id.clone());
            qb.push(")");
        }
        if flag(query.is_in_shopping_cart.as_deref()) {
            qb.push(" AND r.id IN (SELECT recipe_id FROM shopping_cart_entries WHERE user_id = ");
            qb.push_bind(viewer.id.clone());
            qb.push(")");
        }
    }

    qb.push(" ORDER BY r.created_at DESC");

    let recipes: Vec<Recipe> = qb.build_query_as().fetch_all(&state.db).await?;

    let mut views = Vec::with_capacity(recipes.len());
    for recipe in &recipes {
        views.push(build_recipe_view(&state.db, recipe, viewer.as_ref()).await?);
    }
    Ok(Json(views))
}

async fn get_recipe(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeView>, ApiError> {
    let recipe = fetch_recipe(&state.db, &id).await?;
    let view = build_recipe_view(&state.db, &recipe, viewer.as_ref()).await?;
    Ok(Json(view))
}

async fn ensure_ingredients_exist(
    pool: &SqlitePool,
    items: &[RecipeIngredientPayload],
) -> Result<(), ApiError> {
    for item in items {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ?")
            .bind(&item.id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(ValidationError::UnknownIngredient.into());
        }
    }
    Ok(())
}

async fn ensure_tags_exist(pool: &SqlitePool, tag_ids: &[String]) -> Result<(), ApiError> {
    for id in tag_ids {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(ValidationError::UnknownTag.into());
        }
    }
    Ok(())
}

fn ingredient_pairs(items: &[RecipeIngredientPayload]) -> Vec<(String, i64)> {
    items
        .iter()
        .map(|item| (item.id.clone(), item.amount))
        .collect()
}

async fn insert_ingredient_links(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    recipe_id: &str,
    items: &[RecipeIngredientPayload],
) -> Result<(), sqlx::Error> {
    for item in items {
        let link = RecipeIngredient {
            recipe_id: recipe_id.to_string(),
            ingredient_id: item.id.clone(),
            amount: item.amount,
        };
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(&link.recipe_id)
        .bind(&link.ingredient_id)
        .bind(link.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_ingredients(&ingredient_pairs(&payload.ingredients))?;
    validate_tags(&payload.tags)?;
    validate_cooking_time(payload.cooking_time)?;
    ensure_ingredients_exist(&state.db, &payload.ingredients).await?;
    ensure_tags_exist(&state.db, &payload.tags).await?;

    let recipe = Recipe::new(
        user.id.clone(),
        payload.name,
        payload.image,
        payload.text,
        payload.cooking_time,
    );

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&recipe.id)
    .bind(&recipe.author_id)
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(&recipe.created_at)
    .bind(&recipe.updated_at)
    .execute(&mut *tx)
    .await?;

    insert_ingredient_links(&mut tx, &recipe.id, &payload.ingredients).await?;

    for tag_id in &payload.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(&recipe.id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let view = build_recipe_view(&state.db, &recipe, Some(&user)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRecipePayload>,
) -> Result<Json<RecipeView>, ApiError> {
    let recipe = fetch_recipe(&state.db, &id).await?;
    if recipe.author_id != user.id {
        return Err(ApiError::Forbidden);
    }

    // All validation up front so a bad payload never reaches the
    // transaction.
    if let Some(ingredients) = &payload.ingredients {
        validate_ingredients(&ingredient_pairs(ingredients))?;
        ensure_ingredients_exist(&state.db, ingredients).await?;
    }
    if let Some(tags) = &payload.tags {
        validate_tags(tags)?;
        ensure_tags_exist(&state.db, tags).await?;
    }
    if let Some(cooking_time) = payload.cooking_time {
        validate_cooking_time(cooking_time)?;
    }

    let name = payload.name.unwrap_or_else(|| recipe.name.clone());
    let image = payload.image.unwrap_or_else(|| recipe.image.clone());
    let text = payload.text.unwrap_or_else(|| recipe.text.clone());
    let cooking_time = payload.cooking_time.unwrap_or(recipe.cooking_time);
    let updated_at = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "UPDATE recipes SET name = ?, image = ?, text = ?, cooking_time = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&image)
    .bind(&text)
    .bind(cooking_time)
    .bind(&updated_at)
    .bind(&recipe.id)
    .execute(&mut *tx)
    .await?;

    if let Some(ingredients) = &payload.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(&recipe.id)
            .execute(&mut *tx)
            .await?;
        insert_ingredient_links(&mut tx, &recipe.id, ingredients).await?;
    }

    if let Some(tags) = &payload.tags {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(&recipe.id)
            .execute(&mut *tx)
            .await?;
        for tag_id in tags {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                .bind(&recipe.id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    let updated = fetch_recipe(&state.db, &id).await?;
    let view = build_recipe_view(&state.db, &updated, Some(&user)).await?;
    Ok(Json(view))
}

async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let recipe = fetch_recipe(&state.db, &id).await?;
    if recipe.author_id != user.id {
        return Err(ApiError::Forbidden);
    }

    // Ingredient links, tag links, and marker rows go with it (FK cascade).
    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(&recipe.id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_marker_for(
    state: &AppState,
    kind: MarkerKind,
    user: &User,
    recipe_id: &str,
) -> Result<(StatusCode, Json<RecipeSummary>), ApiError> {
    let recipe = fetch_recipe(&state.db, recipe_id).await?;
    add_marker(&state.db, kind, &user.id, &recipe.id).await?;
    Ok((StatusCode::CREATED, Json(RecipeSummary::from(&recipe))))
}

async fn remove_marker_for(
    state: &AppState,
    kind: MarkerKind,
    user: &User,
    recipe_id: &str,
) -> Result<StatusCode, ApiError> {
    let recipe = fetch_recipe(&state.db, recipe_id).await?;
    remove_marker(&state.db, kind, &user.id, &recipe.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    add_marker_for(&state, MarkerKind::Favorite, &user, &id).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_marker_for(&state, MarkerKind::Favorite, &user, &id).await
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    add_marker_for(&state, MarkerKind::ShoppingCart, &user, &id).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_marker_for(&state, MarkerKind::ShoppingCart, &user, &id).await
}

async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let lines = build_shopping_list(&state.db, &user.id).await?;
    let body = render_shopping_list(&lines);

    let filename = format!(
        "shopping-list-{}.txt",
        chrono::Local::now().format("%Y-%m-%d")
    );
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition).unwrap(),
    );

    Ok((headers, body))
}
