use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::AppState;
use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::models::User;
use crate::routes::recipes::RecipeSummary;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Author view embedded in subscription listings: the profile plus a
/// preview of their newest recipes and the full recipe count. The count
/// ignores `recipes_limit`; only the preview is truncated.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

#[derive(Deserialize)]
pub struct SubscriptionQuery {
    recipes_limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
}

pub async fn viewer_is_subscribed(
    pool: &SqlitePool,
    viewer_id: Option<&str>,
    author_id: &str,
) -> Result<bool, sqlx::Error> {
    let Some(viewer_id) = viewer_id else {
        return Ok(false);
    };
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM subscriptions WHERE follower_id = ? AND author_id = ?",
    )
    .bind(viewer_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

async fn build_subscription_view(
    pool: &SqlitePool,
    author: &User,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionView, ApiError> {
    let recipes: Vec<RecipeSummary> = match recipes_limit {
        Some(limit) => {
            sqlx::query_as(
                "SELECT id, name, image, cooking_time FROM recipes WHERE author_id = ? ORDER BY created_at DESC LIMIT ?",
            )
            .bind(&author.id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, name, image, cooking_time FROM recipes WHERE author_id = ? ORDER BY created_at DESC",
            )
            .bind(&author.id)
            .fetch_all(pool)
            .await?
        }
    };

    let recipes_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(&author.id)
        .fetch_one(pool)
        .await?;

    Ok(SubscriptionView {
        id: author.id.clone(),
        email: author.email.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: true,
        recipes,
        recipes_count: recipes_count.0,
    })
}

async fn list_users(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY username ASC")
        .fetch_all(&state.db)
        .await?;

    let mut views = Vec::with_capacity(users.len());
    for user in &users {
        let subscribed =
            viewer_is_subscribed(&state.db, viewer.as_ref().map(|v| v.id.as_str()), &user.id)
                .await?;
        views.push(UserView::new(user, subscribed));
    }
    Ok(Json(views))
}

async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserView>, ApiError> {
    // Re-read so a stale session does not echo outdated profile fields.
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserView::new(&user, false)))
}

async fn get_user(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or(ApiError::NotFound)?;

    let subscribed =
        viewer_is_subscribed(&state.db, viewer.as_ref().map(|v| v.id.as_str()), &user.id).await?;
    Ok(Json(UserView::new(&user, subscribed)))
}

async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Vec<SubscriptionView>>, ApiError> {
    let authors: Vec<User> = sqlx::query_as(
        r#"
        SELECT u.* FROM users u
        JOIN subscriptions s ON s.author_id = u.id
        WHERE s.follower_id = ?
        ORDER BY u.username ASC
        "#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    let mut views = Vec::with_capacity(authors.len());
    for author in &authors {
        views.push(build_subscription_view(&state.db, author, query.recipes_limit).await?);
    }
    Ok(Json(views))
}

async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    let author = author.ok_or(ApiError::NotFound)?;

    // Checked before state: self-subscribe fails even if a row somehow
    // existed.
    if user.id == author.id {
        return Err(ApiError::Conflict(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    let result = sqlx::query(
        "INSERT INTO subscriptions (follower_id, author_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&author.id)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::Conflict(
                "You are already subscribed to this author".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let view = build_subscription_view(&state.db, &author, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let author: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    if author.is_none() {
        return Err(ApiError::NotFound);
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE follower_id = ? AND author_id = ?")
        .bind(&user.id)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "You are not subscribed to this author".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
