//! Add/remove logic for the two recipe marker relations. A marker row's
//! existence is the whole relation, so both operations are a single
//! statement and the table's primary key serializes concurrent adds:
//! exactly one of two racing adds succeeds, the other sees the
//! unique-constraint violation and reports the conflict.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Favorite,
    ShoppingCart,
}

impl MarkerKind {
    fn insert_sql(&self) -> &'static str {
        match self {
            MarkerKind::Favorite => {
                "INSERT INTO favorites (user_id, recipe_id, created_at) VALUES (?, ?, ?)"
            }
            MarkerKind::ShoppingCart => {
                "INSERT INTO shopping_cart_entries (user_id, recipe_id, created_at) VALUES (?, ?, ?)"
            }
        }
    }

    fn delete_sql(&self) -> &'static str {
        match self {
            MarkerKind::Favorite => "DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?",
            MarkerKind::ShoppingCart => {
                "DELETE FROM shopping_cart_entries WHERE user_id = ? AND recipe_id = ?"
            }
        }
    }

    pub fn already_present_message(&self) -> &'static str {
        match self {
            MarkerKind::Favorite => "Recipe is already in favorites",
            MarkerKind::ShoppingCart => "Recipe is already in the shopping cart",
        }
    }

    pub fn absent_message(&self) -> &'static str {
        match self {
            MarkerKind::Favorite => "Recipe is not in favorites",
            MarkerKind::ShoppingCart => "Recipe is not in the shopping cart",
        }
    }
}

/// ABSENT -> PRESENT. Repeated adds are an error, not a no-op.
pub async fn add_marker(
    pool: &SqlitePool,
    kind: MarkerKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<(), ApiError> {
    let result = sqlx::query(kind.insert_sql())
        .bind(user_id)
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::Conflict(kind.already_present_message().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// PRESENT -> ABSENT. Removing an absent marker is a conflict on the
/// relation, not a missing entity, so it surfaces as 400 rather than 404.
pub async fn remove_marker(
    pool: &SqlitePool,
    kind: MarkerKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<(), ApiError> {
    let result = sqlx::query(kind.delete_sql())
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(kind.absent_message().to_string()));
    }
    Ok(())
}

pub async fn marker_exists(
    pool: &SqlitePool,
    kind: MarkerKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    let sql = match kind {
        MarkerKind::Favorite => {
            "SELECT COUNT(*) FROM favorites WHERE user_id = ? AND recipe_id = ?"
        }
        MarkerKind::ShoppingCart => {
            "SELECT COUNT(*) FROM shopping_cart_entries WHERE user_id = ? AND recipe_id = ?"
        }
    };
    let count: (i64,) = sqlx::query_as(sql)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;
    Ok(count.0 > 0)
}
