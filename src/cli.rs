//! Admin commands: provisioning users and loading the tag/ingredient
//! catalogs from JSON fixtures.

use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs;

use crate::models::{Ingredient, Tag, User};

#[derive(Deserialize)]
struct IngredientFixture {
    name: String,
    measurement_unit: String,
}

#[derive(Deserialize)]
struct TagFixture {
    name: String,
    color: String,
    slug: String,
}

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = User::new(
        email.to_string(),
        username.to_string(),
        first_name.to_string(),
        last_name.to_string(),
    );

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, first_name, last_name, access_code, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.access_code)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Access Code: {}", user.access_code);

    Ok(())
}

pub async fn import_ingredients(
    pool: &SqlitePool,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let fixtures: Vec<IngredientFixture> = serde_json::from_str(&content)?;

    let mut imported = 0;
    let mut tx = pool.begin().await?;

    for fixture in fixtures {
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM ingredients WHERE name = ? AND measurement_unit = ?",
        )
        .bind(&fixture.name)
        .bind(&fixture.measurement_unit)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            continue;
        }

        let ingredient = Ingredient::new(fixture.name, fixture.measurement_unit);
        sqlx::query(
            "INSERT INTO ingredients (id, name, measurement_unit, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .bind(&ingredient.created_at)
        .execute(&mut *tx)
        .await?;

        imported += 1;
    }

    tx.commit().await?;
    println!("Imported {} ingredients", imported);
    Ok(())
}

pub async fn import_tags(
    pool: &SqlitePool,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let fixtures: Vec<TagFixture> = serde_json::from_str(&content)?;

    let mut imported = 0;
    let mut tx = pool.begin().await?;

    for fixture in fixtures {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = ?")
            .bind(&fixture.slug)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            continue;
        }

        let tag = Tag::new(fixture.name, fixture.color, fixture.slug);
        sqlx::query("INSERT INTO tags (id, name, color, slug, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.slug)
            .bind(&tag.created_at)
            .execute(&mut *tx)
            .await?;

        imported += 1;
    }

    tx.commit().await?;
    println!("Imported {} tags", imported);
    Ok(())
}
