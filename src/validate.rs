//! Payload validation for recipe writes. All checks run before anything is
//! persisted, so a failure never leaves a partial write behind.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyIngredientSet,
    DuplicateIngredient,
    InvalidAmount,
    EmptyTagSet,
    DuplicateTag,
    InvalidCookingTime,
    UnknownIngredient,
    UnknownTag,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyIngredientSet
            | ValidationError::DuplicateIngredient
            | ValidationError::InvalidAmount
            | ValidationError::UnknownIngredient => "ingredients",
            ValidationError::EmptyTagSet
            | ValidationError::DuplicateTag
            | ValidationError::UnknownTag => "tags",
            ValidationError::InvalidCookingTime => "cooking_time",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmptyIngredientSet => "Recipe needs at least one ingredient",
            ValidationError::DuplicateIngredient => "Ingredients must be unique",
            ValidationError::InvalidAmount => "Ingredient amount must be greater than 0",
            ValidationError::EmptyTagSet => "Pick at least one tag",
            ValidationError::DuplicateTag => "Tags must be unique",
            ValidationError::InvalidCookingTime => "Cooking time must be at least 1",
            ValidationError::UnknownIngredient => "Unknown ingredient id",
            ValidationError::UnknownTag => "Unknown tag id",
        }
    }
}

/// Validate an `(ingredient_id, amount)` list for create/update. An empty
/// list is rejected: a recipe without ingredients is never representable,
/// so "clear the set" cannot be smuggled in through an update payload.
pub fn validate_ingredients(items: &[(String, i64)]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyIngredientSet);
    }

    let mut seen = HashSet::new();
    for (id, amount) in items {
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::DuplicateIngredient);
        }
        if *amount <= 0 {
            return Err(ValidationError::InvalidAmount);
        }
    }
    Ok(())
}

pub fn validate_tags(tag_ids: &[String]) -> Result<(), ValidationError> {
    if tag_ids.is_empty() {
        return Err(ValidationError::EmptyTagSet);
    }

    let mut seen = HashSet::new();
    for id in tag_ids {
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::DuplicateTag);
        }
    }
    Ok(())
}

pub fn validate_cooking_time(cooking_time: i64) -> Result<(), ValidationError> {
    if cooking_time < 1 {
        return Err(ValidationError::InvalidCookingTime);
    }
    Ok(())
}
