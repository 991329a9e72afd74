use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    #[serde(skip_serializing)]
    pub created_at: String,
}

impl Ingredient {
    pub fn new(name: String, measurement_unit: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            measurement_unit,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
