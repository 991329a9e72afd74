use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
    #[serde(skip_serializing)]
    pub created_at: String,
}

impl Tag {
    pub fn new(name: String, color: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            color,
            slug,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
