use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    // Owned by the external credential service; never serialized.
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub access_code: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(email: String, username: String, first_name: String, last_name: String) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            username,
            first_name,
            last_name,
            password_hash: String::new(),
            access_code: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
