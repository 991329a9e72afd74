use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::AppState;
use crate::auth::{login_user, logout_user};
use crate::error::ApiError;
use crate::models::User;

#[derive(Deserialize)]
pub struct LoginPayload {
    access_code: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<StatusCode, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE access_code = ?")
        .bind(&payload.access_code)
        .fetch_optional(&state.db)
        .await?;

    match user {
        Some(user) => {
            login_user(&session, user).await?;
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::Unauthorized),
    }
}

async fn logout(session: Session) -> Result<StatusCode, ApiError> {
    logout_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
