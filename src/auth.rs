use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::error::ApiError;
use crate::models::User;

const USER_ID_KEY: &str = "user_id";

/// Authenticated caller. Rejects with 401 when the session carries no user;
/// handlers always receive the actor explicitly through this extractor.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let user: Option<User> = session.get(USER_ID_KEY).await.ok().flatten();

        user.map(AuthUser).ok_or(ApiError::Unauthorized)
    }
}

/// Possibly-anonymous viewer for read endpoints. Never rejects; anonymous
/// callers get `None` and see `is_subscribed`/`is_favorited`/
/// `is_in_shopping_cart` as false.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = match Session::from_request_parts(parts, state).await {
            Ok(session) => session.get(USER_ID_KEY).await.ok().flatten(),
            Err(_) => None,
        };
        Ok(MaybeUser(user))
    }
}

pub async fn login_user(session: &Session, user: User) -> Result<(), tower_sessions::session::Error> {
    session.insert(USER_ID_KEY, user).await
}

pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
