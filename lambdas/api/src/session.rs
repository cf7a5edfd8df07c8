use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::Session;

use crate::errors::ApiError;

pub const ROLE_HEADER: &str = "x-user-role";
pub const USER_HEADER: &str = "x-user-id";

/// Session taken from the caller's role and user id headers.
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
        let session = Session::authenticate(header(ROLE_HEADER), header(USER_HEADER))?;
        Ok(CurrentSession(session))
    }
}
