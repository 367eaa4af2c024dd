// Request identity extraction
use crate::domain::identity::{Identity, Role};
use crate::presentation::api_error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The caller, as asserted by the authentication layer in front of this service.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))
        };

        let user_id = header(USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| ApiError::Unauthorized(format!("malformed {} header", USER_ID_HEADER)))?;
        let role = header(USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(ApiError::Unauthorized)?;

        Ok(CurrentUser(Identity::new(user_id, role)))
    }
}
