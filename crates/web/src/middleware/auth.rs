use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::WebError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the caller, taken from the `x-user-id` header set by the
/// authenticating gateway in front of this service.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                WebError::MissingIdentity(format!("Missing {} header", USER_ID_HEADER))
            })?;

        let user_id = Uuid::parse_str(header).map_err(|_| {
            WebError::MissingIdentity(format!("{} header is not a valid UUID", USER_ID_HEADER))
        })?;

        Ok(Self(user_id))
    }
}
