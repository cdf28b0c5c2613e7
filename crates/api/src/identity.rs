//! Caller identity extraction.
//!
//! Authentication itself lives at the edge (gateway/session layer); the
//! API trusts two headers carrying the already-verified identity:
//! `x-user-id` (UUID) and `x-user-role` (`user` or `admin`, default
//! `user`). Absent headers mean an anonymous caller, not an error.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{CurrentUser, Role, UserId};

use crate::error::ApiError;

/// The (possibly anonymous) caller of a request.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<CurrentUser>);

impl Identity {
    /// Returns the signed-in caller or rejects with 401.
    pub fn require(self) -> Result<CurrentUser, ApiError> {
        self.0.ok_or(ApiError::Unauthenticated)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw_id) = parts.headers.get("x-user-id") else {
            return Ok(Identity(None));
        };
        let id = raw_id
            .to_str()
            .ok()
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .ok_or_else(|| ApiError::BadRequest("invalid x-user-id header".to_string()))?;

        let role = match parts.headers.get("x-user-role") {
            None => Role::User,
            Some(raw) => raw
                .to_str()
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ApiError::BadRequest("invalid x-user-role header".to_string()))?,
        };

        Ok(Identity(Some(CurrentUser {
            id: UserId::from_uuid(id),
            role,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    async fn extract(req: Request<Body>) -> Result<Identity, ApiError> {
        let (mut parts, _) = req.into_parts();
        Identity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_headers_mean_anonymous() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let identity = extract(req).await.unwrap();
        assert!(identity.0.is_none());
        assert!(matches!(
            identity.require(),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn role_defaults_to_user() {
        let req = Request::builder()
            .header("x-user-id", uuid::Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();
        let user = extract(req).await.unwrap().require().unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn admin_role_is_honored() {
        let req = Request::builder()
            .header("x-user-id", uuid::Uuid::new_v4().to_string())
            .header("x-user-role", "admin")
            .body(Body::empty())
            .unwrap();
        let user = extract(req).await.unwrap().require().unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn garbage_headers_are_rejected() {
        let req = Request::builder()
            .header("x-user-id", "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(ApiError::BadRequest(_))
        ));

        let req = Request::builder()
            .header("x-user-id", uuid::Uuid::new_v4().to_string())
            .header("x-user-role", "superuser")
            .body(Body::empty())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
