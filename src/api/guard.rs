//! Cookie-based authentication for protected routes.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::AppState;
use crate::credentials::CredentialStore;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::registry::UserDirectory;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Resolves an access token to the user it was issued for.
pub struct AccessGuard {
    users: Arc<dyn UserDirectory>,
    credentials: Arc<CredentialStore>,
}

impl AccessGuard {
    pub fn new(users: Arc<dyn UserDirectory>, credentials: Arc<CredentialStore>) -> Self {
        Self { users, credentials }
    }

    /// Every failure mode collapses into [`AppError::Unauthenticated`];
    /// only a storage outage surfaces as something else.
    pub async fn resolve(&self, token: Option<&str>) -> Result<CurrentUser, AppError> {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return Err(AppError::Unauthenticated);
        };

        let claims = self
            .credentials
            .decode_token(token)
            .map_err(|_| AppError::Unauthenticated)?;

        let Some(user_id) = claims.subject_id() else {
            debug!("token subject is not a user id");
            return Err(AppError::Unauthenticated);
        };

        match self.users.get_by_id(user_id).await? {
            Some(user) => Ok(CurrentUser::from(&user)),
            None => {
                debug!(%user_id, "token subject no longer exists");
                Err(AppError::Unauthenticated)
            }
        }
    }
}

/// Middleware for protected routes: attaches [`CurrentUser`] to the request
/// or answers 401.
pub async fn require_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar.get(ACCESS_TOKEN_COOKIE).map(|cookie| cookie.value());
    let user = state.guard.resolve(token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
