use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::credentials::CredentialStore;
use crate::error::AppError;
use crate::models::{
    CurrentUser, LoginRequest, NewUser, RegisterRequest, User, normalize_email,
};
use crate::registry::UserDirectory;

pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    credentials: Arc<CredentialStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserDirectory>, credentials: Arc<CredentialStore>) -> Self {
        Self { users, credentials }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let email = normalize_email(&request.email);
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = self
            .users
            .insert(NewUser {
                email,
                password_hash,
                full_name: request.full_name,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Looks up the account and checks the password. Unknown email and wrong
    /// password fail the same way.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AppError> {
        let email = normalize_email(&request.email);
        let Some(user) = self.users.get_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AppError::Unauthenticated);
        };

        if !self.verify_password(request.password, user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(AppError::Unauthenticated);
        }

        Ok(user)
    }

    /// Authenticates and issues an access token for the session cookie.
    pub async fn login(&self, request: LoginRequest) -> Result<(CurrentUser, String), AppError> {
        let user = self.authenticate(request).await?;
        let token = self.credentials.issue_token(user.id)?;

        info!(user_id = %user.id, "user logged in");
        Ok((CurrentUser::from(&user), token))
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let credentials = self.credentials.clone();
        let hash = tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|err| AppError::Infrastructure(err.into()))??;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let credentials = self.credentials.clone();
        tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .map_err(|err| AppError::Infrastructure(err.into()))
    }
}
