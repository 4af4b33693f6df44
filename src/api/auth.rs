use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde_json::{Value, json};

use super::AppState;
use super::extract::ValidJson;
use super::guard::ACCESS_TOKEN_COOKIE;
use crate::error::AppError;
use crate::models::{AuthResponse, CurrentUser, LoginRequest, RegisterRequest};

/// Attributes of the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub ttl_minutes: i64,
}

impl CookieSettings {
    fn session(&self, token: String) -> Cookie<'static> {
        Cookie::build((ACCESS_TOKEN_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(time::Duration::seconds(self.ttl_minutes.saturating_mul(60)))
            .build()
    }

    /// Same attributes as the session cookie, already expired.
    fn expired(&self) -> Cookie<'static> {
        let mut cookie = self.session(String::new());
        cookie.make_removal();
        cookie
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<Json<CurrentUser>, AppError> {
    let user = state.auth.register(request).await?;
    Ok(Json(CurrentUser::from(&user)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let (user, token) = state.auth.login(request).await?;
    let jar = jar.add(state.cookies.session(token.clone()));

    Ok((
        jar,
        Json(AuthResponse {
            user,
            access_token: token,
            token_type: "bearer",
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(state.cookies.expired());
    (jar, Json(json!({ "detail": "Logged out" })))
}

pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
