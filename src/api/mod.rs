//! HTTP surface. Resource routes live under `/api` and require the session
//! cookie; registration, login, logout and health are public.

mod auth;
mod clients;
mod extract;
pub mod guard;
mod health;
mod projects;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::registry::Registries;
use crate::service::{AuthService, ClientService, ProjectService};

pub use auth::CookieSettings;
pub use guard::{ACCESS_TOKEN_COOKIE, AccessGuard};

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub auth: Arc<AuthService>,
    pub guard: Arc<AccessGuard>,
    pub clients: Arc<ClientService>,
    pub projects: Arc<ProjectService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(config: &Config, registries: Registries) -> Result<Self> {
        config.validate()?;
        let credentials = Arc::new(CredentialStore::from_config(config)?);
        let cookies = CookieSettings {
            secure: config.is_production(),
            ttl_minutes: credentials.ttl_minutes(),
        };

        Ok(Self {
            app_name: Arc::from(config.app_name.as_str()),
            auth: Arc::new(AuthService::new(registries.users.clone(), credentials.clone())),
            guard: Arc::new(AccessGuard::new(registries.users.clone(), credentials)),
            clients: Arc::new(ClientService::new(registries.clients.clone())),
            projects: Arc::new(ProjectService::new(
                registries.projects.clone(),
                registries.clients.clone(),
            )),
            cookies,
        })
    }
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/clients", post(clients::create).get(clients::list))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/projects", post(projects::create).get(projects::list))
        .route(
            "/projects/{id}",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        .route("/projects/{id}/status", patch(projects::update_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), guard::require_user));

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    Router::new()
        .route("/", get(health::root))
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
