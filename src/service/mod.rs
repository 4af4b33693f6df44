//! Ownership-enforcing services between the HTTP layer and the registries.
//!
//! Registries report absence as `None`/`false`; the services turn that into
//! [`AppError::NotFound`](crate::error::AppError::NotFound).

mod auth;
mod clients;
mod projects;

pub use auth::AuthService;
pub use clients::ClientService;
pub use projects::ProjectService;
