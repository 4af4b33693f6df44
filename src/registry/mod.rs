//! Owner-scoped storage contracts for users, clients and projects.
//!
//! Existing clients and projects can only be addressed through an
//! [`OwnedKey`], so every read and write carries the owner filter. Absence
//! (missing or owned by someone else) is reported as `None`/`false`, never
//! as an error.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Client, ClientPatch, NewClient, NewProject, NewUser, Project, ProjectPatch, ProjectStatus,
    User,
};

/// Address of a resource inside one owner's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnedKey {
    pub id: Uuid,
    pub owner_id: Uuid,
}

impl OwnedKey {
    pub fn new(id: Uuid, owner_id: Uuid) -> Self {
        Self { id, owner_id }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Stores a new account. Fails with [`StoreError::Duplicate`] when the
    /// email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ClientRegistry: Send + Sync {
    async fn insert(&self, owner_id: Uuid, client: NewClient) -> Result<Client, StoreError>;

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Client>, StoreError>;

    /// Newest first. `search` matches name, email or company,
    /// case-insensitively, as a substring.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, StoreError>;

    /// Applies the supplied fields and refreshes `updated_at`. An empty patch
    /// returns the stored record untouched.
    async fn update(&self, key: OwnedKey, patch: ClientPatch) -> Result<Option<Client>, StoreError>;

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// `project.client_id` must already be known to belong to `owner_id`.
    async fn insert(&self, owner_id: Uuid, project: NewProject) -> Result<Project, StoreError>;

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Project>, StoreError>;

    /// Newest first, optionally restricted to one client.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Project>, StoreError>;

    async fn update(
        &self,
        key: OwnedKey,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError>;

    /// Changes only `status` and `updated_at`.
    async fn update_status(
        &self,
        key: OwnedKey,
        status: ProjectStatus,
    ) -> Result<Option<Project>, StoreError>;

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError>;
}

/// The three registries the services are built from.
#[derive(Clone)]
pub struct Registries {
    pub users: Arc<dyn UserDirectory>,
    pub clients: Arc<dyn ClientRegistry>,
    pub projects: Arc<dyn ProjectRegistry>,
}

impl Registries {
    /// Registries backed by process memory.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUsers::default()),
            clients: Arc::new(memory::MemoryClients::default()),
            projects: Arc::new(memory::MemoryProjects::default()),
        }
    }
}

