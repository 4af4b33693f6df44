use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Client, ClientPatch, NewClient};
use crate::registry::{ClientRegistry, OwnedKey};

pub struct ClientService {
    registry: Arc<dyn ClientRegistry>,
}

impl ClientService {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    #[instrument(skip(self, client))]
    pub async fn create(&self, owner_id: Uuid, client: NewClient) -> Result<Client, AppError> {
        let client = self.registry.insert(owner_id, client).await?;
        debug!(client_id = %client.id, "client created");
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, AppError> {
        Ok(self.registry.list_by_owner(owner_id, search).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: Uuid, client_id: Uuid) -> Result<Client, AppError> {
        self.registry
            .get_by_id(OwnedKey::new(client_id, owner_id))
            .await?
            .ok_or(AppError::NotFound("Client"))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        patch: ClientPatch,
    ) -> Result<Client, AppError> {
        self.registry
            .update(OwnedKey::new(client_id, owner_id), patch)
            .await?
            .ok_or(AppError::NotFound("Client"))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: Uuid, client_id: Uuid) -> Result<(), AppError> {
        if self.registry.delete(OwnedKey::new(client_id, owner_id)).await? {
            debug!("client deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Client"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::memory::MemoryClients;

    fn service() -> ClientService {
        ClientService::new(Arc::new(MemoryClients::default()))
    }

    fn named(name: &str) -> NewClient {
        NewClient {
            name: name.to_string(),
            ..NewClient::default()
        }
    }

    #[tokio::test]
    async fn foreign_client_is_not_found_for_every_operation() {
        let service = service();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let client = service.create(owner, named("Acme")).await.unwrap();

        assert!(matches!(
            service.get(other, client.id).await,
            Err(AppError::NotFound("Client"))
        ));
        assert!(matches!(
            service.update(other, client.id, ClientPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(other, client.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.get(owner, client.id).await.is_ok());
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let service = service();
        let owner = Uuid::new_v4();

        assert!(matches!(
            service.get(owner, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = service();
        let owner = Uuid::new_v4();
        let client = service.create(owner, named("Acme")).await.unwrap();

        service.delete(owner, client.id).await.unwrap();

        assert!(service.get(owner, client.id).await.is_err());
        assert!(service.delete(owner, client.id).await.is_err());
    }
}
