use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewProject, Project, ProjectPatch, ProjectStatus};
use crate::registry::{ClientRegistry, OwnedKey, ProjectRegistry};

pub struct ProjectService {
    projects: Arc<dyn ProjectRegistry>,
    clients: Arc<dyn ClientRegistry>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRegistry>, clients: Arc<dyn ClientRegistry>) -> Self {
        Self { projects, clients }
    }

    /// Creates a project after checking that the referenced client belongs
    /// to the same owner. The check is read-only and not repeated later:
    /// updates cannot change `client_id`.
    #[instrument(skip(self, project), fields(client_id = %project.client_id))]
    pub async fn create(&self, owner_id: Uuid, project: NewProject) -> Result<Project, AppError> {
        let client_key = OwnedKey::new(project.client_id, owner_id);
        if self.clients.get_by_id(client_key).await?.is_none() {
            debug!("referenced client is not owned by caller");
            return Err(AppError::ReferentialViolation("Client"));
        }

        let project = self.projects.insert(owner_id, project).await?;
        debug!(project_id = %project.id, "project created");
        Ok(project)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        owner_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Project>, AppError> {
        Ok(self.projects.list_by_owner(owner_id, client_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: Uuid, project_id: Uuid) -> Result<Project, AppError> {
        self.projects
            .get_by_id(OwnedKey::new(project_id, owner_id))
            .await?
            .ok_or(AppError::NotFound("Project"))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        owner_id: Uuid,
        project_id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Project, AppError> {
        self.projects
            .update(OwnedKey::new(project_id, owner_id), patch)
            .await?
            .ok_or(AppError::NotFound("Project"))
    }

    #[instrument(skip(self), fields(status = %status))]
    pub async fn update_status(
        &self,
        owner_id: Uuid,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<Project, AppError> {
        self.projects
            .update_status(OwnedKey::new(project_id, owner_id), status)
            .await?
            .ok_or(AppError::NotFound("Project"))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: Uuid, project_id: Uuid) -> Result<(), AppError> {
        if self.projects.delete(OwnedKey::new(project_id, owner_id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Project"))
        }
    }
}
