//! In-process registries with the same semantics as the Postgres ones.
//! Used by the test suites and by `--in-memory` runs.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClientRegistry, OwnedKey, ProjectRegistry, StoreError, UserDirectory};
use crate::models::{
    Client, ClientPatch, NewClient, NewProject, NewUser, Project, ProjectPatch, ProjectStatus,
    User,
};

trait Owned {
    fn key(&self) -> OwnedKey;
}

impl Owned for Client {
    fn key(&self) -> OwnedKey {
        OwnedKey::new(self.id, self.user_id)
    }
}

impl Owned for Project {
    fn key(&self) -> OwnedKey {
        OwnedKey::new(self.id, self.user_id)
    }
}

/// Index of the record matching both id and owner.
fn scoped<T: Owned>(records: &[T], key: OwnedKey) -> Option<usize> {
    records.iter().position(|record| record.key() == key)
}

fn newest_first<T, F>(records: &[T], created_at: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    let mut out: Vec<T> = records.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

fn matches_search(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|value| value.to_lowercase().contains(needle))
}

#[derive(Default)]
pub struct MemoryUsers {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserDirectory for MemoryUsers {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }
}

#[derive(Default)]
pub struct MemoryClients {
    clients: RwLock<Vec<Client>>,
}

#[async_trait]
impl ClientRegistry for MemoryClients {
    async fn insert(&self, owner_id: Uuid, client: NewClient) -> Result<Client, StoreError> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            user_id: owner_id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            company: client.company,
            notes: client.notes,
            created_at: now,
            updated_at: now,
        };
        self.clients.write().await.push(client.clone());
        Ok(client)
    }

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Client>, StoreError> {
        let clients = self.clients.read().await;
        Ok(scoped(&clients, key).map(|index| clients[index].clone()))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, StoreError> {
        let needle = search.filter(|term| !term.is_empty()).map(str::to_lowercase);
        let clients = self.clients.read().await;
        let owned: Vec<Client> = clients
            .iter()
            .filter(|client| client.user_id == owner_id)
            .filter(|client| match &needle {
                Some(needle) => {
                    matches_search(Some(&client.name), needle)
                        || matches_search(client.email.as_deref(), needle)
                        || matches_search(client.company.as_deref(), needle)
                }
                None => true,
            })
            .cloned()
            .collect();

        Ok(newest_first(&owned, |client| client.created_at))
    }

    async fn update(
        &self,
        key: OwnedKey,
        patch: ClientPatch,
    ) -> Result<Option<Client>, StoreError> {
        let mut clients = self.clients.write().await;
        let Some(index) = scoped(&clients, key) else {
            return Ok(None);
        };

        let client = &mut clients[index];
        if !patch.is_empty() {
            patch.apply_to(client);
            client.updated_at = Utc::now();
        }
        Ok(Some(client.clone()))
    }

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError> {
        let mut clients = self.clients.write().await;
        match scoped(&clients, key) {
            Some(index) => {
                clients.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryProjects {
    projects: RwLock<Vec<Project>>,
}

#[async_trait]
impl ProjectRegistry for MemoryProjects {
    async fn insert(&self, owner_id: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: owner_id,
            client_id: project.client_id,
            title: project.title,
            description: project.description,
            status: project.status,
            hourly_rate: project.hourly_rate,
            deadline: project.deadline,
            created_at: now,
            updated_at: now,
        };
        self.projects.write().await.push(project.clone());
        Ok(project)
    }

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(scoped(&projects, key).map(|index| projects[index].clone()))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Project>, StoreError> {
        let projects = self.projects.read().await;
        let owned: Vec<Project> = projects
            .iter()
            .filter(|project| project.user_id == owner_id)
            .filter(|project| client_id.is_none_or(|client_id| project.client_id == client_id))
            .cloned()
            .collect();

        Ok(newest_first(&owned, |project| project.created_at))
    }

    async fn update(
        &self,
        key: OwnedKey,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError> {
        let mut projects = self.projects.write().await;
        let Some(index) = scoped(&projects, key) else {
            return Ok(None);
        };

        let project = &mut projects[index];
        if !patch.is_empty() {
            patch.apply_to(project);
            project.updated_at = Utc::now();
        }
        Ok(Some(project.clone()))
    }

    async fn update_status(
        &self,
        key: OwnedKey,
        status: ProjectStatus,
    ) -> Result<Option<Project>, StoreError> {
        let mut projects = self.projects.write().await;
        let Some(index) = scoped(&projects, key) else {
            return Ok(None);
        };

        let project = &mut projects[index];
        project.status = status;
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError> {
        let mut projects = self.projects.write().await;
        match scoped(&projects, key) {
            Some(index) => {
                projects.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> NewClient {
        NewClient {
            name: "Acme Corp".to_string(),
            email: Some("billing@acme.test".to_string()),
            phone: Some("555-0100".to_string()),
            company: Some("Acme Holdings".to_string()),
            notes: Some("pays late".to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();

        let created = registry.insert(owner, acme()).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = registry
            .get_by_id(OwnedKey::new(created.id, owner))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Acme Corp");
        assert_eq!(fetched.notes.as_deref(), Some("pays late"));
    }

    #[tokio::test]
    async fn other_owner_sees_nothing() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let client = registry.insert(owner, acme()).await.unwrap();
        let foreign = OwnedKey::new(client.id, intruder);

        assert!(registry.get_by_id(foreign).await.unwrap().is_none());
        let rename = ClientPatch {
            name: Some("x".to_string()),
            ..ClientPatch::default()
        };
        assert!(registry.update(foreign, rename).await.unwrap().is_none());
        assert!(!registry.delete(foreign).await.unwrap());
        assert!(registry.list_by_owner(intruder, None).await.unwrap().is_empty());

        let still_there = registry
            .get_by_id(OwnedKey::new(client.id, owner))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still_there.name, "Acme Corp");
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        let client = registry.insert(owner, acme()).await.unwrap();

        let after = registry
            .update(OwnedKey::new(client.id, owner), ClientPatch::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after, client);
        assert_eq!(after.updated_at, client.updated_at);
    }

    #[tokio::test]
    async fn partial_update_keeps_unsupplied_fields_and_is_idempotent() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        let client = registry.insert(owner, acme()).await.unwrap();
        let key = OwnedKey::new(client.id, owner);
        let patch = ClientPatch {
            phone: Some(Some("555-0199".to_string())),
            notes: Some(None),
            ..ClientPatch::default()
        };

        let once = registry.update(key, patch.clone()).await.unwrap().unwrap();
        let twice = registry.update(key, patch).await.unwrap().unwrap();

        assert_eq!(once.phone.as_deref(), Some("555-0199"));
        assert_eq!(once.notes, None);
        assert_eq!(once.name, client.name);
        assert_eq!(once.email, client.email);
        assert_eq!(once.company, client.company);
        assert!(once.updated_at >= client.updated_at);

        assert_eq!(
            (&twice.name, &twice.email, &twice.phone, &twice.company, &twice.notes),
            (&once.name, &once.email, &once.phone, &once.company, &once.notes)
        );
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        registry.insert(owner, acme()).await.unwrap();
        registry
            .insert(
                owner,
                NewClient {
                    name: "Globex".to_string(),
                    email: Some("hank@globex.test".to_string()),
                    ..NewClient::default()
                },
            )
            .await
            .unwrap();
        registry
            .insert(
                owner,
                NewClient {
                    name: "Initech".to_string(),
                    company: Some("ACME subsidiary".to_string()),
                    ..NewClient::default()
                },
            )
            .await
            .unwrap();

        let hits = registry.list_by_owner(owner, Some("acme")).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Initech", "Acme Corp"]);

        let by_email = registry.list_by_owner(owner, Some("GLOBEX.TEST")).await.unwrap();
        assert_eq!(by_email.len(), 1);

        let all = registry.list_by_owner(owner, Some("")).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        for name in ["first", "second", "third"] {
            registry
                .insert(
                    owner,
                    NewClient {
                        name: name.to_string(),
                        ..NewClient::default()
                    },
                )
                .await
                .unwrap();
        }

        let names: Vec<String> = registry
            .list_by_owner(owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let registry = MemoryClients::default();
        let owner = Uuid::new_v4();
        let client = registry.insert(owner, acme()).await.unwrap();
        let key = OwnedKey::new(client.id, owner);

        assert!(registry.delete(key).await.unwrap());
        assert!(!registry.delete(key).await.unwrap());
        assert!(registry.get_by_id(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let users = MemoryUsers::default();
        let new_user = NewUser {
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
        };

        users.insert(new_user.clone()).await.unwrap();
        let err = users.insert(new_user).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn projects_filter_by_client_and_change_status() {
        let projects = MemoryProjects::default();
        let owner = Uuid::new_v4();
        let client_a = Uuid::new_v4();
        let client_b = Uuid::new_v4();

        let site = projects
            .insert(owner, NewProject::new(client_a, "Site"))
            .await
            .unwrap();
        projects
            .insert(owner, NewProject::new(client_b, "App"))
            .await
            .unwrap();
        projects
            .insert(Uuid::new_v4(), NewProject::new(client_a, "Other"))
            .await
            .unwrap();

        let for_a = projects.list_by_owner(owner, Some(client_a)).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].id, site.id);
        assert_eq!(projects.list_by_owner(owner, None).await.unwrap().len(), 2);

        let key = OwnedKey::new(site.id, owner);
        let moved = projects
            .update_status(key, ProjectStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.status, ProjectStatus::InProgress);
        assert_eq!(moved.title, "Site");

        let foreign = OwnedKey::new(site.id, Uuid::new_v4());
        assert!(
            projects
                .update_status(foreign, ProjectStatus::Completed)
                .await
                .unwrap()
                .is_none()
        );
    }

    fn website(client_id: Uuid) -> NewProject {
        NewProject {
            description: Some("marketing site".to_string()),
            hourly_rate: Some(85.0),
            ..NewProject::new(client_id, "Website")
        }
    }

    #[tokio::test]
    async fn empty_project_patch_is_a_no_op() {
        let projects = MemoryProjects::default();
        let owner = Uuid::new_v4();
        let created = projects.insert(owner, website(Uuid::new_v4())).await.unwrap();
        let key = OwnedKey::new(created.id, owner);

        let updated = projects
            .update(key, ProjectPatch::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.updated_at, created.updated_at);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.hourly_rate, created.hourly_rate);
        assert_eq!(updated.status, created.status);
    }

    #[tokio::test]
    async fn status_change_touches_only_status_and_updated_at() {
        let projects = MemoryProjects::default();
        let owner = Uuid::new_v4();
        let client_id = Uuid::new_v4();
        let created = projects.insert(owner, website(client_id)).await.unwrap();

        let moved = projects
            .update_status(OwnedKey::new(created.id, owner), ProjectStatus::Review)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(moved.status, ProjectStatus::Review);
        assert!(moved.updated_at >= created.updated_at);
        assert_eq!(moved.created_at, created.created_at);
        assert_eq!(moved.client_id, client_id);
        assert_eq!(moved.title, "Website");
        assert_eq!(moved.description.as_deref(), Some("marketing site"));
        assert_eq!(moved.hourly_rate, Some(85.0));
        assert_eq!(moved.deadline, None);
    }
}
