use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::push_owner_scope;
use crate::models::{NewProject, Project, ProjectPatch, ProjectStatus};
use crate::registry::{OwnedKey, ProjectRegistry, StoreError};

pub struct PgProjects {
    pool: PgPool,
}

impl PgProjects {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRegistry for PgProjects {
    async fn insert(&self, owner_id: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, user_id, client_id, title, description, status, hourly_rate, deadline, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(project.client_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.hourly_rate)
        .bind(project.deadline)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Project>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM projects");
        push_owner_scope(&mut query, key);

        let project = query
            .build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Project>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM projects WHERE user_id = ");
        query.push_bind(owner_id);

        if let Some(client_id) = client_id {
            query.push(" AND client_id = ").push_bind(client_id);
        }
        query.push(" ORDER BY created_at DESC");

        let projects = query
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn update(
        &self,
        key: OwnedKey,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError> {
        if patch.is_empty() {
            return self.get_by_id(key).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(title) = patch.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(hourly_rate) = patch.hourly_rate {
            query.push(", hourly_rate = ").push_bind(hourly_rate);
        }
        if let Some(deadline) = patch.deadline {
            query.push(", deadline = ").push_bind(deadline);
        }

        push_owner_scope(&mut query, key);
        query.push(" RETURNING *");

        let project = query
            .build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn update_status(
        &self,
        key: OwnedKey,
        status: ProjectStatus,
    ) -> Result<Option<Project>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE projects SET status = ");
        query
            .push_bind(status.as_str())
            .push(", updated_at = ")
            .push_bind(Utc::now());
        push_owner_scope(&mut query, key);
        query.push(" RETURNING *");

        let project = query
            .build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM projects");
        push_owner_scope(&mut query, key);

        let result = query.build().execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
