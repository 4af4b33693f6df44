use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{contains_pattern, push_owner_scope};
use crate::models::{Client, ClientPatch, NewClient};
use crate::registry::{ClientRegistry, OwnedKey, StoreError};

pub struct PgClients {
    pool: PgPool,
}

impl PgClients {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRegistry for PgClients {
    async fn insert(&self, owner_id: Uuid, client: NewClient) -> Result<Client, StoreError> {
        let now = Utc::now();
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, user_id, name, email, phone, company, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.company)
        .bind(&client.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    async fn get_by_id(&self, key: OwnedKey) -> Result<Option<Client>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM clients");
        push_owner_scope(&mut query, key);

        let client = query
            .build_query_as::<Client>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM clients WHERE user_id = ");
        query.push_bind(owner_id);

        if let Some(term) = search.filter(|term| !term.is_empty()) {
            let pattern = contains_pattern(term);
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY created_at DESC");

        let clients = query
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    async fn update(
        &self,
        key: OwnedKey,
        patch: ClientPatch,
    ) -> Result<Option<Client>, StoreError> {
        if patch.is_empty() {
            return self.get_by_id(key).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE clients SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(email) = patch.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(phone) = patch.phone {
            query.push(", phone = ").push_bind(phone);
        }
        if let Some(company) = patch.company {
            query.push(", company = ").push_bind(company);
        }
        if let Some(notes) = patch.notes {
            query.push(", notes = ").push_bind(notes);
        }

        push_owner_scope(&mut query, key);
        query.push(" RETURNING *");

        let client = query
            .build_query_as::<Client>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn delete(&self, key: OwnedKey) -> Result<bool, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM clients");
        push_owner_scope(&mut query, key);

        let result = query.build().execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
