use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{FieldErrors, Validate, nullable};

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for NewClient {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.length("name", &self.name, 1, 100);
        errors.email("email", self.email.as_deref());
        errors.max_length("phone", self.phone.as_deref(), 20);
        errors.max_length("company", self.company.as_deref(), 100);
        errors.into_result()
    }
}

/// Partial update. `None` leaves a field untouched; for the optional
/// columns `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.notes.is_none()
    }

    /// Applies the supplied fields to `client`, leaving the rest as they were.
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(email) = &self.email {
            client.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            client.phone = phone.clone();
        }
        if let Some(company) = &self.company {
            client.company = company.clone();
        }
        if let Some(notes) = &self.notes {
            client.notes = notes.clone();
        }
    }
}

impl Validate for ClientPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.length("name", name, 1, 100);
        }
        errors.email("email", self.email.as_ref().and_then(Option::as_deref));
        errors.max_length("phone", self.phone.as_ref().and_then(Option::as_deref), 20);
        errors.max_length("company", self.company.as_ref().and_then(Option::as_deref), 100);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientQuery {
    #[serde(default)]
    pub search: Option<String>,
}
