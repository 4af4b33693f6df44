use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::validation::{FieldErrors, Validate, nullable};

/// Workflow position of a project. Any status may be set from any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Idea,
    Talks,
    InProgress,
    Review,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Idea,
        ProjectStatus::Talks,
        ProjectStatus::InProgress,
        ProjectStatus::Review,
        ProjectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Idea => "idea",
            ProjectStatus::Talks => "talks",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Review => "review",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown project status `{0}`, expected one of idea, talks, in-progress, review, completed")]
pub struct UnknownStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub hourly_rate: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub client_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl NewProject {
    pub fn new(client_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            client_id,
            title: title.into(),
            description: None,
            status: ProjectStatus::default(),
            hourly_rate: None,
            deadline: None,
        }
    }
}

impl Validate for NewProject {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.length("title", &self.title, 1, 200);
        errors.non_negative("hourly_rate", self.hourly_rate);
        errors.into_result()
    }
}

/// Partial update of a project. `client_id` is fixed at creation and is not
/// part of the patch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub hourly_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.hourly_rate.is_none()
            && self.deadline.is_none()
    }

    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(hourly_rate) = self.hourly_rate {
            project.hourly_rate = hourly_rate;
        }
        if let Some(deadline) = self.deadline {
            project.deadline = deadline;
        }
    }
}

impl Validate for ProjectPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            errors.length("title", title, 1, 200);
        }
        errors.non_negative("hourly_rate", self.hourly_rate.flatten());
        errors.into_result()
    }
}

/// Body of the narrow status transition endpoint. Kept as a raw string so
/// an unknown value is reported as a field error.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

impl StatusChange {
    pub fn parse(&self) -> Result<ProjectStatus, FieldErrors> {
        self.status
            .parse()
            .map_err(|err: UnknownStatus| FieldErrors::single("status", err.to_string()))
    }
}

impl Validate for StatusChange {
    fn validate(&self) -> Result<(), FieldErrors> {
        self.parse().map(|_| ())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        for status in ProjectStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("In-Progress".parse::<ProjectStatus>().is_err());
        assert!("bogus".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn new_project_defaults_to_idea() {
        let client_id = Uuid::new_v4();
        let body = format!(r#"{{"client_id": "{client_id}", "title": "Site"}}"#);
        let project: NewProject = serde_json::from_str(&body).unwrap();

        assert_eq!(project.status, ProjectStatus::Idea);
        assert_eq!(project.client_id, client_id);
    }

    #[test]
    fn status_change_reports_field_error() {
        let change = StatusChange {
            status: "bogus".to_string(),
        };
        let errors = change.validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "status");

        let change = StatusChange {
            status: "review".to_string(),
        };
        assert_eq!(change.parse().unwrap(), ProjectStatus::Review);
    }

    #[test]
    fn patch_clears_rate_with_null() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"hourly_rate": null}"#).unwrap();
        assert_eq!(patch.hourly_rate, Some(None));
        assert!(patch.validate().is_ok());
    }
}
