mod client;
mod project;
mod user;

pub use client::{Client, ClientPatch, ClientQuery, NewClient};
pub use project::{
    NewProject, Project, ProjectPatch, ProjectQuery, ProjectStatus, StatusChange, UnknownStatus,
};
pub use user::{
    AuthResponse, CurrentUser, LoginRequest, NewUser, RegisterRequest, User, normalize_email,
};
