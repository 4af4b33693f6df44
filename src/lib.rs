//! Multi-tenant client and project tracking API for freelancers.
//!
//! Every client and project belongs to exactly one user and is only ever
//! read or written through that owner's scope.

pub mod api;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod service;
pub mod validation;
