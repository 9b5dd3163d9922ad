//! Atelier Core - Shared domain types.
//!
//! This crate provides the types used across all Atelier components:
//! - `client` - Session, API client and list views over the REST backend
//! - `cli` - Command-line front end for the public site and the back-office
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure functions - no I/O,
//! no HTTP clients, no storage. This keeps it lightweight and allows the list
//! filtering rules to be tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails and roles
//! - [`models`] - Records exchanged with the backend (users, projects, blog posts)
//! - [`filter`] - Client-side search, category filtering and pagination
//! - [`validation`] - Draft validation performed before any network call

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod models;
pub mod types;
pub mod validation;

pub use filter::{ListFilter, Page, Searchable, categories, filter_items, paginate};
pub use models::*;
pub use types::*;
pub use validation::ValidationError;
