//! Core business logic - framework-agnostic operations on grants, users and uploads.
//!
//! Everything here takes a `SeaORM` connection and returns [`crate::errors::Result`];
//! the HTTP layer in [`crate::web`] only translates requests and responses.

pub mod agency;
pub mod filter;
pub mod grant;
pub mod grant_form;
pub mod status;
pub mod upload;
pub mod user;
