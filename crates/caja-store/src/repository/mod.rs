//! # Repositories
//!
//! Plain data access, one module per table group. Repositories never
//! lock the writer turn and never publish change events - that
//! sequencing belongs to [`crate::register::Register`], which composes
//! repository calls into logical operations.

pub mod cash;
pub mod catalog;
pub mod config;
pub mod product;
pub mod sale;
pub mod user;
