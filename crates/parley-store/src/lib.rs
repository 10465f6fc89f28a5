//! # parley-store
//!
//! Relational storage for Parley, backed by SQLite.
//!
//! The crate exposes a [`Database`] handle that serializes access to a single
//! `rusqlite::Connection` and provides typed CRUD helpers for the five
//! relations: users, conversations, participants, messages and comments.
//! Every query shape has exactly one decoder in [`rows`], which checks the
//! statement's column set before mapping.

pub mod comments;
pub mod conversations;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod rows;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
