//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the lookup/save contract every model repository honors.
//! - Isolate SQLite query details from model helpers.
//!
//! # Invariants
//! - `get` distinguishes "no match" from "more than one match".
//! - Field names are checked against the model declaration before any SQL
//!   is built.

pub mod get_or_new;
pub mod model_repo;
