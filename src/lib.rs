// Copyright 2023 Remi Bernotavicius

//! Data model, listing filters and seeding for a recipe sharing site.

pub mod admin;
pub mod database;
pub mod error;
pub mod filters;
pub mod import;
pub mod query;
pub mod validate;

pub use error::{Error, Result};
