//! # VCP Common Library
//!
//! Shared code for the voice catalog picker crates including:
//! - Catalog wire models (categories, voice models, closure map)
//! - Strongly typed category and item tokens
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{CategoryRecord, CategoryToken, ClosureMap, Item, ItemToken};
