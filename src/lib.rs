pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::core::fetcher::{CatalogView, FetchOrchestrator};
pub use crate::core::resolver::resolve;
pub use crate::domain::model::{CatalogPage, Category, Product};
pub use crate::domain::ports::FetchConfig;
pub use crate::utils::error::{ClientError, FailureKind, FetchFailure, Result};
